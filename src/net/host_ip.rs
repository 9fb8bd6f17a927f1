//! Best-effort discovery of the machine's primary IP, for the startup log line.

use tokio::process::Command;

/// First address printed by `hostname -I`, or an empty string on any failure.
pub async fn primary_ip() -> String {
    primary_ip_from("hostname", &["-I"]).await
}

pub async fn primary_ip_from(program: &str, args: &[&str]) -> String {
    match Command::new(program).args(args).output().await {
        Ok(output) if output.status.success() => {
            first_field(&String::from_utf8_lossy(&output.stdout)).to_string()
        }
        Ok(output) => {
            tracing::debug!(program, status = %output.status, "local IP discovery failed");
            String::new()
        }
        Err(e) => {
            tracing::debug!(program, error = %e, "local IP discovery unavailable");
            String::new()
        }
    }
}

fn first_field(output: &str) -> &str {
    output.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_address() {
        assert_eq!(first_field("10.0.0.7 172.17.0.1 \n"), "10.0.0.7");
        assert_eq!(first_field("\n"), "");
    }

    #[tokio::test]
    async fn missing_command_yields_empty() {
        assert_eq!(primary_ip_from("definitely-not-a-real-command-4821", &[]).await, "");
    }

    #[tokio::test]
    async fn failing_command_yields_empty() {
        assert_eq!(primary_ip_from("false", &[]).await, "");
    }
}
