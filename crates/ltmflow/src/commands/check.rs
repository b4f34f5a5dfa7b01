use crate::connection::ConnectionArgs;
use crate::output::Outcome;
use clap::Args;
use ltmflow_icontrol::{Readiness, ReadinessConfig, ReadinessProber, SystemCommand, run_command};
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// 待機の前に設定を保存
    #[arg(long)]
    pub save_config: bool,

    /// 待機の前に再起動
    #[arg(long)]
    pub reload: bool,

    /// 待機時間の上限（秒）
    #[arg(long, default_value_t = 40)]
    pub timeout: u64,

    /// ポーリング間隔（秒）
    #[arg(long, default_value_t = 10)]
    pub interval: u64,

    /// 準備完了とみなす稼働中サービスの最小数
    #[arg(long, default_value_t = 2)]
    pub min_active: usize,
}

impl CheckArgs {
    /// 待機前に実行するコマンド（保存 → 再起動の順）
    fn commands(&self) -> Vec<SystemCommand> {
        let mut commands = Vec::new();
        if self.save_config {
            commands.push(SystemCommand::SaveConfig);
        }
        if self.reload {
            commands.push(SystemCommand::Reboot);
        }
        commands
    }

    fn readiness(&self) -> ReadinessConfig {
        ReadinessConfig {
            timeout: Duration::from_secs(self.timeout),
            interval: Duration::from_secs(self.interval),
            min_active: self.min_active,
        }
    }
}

pub async fn handle(connection: &ConnectionArgs, args: &CheckArgs) -> anyhow::Result<Outcome> {
    let client = connection.client()?;
    let mut changed = false;

    for command in args.commands() {
        if let Err(e) = run_command(&client, command).await {
            // 先に成功したコマンドの変更は報告に残す
            return Ok(Outcome {
                changed,
                ..Outcome::failure(format!("{} failed: {}", command, e))
            });
        }
        changed = true;
    }

    let prober = ReadinessProber::new(&client, args.readiness());
    let outcome = match prober.wait().await {
        Readiness::Ready(snapshot) => Outcome {
            changed,
            msg: Some("Ready".to_string()),
            facts: Some(serde_json::to_value(snapshot)?),
            ..Default::default()
        },
        Readiness::NotReady {
            attempts,
            last_error,
        } => {
            let mut msg = format!("Device not ready after {} attempts", attempts);
            if let Some(error) = last_error {
                msg.push_str(&format!(": {}", error));
            }
            Outcome {
                changed,
                ..Outcome::failure(msg)
            }
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let args = CheckArgs {
            save_config: false,
            reload: false,
            timeout: 40,
            interval: 10,
            min_active: 2,
        };
        assert_eq!(args.readiness().attempts(), 4);
    }

    #[test]
    fn test_commands_run_save_before_reboot() {
        let args = CheckArgs {
            save_config: true,
            reload: true,
            timeout: 40,
            interval: 10,
            min_active: 2,
        };
        assert_eq!(
            args.commands(),
            vec![SystemCommand::SaveConfig, SystemCommand::Reboot]
        );
    }
}
