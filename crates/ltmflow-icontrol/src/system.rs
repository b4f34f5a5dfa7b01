//! Device-level commands (save configuration, reboot)

use crate::error::{IControlError, Result};
use ltmflow_core::{Request, Transport};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCommand {
    /// Persist the running configuration
    SaveConfig,
    /// Reboot the appliance
    Reboot,
}

impl SystemCommand {
    fn request(&self) -> Request {
        match self {
            SystemCommand::SaveConfig => Request::post("sys/config", json!({"command": "save"})),
            SystemCommand::Reboot => Request::post("sys", json!({"command": "reboot"})),
        }
    }
}

impl std::fmt::Display for SystemCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemCommand::SaveConfig => write!(f, "save-config"),
            SystemCommand::Reboot => write!(f, "reboot"),
        }
    }
}

pub async fn run_command<T: Transport>(transport: &T, command: SystemCommand) -> Result<()> {
    tracing::info!("Running system command: {}", command);
    let response = transport.send(command.request()).await?;
    if response.status != 200 {
        return Err(IControlError::Status {
            status: response.status,
            body: response.body,
        });
    }
    Ok(())
}
