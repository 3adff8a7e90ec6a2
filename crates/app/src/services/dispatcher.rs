//! Command dispatcher: runs one EXECUTE execution against one device.

use std::sync::Arc;

use homelink_domain::command::CommandTable;
use homelink_domain::device::Device;
use homelink_domain::smarthome::{CommandResult, ErrorCode, Execution};

use crate::ports::DeviceHost;

/// Looks the command up, translates it, and sends exactly one mutation to the host.
pub struct CommandDispatcher<H> {
    host: H,
    table: Arc<CommandTable>,
}

impl<H: DeviceHost + Send + Sync> CommandDispatcher<H> {
    pub fn new(host: H, table: Arc<CommandTable>) -> Self {
        Self { host, table }
    }

    /// Outcome of `execution` on `device`. Never fails: errors become error results.
    #[tracing::instrument(skip(self, device, execution), fields(device_id = %device.id, command = %execution.command))]
    pub async fn dispatch(&self, device: &Device, execution: &Execution) -> CommandResult {
        let Some(handler) = self.table.get(&execution.command) else {
            tracing::warn!("unsupported command");
            return CommandResult::error(device.id.clone(), ErrorCode::FunctionNotSupported);
        };

        let command = match handler(device, execution) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(error = %err, "command rejected");
                return CommandResult::error(device.id.clone(), ErrorCode::HardError);
            }
        };

        match self.host.execute(&device.id, command).await {
            Ok(()) => {
                tracing::debug!(?command, "command executed");
                CommandResult::success(device.id.clone())
            }
            Err(err) => {
                tracing::error!(error = ?err, "host failed to execute command");
                CommandResult::error(device.id.clone(), ErrorCode::HardError)
            }
        }
    }
}
