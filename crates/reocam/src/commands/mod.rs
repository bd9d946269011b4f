//! Command handlers.

pub mod actions;
pub mod config_cmd;
pub mod watch;

use reocam_core::DeviceConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a device command to its handler.
pub async fn dispatch(
    cmd: Command,
    config: DeviceConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(args, config, global).await,
        Command::Alarm(args) => actions::alarm(&args, config, global).await,
        Command::Ptz(args) => actions::ptz(args, config, global).await,
        Command::Light(args) => actions::light(&args, config, global).await,
        Command::Siren(args) => actions::siren(&args, config, global).await,
        Command::Ir(args) => actions::ir(&args, config, global).await,
        Command::Ability => actions::ability(config, global).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
