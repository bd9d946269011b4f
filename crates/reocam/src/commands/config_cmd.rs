//! Config subcommand handlers.

use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", reocam_config::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = reocam_config::load_config()?;
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some("********".into());
                }
            }
            let text = toml::to_string_pretty(&cfg).map_err(|e| CliError::Config {
                message: format!("failed to render config: {e}"),
            })?;
            output::print_output(text.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = reocam_config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let password = rpassword::prompt_password(format!("Password for '{profile_name}': "))?;
            reocam_config::store_password(&profile_name, &SecretString::from(password))?;
            output::print_output(
                &format!("Password stored in the system keyring for '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}
