//! CLI-side configuration: profile selection and flag overrides on top of
//! `reocam_config`.

use secrecy::SecretString;

use reocam_config::{Config, Profile};
use reocam_core::DeviceConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Profile name from `--profile`, the config's default, or `default`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Apply CLI flags over a profile.
fn overlay(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if global.port.is_some() {
        profile.port = global.port;
    }
    if global.http {
        profile.https = Some(false);
    }
    if global.username.is_some() {
        profile.username.clone_from(&global.username);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if global.channel.is_some() {
        profile.channel = global.channel;
    }
    // An explicit password satisfies the credential chain even when no
    // other source has one; it is applied with top priority below.
    if global.password.is_some() && profile.password.is_none() {
        profile.password.clone_from(&global.password);
    }
    profile
}

/// Build a `DeviceConfig` from the config file, profile, and CLI overrides.
pub fn build_device_config(global: &GlobalOpts) -> Result<DeviceConfig, CliError> {
    let cfg = reocam_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let base = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available.join(", "),
            });
        }
        None => Profile::default(),
    };

    let profile = overlay(base, global);
    if profile.host.trim().is_empty() {
        return Err(CliError::NoConfig {
            path: reocam_config::config_path().display().to_string(),
        });
    }

    let mut device = reocam_config::profile_to_device_config(&profile, &profile_name, &cfg.defaults)?;
    if let Some(ref password) = global.password {
        device.credentials.password = SecretString::from(password.clone());
    }
    Ok(device)
}
