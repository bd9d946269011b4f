//! Clap derive structures for the `reocam` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use reocam_core::FeatureKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// reocam -- watch and control Reolink cameras and NVRs
#[derive(Debug, Parser)]
#[command(
    name = "reocam",
    version,
    about = "Watch and control Reolink cameras and NVRs",
    long_about = "Keeps a session with a Reolink camera or NVR, streams state changes\n\
        (motion, AI detection, lights, siren, PTZ presets) and sends commands.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "REOCAM_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device host or IP (overrides profile)
    #[arg(long, short = 'H', env = "REOCAM_HOST", global = true)]
    pub host: Option<String>,

    /// Device port
    #[arg(long, env = "REOCAM_PORT", global = true)]
    pub port: Option<u16>,

    /// Use plain HTTP instead of HTTPS
    #[arg(long, global = true)]
    pub http: bool,

    /// Username
    #[arg(long, short = 'u', visible_alias = "user", env = "REOCAM_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password
    #[arg(long, env = "REOCAM_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Channel index (NVR input)
    #[arg(long, global = true)]
    pub channel: Option<u8>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REOCAM_OUTPUT",
        default_value = "text",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "REOCAM_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "REOCAM_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream state changes until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Play the siren alarm
    Alarm(AlarmArgs),

    /// Move to or list PTZ presets
    Ptz(PtzArgs),

    /// Switch the white light (floodlight)
    Light(SwitchArgs),

    /// Enable or disable the siren
    Siren(SwitchArgs),

    /// Set the infrared light mode
    Ir(IrArgs),

    /// Show the device ability descriptor
    Ability,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Features to watch (default: motion, ai-detection)
    #[arg(value_parser = parse_feature)]
    pub features: Vec<FeatureKind>,

    /// Poll interval in milliseconds for every watched feature
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many events
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Also print status changes
    #[arg(long, short = 's')]
    pub status: bool,
}

fn parse_feature(s: &str) -> Result<FeatureKind, String> {
    s.parse().map_err(|_| {
        format!(
            "unknown feature '{s}' (expected motion, ai-detection, ir-light, white-light, \
             siren, alarm, ptz-preset)"
        )
    })
}

// ── Actions ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlarmArgs {
    /// Number of times to play the alarm (1-9)
    #[arg(value_parser = clap::value_parser!(u8).range(1..=9))]
    pub times: u8,
}

#[derive(Debug, Args)]
pub struct PtzArgs {
    #[command(subcommand)]
    pub command: PtzCommand,
}

#[derive(Debug, Subcommand)]
pub enum PtzCommand {
    /// Move to a stored preset
    Goto {
        /// Preset id (0-63)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=63))]
        id: u8,
    },

    /// List stored presets
    #[command(alias = "ls")]
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Args)]
pub struct SwitchArgs {
    pub state: Switch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IrMode {
    Auto,
    Off,
}

#[derive(Debug, Args)]
pub struct IrArgs {
    pub mode: IrMode,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display the resolved configuration (passwords hidden)
    Show,

    /// Store a profile's password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
