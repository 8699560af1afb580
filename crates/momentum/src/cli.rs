use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "momentum",
    author,
    version,
    about = "Render the Momentum shader backdrop",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub render: RenderArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RenderArgs {
    /// Theme file to load instead of `<config>/theme.toml`.
    #[arg(long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Write the markup here instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Page content placed above the backdrop, one paragraph per flag.
    #[arg(long = "content", value_name = "TEXT")]
    pub content: Vec<String>,

    /// Treat this as a development build (shows renderer errors in the notice).
    #[arg(long)]
    pub dev: bool,

    /// Make the renderer fail on purpose.
    #[arg(
        long,
        value_enum,
        value_name = "WHEN",
        default_value_t = SimulatedFailure::Never
    )]
    pub simulate_failure: SimulatedFailure,

    /// How many times to press retry while the error fallback is shown.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub retries: u32,

    /// Stop before the deferred theme resolution runs (renders the loading skeleton).
    #[arg(long)]
    pub loading: bool,

    /// Refuse to mount the renderer when no GPU adapter is available.
    #[arg(long)]
    pub gpu_probe: bool,

    /// Resolve the theme during mount instead of deferring it.
    #[arg(long)]
    pub immediate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SimulatedFailure {
    #[default]
    Never,
    Always,
    /// Only the first renderer instance fails.
    Once,
}

impl SimulatedFailure {
    pub fn fails(self, attempt: u32) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Once => attempt == 1,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the theme configuration.
    Theme(ThemeCommand),
}

#[derive(Parser, Debug)]
pub struct ThemeCommand {
    #[command(subcommand)]
    pub action: ThemeAction,
}

#[derive(Subcommand, Debug)]
pub enum ThemeAction {
    /// Print the resolved theme as JSON.
    Show {
        /// Theme file to load instead of `<config>/theme.toml`.
        #[arg(long, value_name = "FILE")]
        theme: Option<PathBuf>,
    },
    /// Print where configuration is read from.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}
