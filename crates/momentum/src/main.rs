mod cli;
mod paths;
mod run;
mod theme;

use anyhow::{Context, Result};
use cli::{Command, ThemeAction};
use paths::AppPaths;
use theme::{LoadedTheme, ThemeReport};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Theme(theme_cmd)) => handle_theme_command(theme_cmd.action),
        None => run::render(cli.render),
    }
}

fn handle_theme_command(action: ThemeAction) -> Result<()> {
    let paths = AppPaths::discover()?;
    match action {
        ThemeAction::Show { theme } => {
            let loaded = LoadedTheme::load(&paths, theme.as_deref())?;
            let report = ThemeReport::collect(&loaded);
            let json =
                serde_json::to_string_pretty(&report).context("failed to serialise theme")?;
            println!("{json}");
        }
        ThemeAction::Where => {
            let theme_file = paths.theme_file();
            println!("Configuration:");
            println!("  config:     {}", paths.config_dir().display());
            println!(
                "  theme:      {} ({})",
                theme_file.display(),
                if theme_file.is_file() {
                    "present"
                } else {
                    "missing"
                }
            );
        }
    }
    Ok(())
}
