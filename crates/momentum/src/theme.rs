use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use backdrop::LayerSettings;
use serde::Serialize;
use themeconfig::{BuildMode, EnvSource, LayeredSource, ResolvedTheme, ThemeFile, ThemeResolver};

use crate::paths::AppPaths;

pub const ENV_MODE: &str = "MOMENTUM_ENV";

/// The theme file in effect (if any) and where it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedTheme {
    pub file: Option<ThemeFile>,
    pub path: Option<PathBuf>,
}

impl LoadedTheme {
    /// An explicit path must exist; the default location is optional.
    pub fn load(paths: &AppPaths, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("theme file {} does not exist", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = paths.theme_file();
                if !path.is_file() {
                    tracing::debug!(path = %path.display(), "no theme file; using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read theme file {}", path.display()))?;
        let file = ThemeFile::from_toml_str(&raw)
            .with_context(|| format!("invalid theme file {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded theme file");
        Ok(Self {
            file: Some(file),
            path: Some(path),
        })
    }

    /// Environment variables first, then the theme file, then defaults.
    pub fn resolver(&self) -> ThemeResolver<LayeredSource> {
        let mut source = LayeredSource::new().push(EnvSource);
        if let Some(file) = &self.file {
            source = source.push(file.clone());
        }
        ThemeResolver::new(source)
    }

    pub fn settings(&self) -> LayerSettings {
        self.file
            .as_ref()
            .map(LayerSettings::from_theme_file)
            .unwrap_or_default()
    }

    /// `--dev` wins, then `MOMENTUM_ENV`, then the file's `mode`.
    pub fn build_mode(&self, dev_flag: bool) -> BuildMode {
        if dev_flag {
            return BuildMode::Development;
        }
        if let Ok(raw) = env::var(ENV_MODE) {
            match BuildMode::parse(&raw) {
                Some(mode) => return mode,
                None => tracing::warn!(value = %raw, "ignoring unrecognised {ENV_MODE}"),
            }
        }
        self.file
            .as_ref()
            .and_then(|file| file.mode)
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ThemeReport {
    pub mode: BuildMode,
    pub source: Option<PathBuf>,
    pub theme: ResolvedTheme,
}

impl ThemeReport {
    pub fn collect(loaded: &LoadedTheme) -> Self {
        Self {
            mode: loaded.build_mode(false),
            source: loaded.path.clone(),
            theme: loaded.resolver().resolve_theme(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_env::{lock, EnvGuard};
    use crate::paths::ENV_CONFIG_DIR;
    use std::time::Duration;
    use tempfile::TempDir;

    const THEME: &str = r##"
version = 1
mode = "development"

[filter]
r = 0.1

[colors]
primary = "#ff0000"

[layers.secondary]
opacity = 0.4

[animation]
period = "30s"
"##;

    fn paths_in(root: &TempDir) -> (AppPaths, EnvGuard) {
        let guard = EnvGuard::set(ENV_CONFIG_DIR, root.path());
        (AppPaths::discover().unwrap(), guard)
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let _lock = lock();
        let _mode = EnvGuard::clear(ENV_MODE);
        let root = TempDir::new().unwrap();
        let (paths, _guard) = paths_in(&root);

        let loaded = LoadedTheme::load(&paths, None).unwrap();
        assert!(loaded.file.is_none());
        assert_eq!(loaded.build_mode(false), BuildMode::Production);
        assert_eq!(loaded.settings(), LayerSettings::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let _lock = lock();
        let root = TempDir::new().unwrap();
        let (paths, _guard) = paths_in(&root);
        let err = LoadedTheme::load(&paths, Some(&root.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn loads_default_theme_file() {
        let _lock = lock();
        let _mode = EnvGuard::clear(ENV_MODE);
        let _filter = EnvGuard::clear("MOMENTUM_SHADER_FILTER_R");
        let root = TempDir::new().unwrap();
        let (paths, _guard) = paths_in(&root);
        fs::write(paths.theme_file(), THEME).unwrap();

        let loaded = LoadedTheme::load(&paths, None).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(paths.theme_file().as_path()));
        assert_eq!(loaded.build_mode(false), BuildMode::Development);

        let settings = loaded.settings();
        assert_eq!(settings.period, Duration::from_secs(30));
        assert!((settings.secondary.opacity - 0.4).abs() < f32::EPSILON);

        let theme = loaded.resolver().resolve_theme();
        assert!((theme.filter.r - 0.1).abs() < f32::EPSILON);
        assert_eq!(theme.palette.primary[1], "#ff0000");
    }

    #[test]
    fn environment_beats_theme_file() {
        let _lock = lock();
        let root = TempDir::new().unwrap();
        let (paths, _guard) = paths_in(&root);
        fs::write(paths.theme_file(), THEME).unwrap();
        let _filter = EnvGuard::set("MOMENTUM_SHADER_FILTER_R", "0.9");
        let _mode = EnvGuard::set(ENV_MODE, "production");

        let loaded = LoadedTheme::load(&paths, None).unwrap();
        let theme = loaded.resolver().resolve_theme();
        assert!((theme.filter.r - 0.9).abs() < f32::EPSILON);
        assert_eq!(loaded.build_mode(false), BuildMode::Production);
        assert_eq!(loaded.build_mode(true), BuildMode::Development);
    }

    #[test]
    fn file_palette_list_outranks_env_named_color() {
        let _lock = lock();
        let root = TempDir::new().unwrap();
        let (paths, _guard) = paths_in(&root);
        fs::write(
            paths.theme_file(),
            "version = 1\n[palette]\nprimary = [\"#111111\", \"#222222\"]\n",
        )
        .unwrap();
        let _primary = EnvGuard::set("MOMENTUM_SHADER_PRIMARY", "#0000ff");
        let _list = EnvGuard::clear("MOMENTUM_SHADER_PALETTE_PRIMARY");

        let loaded = LoadedTheme::load(&paths, None).unwrap();
        let theme = loaded.resolver().resolve_theme();
        assert_eq!(theme.palette.primary, vec!["#111111", "#222222"]);
        assert_eq!(loaded.resolver().colors().primary, "#0000ff");

        let _list = EnvGuard::set("MOMENTUM_SHADER_PALETTE_PRIMARY", "#333333, #444444");
        let theme = loaded.resolver().resolve_theme();
        assert_eq!(theme.palette.primary, vec!["#333333", "#444444"]);
    }

    #[test]
    fn invalid_theme_file_reports_its_path() {
        let _lock = lock();
        let root = TempDir::new().unwrap();
        let (paths, _guard) = paths_in(&root);
        fs::write(paths.theme_file(), "version = 2\n").unwrap();

        let err = LoadedTheme::load(&paths, None).unwrap_err();
        assert!(format!("{err:#}").contains("theme.toml"));
    }
}
