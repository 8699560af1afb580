use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "MOMENTUM_CONFIG_DIR";

const QUALIFIER: &str = "dev";
const ORGANISATION: &str = "Momentum";
const APPLICATION: &str = "Momentum";
const THEME_FILE: &str = "theme.toml";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        if let Some(config_dir) = env_override(ENV_CONFIG_DIR) {
            return Ok(Self { config_dir });
        }
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn theme_file(&self) -> PathBuf {
        self.config_dir.join(THEME_FILE)
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod test_env {
    use std::env;
    use std::ffi::OsString;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    pub fn lock() -> MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub struct EnvGuard {
        key: String,
        previous: Option<OsString>,
    }

    impl EnvGuard {
        pub fn set(key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                previous,
            }
        }

        pub fn clear(key: &str) -> Self {
            let previous = env::var_os(key);
            env::remove_var(key);
            Self {
                key: key.to_string(),
                previous,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = self.previous.take() {
                env::set_var(&self.key, value);
            } else {
                env::remove_var(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_env::{lock, EnvGuard};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn env_override_takes_precedence() {
        let _lock = lock();
        let root = TempDir::new().unwrap();
        let config_dir = root.path().join("config");
        let _guard = EnvGuard::set(ENV_CONFIG_DIR, &config_dir);

        let paths = AppPaths::discover().unwrap();
        assert_eq!(paths.config_dir(), config_dir.as_path());
        assert_eq!(paths.theme_file(), config_dir.join("theme.toml"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let _lock = lock();
        let _guard = EnvGuard::set(ENV_CONFIG_DIR, "");
        if let Ok(paths) = AppPaths::discover() {
            assert!(!paths.config_dir().as_os_str().is_empty());
        }
    }
}
