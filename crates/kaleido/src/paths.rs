//! Resolves where kaleido looks for its `kaleido.toml`.
//!
//! Precedence is the `--config` flag, then the `KALEIDO_CONFIG_DIR`
//! environment variable, then the platform config directory. Discovery never
//! creates directories; a missing file simply means "use defaults".

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "KALEIDO_CONFIG_DIR";
pub const CONFIG_FILE_NAME: &str = "kaleido.toml";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "kaleido";
const APPLICATION: &str = "kaleido";

/// Where the config file location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Flag,
    Env,
    Platform,
}

impl ConfigSource {
    /// Only a file named on the command line must exist.
    pub fn requires_file(self) -> bool {
        matches!(self, ConfigSource::Flag)
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Flag => f.write_str("--config"),
            ConfigSource::Env => f.write_str(ENV_CONFIG_DIR),
            ConfigSource::Platform => f.write_str("platform default"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    config_file: PathBuf,
    source: ConfigSource,
}

impl AppPaths {
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(file) = explicit {
            let config_dir = file
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return Ok(Self {
                config_dir,
                config_file: file.to_path_buf(),
                source: ConfigSource::Flag,
            });
        }

        if let Some(dir) = env_override(ENV_CONFIG_DIR) {
            return Ok(Self::in_dir(dir, ConfigSource::Env));
        }

        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self::in_dir(
            project_dirs.config_dir().to_path_buf(),
            ConfigSource::Platform,
        ))
    }

    fn in_dir(config_dir: PathBuf, source: ConfigSource) -> Self {
        let config_file = config_dir.join(CONFIG_FILE_NAME);
        Self {
            config_dir,
            config_file,
            source,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn source(&self) -> ConfigSource {
        self.source
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.as_os_str().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &Path) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }

        fn clear(key: &'static str) -> Self {
            let previous = env::var_os(key);
            env::remove_var(key);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = self.previous.take() {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn explicit_file_wins_over_env() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _env = EnvGuard::set(ENV_CONFIG_DIR, &root.path().join("env"));
        let file = root.path().join("scenes/night.toml");

        let paths = AppPaths::discover(Some(&file)).unwrap();

        assert_eq!(paths.source(), ConfigSource::Flag);
        assert_eq!(paths.config_file(), file.as_path());
        assert_eq!(paths.config_dir(), root.path().join("scenes").as_path());
        assert!(paths.source().requires_file());
    }

    #[test]
    fn bare_file_name_resolves_against_current_dir() {
        let paths = AppPaths::discover(Some(Path::new("scene.toml"))).unwrap();
        assert_eq!(paths.config_dir(), Path::new("."));
    }

    #[test]
    fn env_override_sets_config_dir_without_creating_it() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let config_dir = root.path().join("config");
        let _env = EnvGuard::set(ENV_CONFIG_DIR, &config_dir);

        let paths = AppPaths::discover(None).unwrap();

        assert_eq!(paths.source(), ConfigSource::Env);
        assert_eq!(paths.config_file(), config_dir.join(CONFIG_FILE_NAME));
        assert!(!config_dir.exists());
        assert!(!paths.source().requires_file());
    }

    #[test]
    fn empty_env_falls_back_to_platform_dirs() {
        let _guard = env_lock().lock().unwrap();
        let _clear = EnvGuard::clear(ENV_CONFIG_DIR);
        let _empty = EnvGuard::set(ENV_CONFIG_DIR, Path::new(""));

        let paths = AppPaths::discover(None).unwrap();

        assert_eq!(paths.source(), ConfigSource::Platform);
        assert!(paths.config_file().ends_with(CONFIG_FILE_NAME));
    }
}
