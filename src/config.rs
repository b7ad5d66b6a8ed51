//! Application configuration.
//!
//! Paths are always resolved against the application root, so class
//! definitions and templates are found without touching the process working
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable naming the entry script of the application.
pub const ENTRY_SCRIPT_VAR: &str = "SCRIPT_FILENAME";

/// Optional config file looked up in the application root.
pub const CONFIG_FILE: &str = "mvc.yml";

/// Dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MvcConfig {
    /// Application root; relative base paths below are joined onto it.
    pub app_root: PathBuf,
    /// Directory holding controller definitions.
    pub controllers_path: PathBuf,
    /// Directory holding view definitions.
    pub views_path: PathBuf,
    /// Directory holding per-type action templates (`<type>/<action><ext>`).
    pub templates_path: PathBuf,
    pub template_extension: String,
    pub definition_extension: String,
    /// Action used when the page does not select one.
    pub default_action: String,
    /// Register the default Controller/View under unresolved class names.
    pub fallback_to_defaults: bool,
}

impl Default for MvcConfig {
    fn default() -> Self {
        Self {
            app_root: PathBuf::from("."),
            controllers_path: PathBuf::from("controllers"),
            views_path: PathBuf::from("views"),
            templates_path: PathBuf::from("templates"),
            template_extension: ".html".to_string(),
            definition_extension: "yml".to_string(),
            default_action: "index".to_string(),
            fallback_to_defaults: true,
        }
    }
}

impl MvcConfig {
    /// Default configuration rooted at `app_root`.
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
            ..Self::default()
        }
    }

    /// Load a YAML config file. A relative or missing `app_root` is taken
    /// relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        if config.app_root.is_relative() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            config.app_root = dir.join(&config.app_root);
        }
        Ok(config)
    }

    /// Parse YAML config content.
    pub fn parse(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Build the config from the process environment.
    ///
    /// The application root is the directory of the entry script named by
    /// `SCRIPT_FILENAME`, or the current directory when unset. It is made
    /// absolute once, here, so later changes to the working directory do not
    /// move it. A `mvc.yml` in that root overrides the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_root = match std::env::var(ENTRY_SCRIPT_VAR) {
            Ok(script) if !script.is_empty() => entry_script_dir(Path::new(&script)),
            _ => PathBuf::from("."),
        };
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
            path: app_root.clone(),
            source,
        })?;
        Self::from_app_root(absolute_root(&app_root, &cwd))
    }

    /// Defaults rooted at `app_root`, overridden by `<app_root>/mvc.yml` if present.
    pub fn from_app_root(app_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let app_root = app_root.into();
        let config_file = app_root.join(CONFIG_FILE);
        if !config_file.is_file() {
            return Ok(Self::new(app_root));
        }

        tracing::debug!(path = %config_file.display(), "loading mvc config");
        Self::load(&config_file)
    }

    pub fn controllers_dir(&self) -> PathBuf {
        self.resolve(&self.controllers_path)
    }

    pub fn views_dir(&self) -> PathBuf {
        self.resolve(&self.views_path)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.resolve(&self.templates_path)
    }

    /// Join a configured path onto the application root unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.app_root.join(path)
        }
    }
}

/// Directory containing the entry script.
fn entry_script_dir(script: &Path) -> PathBuf {
    match script.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `root` joined onto `cwd` unless already absolute; a leading `.` is dropped.
fn absolute_root(root: &Path, cwd: &Path) -> PathBuf {
    if root.is_absolute() {
        return root.to_path_buf();
    }
    let relative = root.strip_prefix(".").unwrap_or(root);
    cwd.join(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = MvcConfig::parse("controllers_path: site/controllers\ndefault_action: list\n")
            .unwrap();
        assert_eq!(config.controllers_path, PathBuf::from("site/controllers"));
        assert_eq!(config.default_action, "list");
        assert_eq!(config.views_path, PathBuf::from("views"));
        assert!(config.fallback_to_defaults);
    }

    #[test]
    fn test_parse_empty_config() {
        assert_eq!(MvcConfig::parse("  \n").unwrap(), MvcConfig::default());
    }

    #[test]
    fn test_parse_invalid_config() {
        assert!(MvcConfig::parse("fallback_to_defaults: [1, 2]").is_err());
    }

    #[test]
    fn test_resolve_against_app_root() {
        let config = MvcConfig::new("/srv/site");
        assert_eq!(config.controllers_dir(), PathBuf::from("/srv/site/controllers"));
        assert_eq!(config.resolve(Path::new("/abs/views")), PathBuf::from("/abs/views"));
    }

    #[test]
    fn test_entry_script_dir() {
        assert_eq!(
            entry_script_dir(Path::new("/srv/site/index.php")),
            PathBuf::from("/srv/site")
        );
        assert_eq!(entry_script_dir(Path::new("index.php")), PathBuf::from("."));
    }

    #[test]
    fn test_absolute_root() {
        let cwd = Path::new("/var/www");
        assert_eq!(absolute_root(Path::new("."), cwd), PathBuf::from("/var/www"));
        assert_eq!(absolute_root(Path::new("site"), cwd), PathBuf::from("/var/www/site"));
        assert_eq!(absolute_root(Path::new("./site"), cwd), PathBuf::from("/var/www/site"));
        assert_eq!(absolute_root(Path::new("/srv/site"), cwd), PathBuf::from("/srv/site"));
        assert!(absolute_root(Path::new("."), cwd).is_absolute());
    }

    #[test]
    fn test_from_env_root_is_absolute() {
        let config = MvcConfig::from_env().unwrap();
        assert!(config.app_root.is_absolute());
        assert!(config.templates_dir().is_absolute());
    }

    #[test]
    fn test_from_app_root_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "views_path: site/views\nfallback_to_defaults: false\n",
        )
        .unwrap();

        let config = MvcConfig::from_app_root(dir.path()).unwrap();
        assert_eq!(config.app_root, dir.path().to_path_buf());
        assert_eq!(config.views_dir(), dir.path().join("site/views"));
        assert!(!config.fallback_to_defaults);
    }

    #[test]
    fn test_from_app_root_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = MvcConfig::from_app_root(dir.path()).unwrap();
        assert_eq!(config, MvcConfig::new(dir.path()));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "default_action: [").unwrap();
        assert!(matches!(
            MvcConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
