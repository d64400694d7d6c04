use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Full configuration surface. Every field defaults so that running without a
/// config file is equivalent to running with an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub notifications: NotificationConfig,
    pub assets: AssetConfig,
    pub mind: MindConfig,
}

impl AppConfig {
    /// Reads configuration from a TOML file. Missing or malformed files are
    /// errors here, callers decide whether absence is acceptable.
    pub fn load(path: &Path) -> Result<AppConfig> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse config file {path:?}"))
    }

    /// Default-path loading: an absent file yields the default config, a
    /// present but broken file is still fatal.
    pub fn load_or_default(path: &Path) -> Result<AppConfig> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(AppConfig::default())
        }
    }
}

/// Window geometry, consumed by a graphical shell only. Kept so config files
/// shared with the desktop front end parse cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 450,
            height: 200,
        }
    }
}

/// Elapsed-time cutoffs for the three alert levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub information: ThresholdSpec,
    pub warning: ThresholdSpec,
    pub critical: ThresholdSpec,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            information: ThresholdSpec::hours(1),
            warning: ThresholdSpec::hours(2),
            critical: ThresholdSpec::hours(3),
        }
    }
}

/// A duration written as `{ hours = 1, minutes = 30 }` in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSpec {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl ThresholdSpec {
    pub fn hours(hours: i64) -> Self {
        Self {
            hours,
            ..Self::default()
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::hours(self.hours) + Duration::minutes(self.minutes) + Duration::seconds(self.seconds)
    }
}

/// Icon and stylesheet locations for a graphical shell. The core never reads
/// these, they only need to round-trip through the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub icon: String,
    pub play: String,
    pub pause: String,
    pub reset: String,
    pub push: String,
    pub quit: String,
    pub stylesheet: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            icon: "icon.svg".into(),
            play: "play.svg".into(),
            pause: "pause.svg".into(),
            reset: "reset.svg".into(),
            push: "push.svg".into(),
            quit: "quit.svg".into(),
            stylesheet: "style.qss".into(),
        }
    }
}

/// Storage settings: file name of the document store, the collection inside
/// it and the activity name residual time gets attributed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MindConfig {
    pub database: String,
    pub collection: String,
    pub defaultorder: String,
}

impl Default for MindConfig {
    fn default() -> Self {
        Self {
            database: "worktally".into(),
            collection: "activity".into(),
            defaultorder: "general".into(),
        }
    }
}

impl MindConfig {
    /// The store lives next to logs in the application directory.
    pub fn database_path(&self, application_dir: &Path) -> PathBuf {
        application_dir.join(format!("{}.json", self.database))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_original_thresholds() {
        let config = AppConfig::default();
        assert_eq!(
            config.notifications.information.as_duration(),
            Duration::hours(1)
        );
        assert_eq!(
            config.notifications.warning.as_duration(),
            Duration::hours(2)
        );
        assert_eq!(
            config.notifications.critical.as_duration(),
            Duration::hours(3)
        );
        assert_eq!(config.window.width, 450);
        assert_eq!(config.mind.collection, "activity");
    }

    #[test]
    fn parses_partial_file() {
        let text = r#"
            [window]
            width = 300

            [notifications]
            information = { minutes = 45 }

            [mind]
            database = "tracking"
            defaultorder = "1234"
        "#;
        let config: AppConfig = toml::from_str(text).unwrap();
        assert_eq!(config.window.width, 300);
        assert_eq!(config.window.height, 200);
        assert_eq!(
            config.notifications.information.as_duration(),
            Duration::minutes(45)
        );
        assert_eq!(config.notifications.warning.as_duration(), Duration::hours(2));
        assert_eq!(config.mind.database, "tracking");
        assert_eq!(config.mind.defaultorder, "1234");
        assert_eq!(config.mind.collection, "activity");
    }

    #[test]
    fn mixed_threshold_units_add_up() {
        let spec: ThresholdSpec =
            toml::from_str("hours = 1\nminutes = 30\nseconds = 15").unwrap();
        assert_eq!(
            spec.as_duration(),
            Duration::hours(1) + Duration::minutes(30) + Duration::seconds(15)
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(AppConfig::load(&path).is_err());
        assert_eq!(
            AppConfig::load_or_default(&path).unwrap(),
            AppConfig::default()
        );
    }

    #[test]
    fn malformed_file_is_always_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "[window\nwidth = ").unwrap();
        assert!(AppConfig::load(&path).is_err());
        assert!(AppConfig::load_or_default(&path).is_err());
    }

    #[test]
    fn database_path_gets_json_suffix() {
        let mind = MindConfig::default();
        assert_eq!(
            mind.database_path(Path::new("/state/worktally")),
            PathBuf::from("/state/worktally/worktally.json")
        );
    }
}
