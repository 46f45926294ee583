use crate::core::patterns::{PatternConfig, PatternLibrary};
use crate::core::schedule::ScheduleFilter;
use crate::core::ConfigProvider;
use crate::utils::error::{HallError, Result};
use crate::utils::validation::{
    validate_allowed_values, validate_delimiter, validate_non_empty_string, validate_path,
    validate_positive_number, validate_source, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const SUPPORTED_FORMATS: &[&str] = &["csv", "tsv", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub overrides: OverridesConfig,
    pub patterns: PatternConfig,
    pub schedule: ScheduleConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// URL or local path of the halls page.
    pub halls: String,
    pub schedule: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverridesConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub delimiter: Option<String>,
    pub league: Option<String>,
    pub team: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            output_formats: vec!["csv".to_string()],
            compression: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| HallError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HallError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.source.halls.trim().is_empty() {
            return Err(HallError::MissingConfigError {
                field: "source.halls".to_string(),
            });
        }
        validate_source("source.halls", &self.source.halls)?;

        if let Some(schedule) = &self.source.schedule {
            validate_source("source.schedule", schedule)?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }
        if let Some(path) = &self.overrides.path {
            validate_path("overrides.path", path)?;
        }
        if let Some(delimiter) = &self.schedule.delimiter {
            validate_delimiter("schedule.delimiter", delimiter)?;
        }

        validate_path("load.output_path", &self.load.output_path)?;
        if self.load.output_formats.is_empty() {
            return Err(HallError::ConfigValidationError {
                field: "load.output_formats".to_string(),
                message: "at least one output format is required".to_string(),
            });
        }
        validate_allowed_values("load.output_formats", &self.load.output_formats, SUPPORTED_FORMATS)?;
        if let Some(compression) = self.load.compression.as_ref().filter(|c| c.enabled) {
            validate_non_empty_string("load.compression.filename", &compression.filename)?;
        }

        validate_positive_number("patterns.max_code_len", self.patterns.max_code_len, 1)?;
        validate_non_empty_string("patterns.label_prefix", &self.patterns.label_prefix)?;
        PatternLibrary::compile(&self.patterns)?;

        Ok(())
    }

    /// One line per setting, for `--dry-run`.
    pub fn summary(&self) -> Vec<String> {
        let unset = || "(none)".to_string();
        vec![
            format!("halls source:   {}", self.source.halls),
            format!(
                "schedule:       {}",
                self.source.schedule.clone().unwrap_or_else(unset)
            ),
            format!(
                "overrides:      {}",
                self.overrides.path.clone().unwrap_or_else(unset)
            ),
            format!("output path:    {}", self.load.output_path),
            format!("output formats: {}", self.load.output_formats.join(", ")),
            format!(
                "zip bundle:     {}",
                self.bundle_filename().map(str::to_string).unwrap_or_else(unset)
            ),
            format!(
                "filter:         league={} team={}",
                self.schedule.league.as_deref().unwrap_or("*"),
                self.schedule.team.as_deref().unwrap_or("*")
            ),
        ]
    }
}

impl ConfigProvider for TomlConfig {
    fn halls_source(&self) -> &str {
        &self.source.halls
    }

    fn schedule_source(&self) -> Option<&str> {
        self.source.schedule.as_deref()
    }

    fn overrides_path(&self) -> Option<&str> {
        self.overrides.path.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn patterns(&self) -> &PatternConfig {
        &self.patterns
    }

    fn schedule_filter(&self) -> ScheduleFilter {
        ScheduleFilter {
            league: self.schedule.league.clone(),
            team: self.schedule.team.clone(),
        }
    }

    fn schedule_delimiter(&self) -> u8 {
        self.schedule
            .delimiter
            .as_deref()
            .and_then(|d| validate_delimiter("schedule.delimiter", d).ok())
            .unwrap_or(b',')
    }

    fn bundle_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[source]
halls = "https://hamburg-basket.de/hallen/"
schedule = "spielplan.csv"
timeout_seconds = 10

[overrides]
path = "hall_overrides.json"

[patterns]
label_prefix = "HBV"
numbered_sub_venues = ["PEPE", "SAND"]

[schedule]
delimiter = ";"
league = "M10C"

[load]
output_path = "./out"
output_formats = ["csv", "json"]

[load.compression]
enabled = true
filename = "hallen.zip"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.halls_source(), "https://hamburg-basket.de/hallen/");
        assert_eq!(config.schedule_source(), Some("spielplan.csv"));
        assert_eq!(config.timeout_seconds(), 10);
        assert_eq!(config.schedule_delimiter(), b';');
        assert_eq!(config.bundle_filename(), Some("hallen.zip"));
        assert_eq!(config.patterns.numbered_sub_venues, vec!["PEPE", "SAND"]);
        assert_eq!(config.patterns.max_code_len, 6);
        assert_eq!(config.schedule_filter().league.as_deref(), Some("M10C"));
        assert_eq!(config.schedule_filter().team, None);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("[source]\nhalls = \"hallen.html\"\n").unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.output_path(), "./output");
        assert_eq!(config.output_formats(), &["csv".to_string()]);
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.overrides_path(), None);
        assert_eq!(config.bundle_filename(), None);
        assert_eq!(config.patterns, PatternConfig::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HALL_DIRECTORY_TEST_SOURCE", "https://test.example.com/hallen/");

        let config =
            TomlConfig::from_toml_str("[source]\nhalls = \"${HALL_DIRECTORY_TEST_SOURCE}\"\n")
                .unwrap();
        assert_eq!(config.source.halls, "https://test.example.com/hallen/");

        std::env::remove_var("HALL_DIRECTORY_TEST_SOURCE");
    }

    #[test]
    fn test_config_validation() {
        let missing = TomlConfig::default();
        assert!(matches!(
            missing.validate(),
            Err(HallError::MissingConfigError { .. })
        ));

        let mut config = TomlConfig::default();
        config.source.halls = "https://".to_string();
        assert!(config.validate().is_err());

        config.source.halls = "hallen.html".to_string();
        config.load.output_formats = vec!["xlsx".to_string()];
        assert!(config.validate().is_err());

        config.load.output_formats = vec!["tsv".to_string()];
        config.schedule.delimiter = Some("::".to_string());
        assert!(config.validate().is_err());

        config.schedule.delimiter = None;
        config.patterns.postal_code = "(".to_string();
        assert!(matches!(config.validate(), Err(HallError::RegexError(_))));
    }

    #[test]
    fn test_disabled_compression_writes_plain_files() {
        let mut config = TomlConfig::default();
        config.load.compression = Some(CompressionConfig {
            enabled: false,
            filename: String::new(),
        });
        assert_eq!(config.bundle_filename(), None);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[source]\nhalls = \"hallen.html\"\n\n[load]\noutput_formats = [\"tsv\"]\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_formats(), &["tsv".to_string()]);
        assert_eq!(config.output_path(), "./output");
    }

    #[test]
    fn test_bad_toml_is_a_config_error() {
        let err = TomlConfig::from_toml_str("[source\nhalls = 1").unwrap_err();
        assert!(matches!(err, HallError::ConfigValidationError { .. }));
    }
}
