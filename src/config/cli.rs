use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "hall-directory.toml";

/// Command-line flags. Any flag that is given wins over the config file.
#[derive(Debug, Clone, Parser)]
#[command(name = "hall-directory")]
#[command(about = "Builds the hall directory from the halls page and joins it with the league schedule")]
pub struct CliArgs {
    #[arg(short, long, help = "TOML config file (default: ./hall-directory.toml if present)")]
    pub config: Option<String>,

    #[arg(long, help = "URL or path of the halls page")]
    pub halls: Option<String>,

    #[arg(long, help = "CSV/TSV schedule to join with the directory")]
    pub schedule: Option<String>,

    #[arg(long, help = "JSON file with manual hall overrides")]
    pub overrides: Option<String>,

    #[arg(short, long, help = "Output directory")]
    pub output: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Output formats: csv, tsv, json")]
    pub formats: Vec<String>,

    #[arg(long, help = "Only keep games of this league")]
    pub league: Option<String>,

    #[arg(long, help = "Only keep games of this team")]
    pub team: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Validate and print the configuration without running")]
    pub dry_run: bool,
}

impl CliArgs {
    /// Reads the config file, if any, and lays the flags over it.
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::debug!("Using {}", DEFAULT_CONFIG_FILE);
                TomlConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => TomlConfig::default(),
        };
        self.apply_to(&mut config);
        Ok(config)
    }

    pub fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(halls) = &self.halls {
            config.source.halls = halls.clone();
        }
        if let Some(schedule) = &self.schedule {
            config.source.schedule = Some(schedule.clone());
        }
        if let Some(overrides) = &self.overrides {
            config.overrides.path = Some(overrides.clone());
        }
        if let Some(output) = &self.output {
            config.load.output_path = output.clone();
        }
        if !self.formats.is_empty() {
            config.load.output_formats = self.formats.clone();
        }
        if let Some(league) = &self.league {
            config.schedule.league = Some(league.clone());
        }
        if let Some(team) = &self.team {
            config.schedule.team = Some(team.clone());
        }
    }
}
