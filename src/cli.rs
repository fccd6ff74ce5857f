//! Command-line interface parsing for Noor Al-Huda
//!
//! This module handles parsing of CLI arguments using clap and merges them
//! over the configuration file to produce the startup settings.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{AppConfig, ConfigError};
use crate::data::{Coordinates, DhikrCategory, SURAH_COUNT};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The given latitude/longitude are out of range
    #[error("Invalid coordinates: {lat}, {lng}. Latitude must be within ±90 and longitude within ±180")]
    InvalidCoordinates { lat: f64, lng: f64 },

    /// The ayah reference is not `SURAH:AYAH`
    #[error("Invalid ayah reference: '{0}'. Expected SURAH:AYAH, e.g. 2:255")]
    InvalidAyahRef(String),

    /// The configuration file could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// An ayah addressed by surah number and position within the surah
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AyahRef {
    pub surah: u16,
    pub ayah: u16,
}

impl FromStr for AyahRef {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::InvalidAyahRef(s.to_string());

        let (surah, ayah) = s.split_once(':').ok_or_else(invalid)?;
        let surah: u16 = surah.trim().parse().map_err(|_| invalid())?;
        let ayah: u16 = ayah.trim().parse().map_err(|_| invalid())?;

        if !(1..=SURAH_COUNT).contains(&surah) || ayah == 0 {
            return Err(invalid());
        }
        Ok(Self { surah, ayah })
    }
}

/// Noor Al-Huda - prayer times with a live countdown to the next prayer
#[derive(Parser, Debug)]
#[command(name = "noorhuda")]
#[command(about = "Prayer times with a live countdown, plus Quran lookups")]
#[command(version)]
#[command(group(ArgGroup::new("mode").args(["once", "surahs", "surah", "tafsir", "adhkar"]).multiple(false)))]
pub struct Cli {
    /// Latitude of the location for prayer times
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the location for prayer times
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Prayer-time calculation method (Aladhan method id, default 4: Umm al-Qura)
    #[arg(long)]
    pub method: Option<u8>,

    /// Print today's prayer times and the countdown once, then exit
    #[arg(long)]
    pub once: bool,

    /// List all surahs and exit
    #[arg(long)]
    pub surahs: bool,

    /// Print the Arabic text of a surah and exit
    #[arg(long, value_name = "NUMBER", value_parser = clap::value_parser!(u16).range(1..=i64::from(SURAH_COUNT)))]
    pub surah: Option<u16>,

    /// Print the tafsir of one ayah and exit
    ///
    /// Example: noorhuda --tafsir 2:255
    #[arg(long, value_name = "SURAH:AYAH")]
    pub tafsir: Option<AyahRef>,

    /// Print the daily remembrances and exit, optionally for one category
    ///
    /// Examples:
    ///   noorhuda --adhkar            # Every category
    ///   noorhuda --adhkar morning    # Morning remembrances only
    #[arg(long, value_name = "CATEGORY", num_args = 0..=1)]
    pub adhkar: Option<Option<DhikrCategory>>,

    /// Path to a config file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// What the program should do after startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Interactive prayer-times dashboard
    #[default]
    Dashboard,
    /// Print prayer times and the countdown once
    Once,
    /// Print the surah index
    Surahs,
    /// Print one surah's text
    Surah(u16),
    /// Print one ayah's tafsir
    Tafsir(AyahRef),
    /// Print the remembrances, all of them for `None`
    Adhkar(Option<DhikrCategory>),
}

impl Mode {
    /// Whether this mode takes over the terminal
    pub fn is_interactive(self) -> bool {
        self == Mode::Dashboard
    }
}

/// Configuration derived from CLI arguments and the config file
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Effective settings after CLI overrides
    pub config: AppConfig,
    /// Selected run mode
    pub mode: Mode,
}

impl StartupConfig {
    /// Loads the config file named by `--config` (or the default one) and
    /// applies the CLI overrides on top
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let file_config = match &cli.config {
            Some(path) => AppConfig::load(path)?,
            None => match AppConfig::default_path() {
                Some(path) => AppConfig::load(&path)?,
                None => AppConfig::default(),
            },
        };

        Self::resolve(cli, file_config)
    }

    /// Applies the CLI overrides to an already loaded configuration
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the merged settings
    /// * `Err(CliError)` if the coordinates are out of range
    pub fn resolve(cli: &Cli, mut config: AppConfig) -> Result<Self, CliError> {
        if let (Some(lat), Some(lng)) = (cli.lat, cli.lng) {
            let location =
                Coordinates::new(lat, lng).ok_or(CliError::InvalidCoordinates { lat, lng })?;
            config.location = Some(location);
        }
        if let Some(method) = cli.method {
            config.method = method;
        }

        let mode = if cli.once {
            Mode::Once
        } else if cli.surahs {
            Mode::Surahs
        } else if let Some(number) = cli.surah {
            Mode::Surah(number)
        } else if let Some(reference) = cli.tafsir {
            Mode::Tafsir(reference)
        } else if let Some(category) = cli.adhkar {
            Mode::Adhkar(category)
        } else {
            Mode::Dashboard
        };

        Ok(Self { config, mode })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(args: &[&str]) -> Result<StartupConfig, CliError> {
        let cli = Cli::parse_from(args);
        StartupConfig::resolve(&cli, AppConfig::default())
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["noorhuda"]);
        assert!(cli.lat.is_none());
        assert!(cli.lng.is_none());
        assert!(!cli.once);
    }

    #[test]
    fn test_cli_parse_negative_coordinates() {
        let cli = Cli::parse_from(["noorhuda", "--lat", "-33.86", "--lng", "151.21"]);
        assert_eq!(cli.lat, Some(-33.86));
        assert_eq!(cli.lng, Some(151.21));
    }

    #[test]
    fn test_lat_requires_lng() {
        let result = Cli::try_parse_from(["noorhuda", "--lat", "21.42"]);
        assert!(result.is_err(), "--lat alone should be rejected");
    }

    #[test]
    fn test_modes_are_mutually_exclusive() {
        let result = Cli::try_parse_from(["noorhuda", "--once", "--surahs"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_surah_number_range_is_checked() {
        assert!(Cli::try_parse_from(["noorhuda", "--surah", "0"]).is_err());
        assert!(Cli::try_parse_from(["noorhuda", "--surah", "115"]).is_err());
        assert!(Cli::try_parse_from(["noorhuda", "--surah", "114"]).is_ok());
    }

    #[test]
    fn test_surah_limit_matches_surah_count() {
        let last = SURAH_COUNT.to_string();
        let past_last = (SURAH_COUNT + 1).to_string();
        assert!(Cli::try_parse_from(["noorhuda", "--surah", last.as_str()]).is_ok());
        assert!(Cli::try_parse_from(["noorhuda", "--surah", past_last.as_str()]).is_err());
    }

    #[test]
    fn test_adhkar_category_is_optional() {
        assert_eq!(
            resolve(&["noorhuda", "--adhkar"]).unwrap().mode,
            Mode::Adhkar(None)
        );
        assert_eq!(
            resolve(&["noorhuda", "--adhkar", "evening"]).unwrap().mode,
            Mode::Adhkar(Some(DhikrCategory::Evening))
        );
        assert!(Cli::try_parse_from(["noorhuda", "--adhkar", "night"]).is_err());
        assert!(Cli::try_parse_from(["noorhuda", "--adhkar", "--once"]).is_err());
    }

    #[test]
    fn test_ayah_ref_parsing() {
        assert_eq!(
            "2:255".parse::<AyahRef>().unwrap(),
            AyahRef {
                surah: 2,
                ayah: 255
            }
        );
        assert!("2".parse::<AyahRef>().is_err());
        assert!("0:1".parse::<AyahRef>().is_err());
        assert!("1:0".parse::<AyahRef>().is_err());
        assert!("a:b".parse::<AyahRef>().is_err());

        let err = "foo".parse::<AyahRef>().unwrap_err();
        assert!(err.to_string().contains("SURAH:AYAH"));
    }

    #[test]
    fn test_startup_config_default_is_dashboard() {
        let config = resolve(&["noorhuda"]).unwrap();
        assert_eq!(config.mode, Mode::Dashboard);
        assert!(config.mode.is_interactive());
        assert!(config.config.location.is_none());
    }

    #[test]
    fn test_cli_location_overrides_config() {
        let cli = Cli::parse_from(["noorhuda", "--lat", "30.04", "--lng", "31.24", "--method", "5"]);
        let file_config = AppConfig {
            location: Coordinates::new(21.42, 39.83),
            ..AppConfig::default()
        };

        let config = StartupConfig::resolve(&cli, file_config).unwrap();

        assert_eq!(config.config.location, Coordinates::new(30.04, 31.24));
        assert_eq!(config.config.method, 5);
    }

    #[test]
    fn test_config_location_kept_without_cli_override() {
        let cli = Cli::parse_from(["noorhuda"]);
        let file_config = AppConfig {
            location: Coordinates::new(21.42, 39.83),
            ..AppConfig::default()
        };

        let config = StartupConfig::resolve(&cli, file_config).unwrap();
        assert_eq!(config.config.location, Coordinates::new(21.42, 39.83));
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let result = resolve(&["noorhuda", "--lat", "95", "--lng", "0"]);
        assert!(matches!(result, Err(CliError::InvalidCoordinates { .. })));
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(resolve(&["noorhuda", "--once"]).unwrap().mode, Mode::Once);
        assert_eq!(resolve(&["noorhuda", "--surahs"]).unwrap().mode, Mode::Surahs);
        assert_eq!(resolve(&["noorhuda", "--surah", "36"]).unwrap().mode, Mode::Surah(36));
        assert_eq!(
            resolve(&["noorhuda", "--tafsir", "1:1"]).unwrap().mode,
            Mode::Tafsir(AyahRef { surah: 1, ayah: 1 })
        );
    }

    #[test]
    fn test_from_cli_reads_named_config_file() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"method": 3}"#).expect("Should write config");

        let cli = Cli::parse_from(["noorhuda", "--config", path.to_str().unwrap()]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.config.method, 3);
    }
}
