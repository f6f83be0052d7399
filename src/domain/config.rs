use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Configuration for a donation registry store.
///
/// This struct holds settings that control where the registry snapshot is
/// kept and how dates and recipient imports are read and written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// File name of the registry snapshot, relative to the store's metadata
    /// directory.
    snapshot_file: String,

    /// `chrono` format string for donation dates.
    ///
    /// For example, `%d/%m/%Y` reads and prints `25/12/2024`.
    date_format: String,

    /// The literal header line recognised (and skipped) in recipient import
    /// files.
    pub csv_header: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
            date_format: default_date_format(),
            csv_header: default_csv_header(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))?;
        if !is_valid_date_format(&config.date_format) {
            return Err(format!(
                "Failed to parse config file: invalid date format '{}'",
                config.date_format
            ));
        }
        Ok(config)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the snapshot file name.
    #[must_use]
    pub fn snapshot_file(&self) -> &str {
        &self.snapshot_file
    }

    /// Returns the date format.
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Sets the date format.
    ///
    /// Returns `false` (leaving the current format in place) if `format`
    /// contains an unrecognised specifier.
    pub fn set_date_format(&mut self, format: String) -> bool {
        if is_valid_date_format(&format) {
            self.date_format = format;
            true
        } else {
            false
        }
    }
}

fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

fn default_snapshot_file() -> String {
    "registry.json".to_string()
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_csv_header() -> String {
    "id,name,email,phone,class".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_snapshot_file")]
        snapshot_file: String,

        #[serde(default = "default_date_format")]
        date_format: String,

        #[serde(default = "default_csv_header")]
        csv_header: String,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                snapshot_file,
                date_format,
                csv_header,
            } => Self {
                snapshot_file,
                date_format,
                csv_header,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            snapshot_file: config.snapshot_file,
            date_format: config.date_format,
            csv_header: config.csv_header,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nsnapshot_file = \"state.json\"\ndate_format = \"%Y-%m-%d\"\ncsv_header = \"id;name\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.snapshot_file(), "state.json");
        assert_eq!(config.date_format(), "%Y-%m-%d");
        assert_eq!(config.csv_header, "id;name");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nsnapshot_file = 3\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn load_rejects_bad_date_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ndate_format = \"%Q\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.contains("invalid date format"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        assert!(config.set_date_format("%Y/%m/%d".to_string()));
        assert!(!config.set_date_format("%Q".to_string()));

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }
}
