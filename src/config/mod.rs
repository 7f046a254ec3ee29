//! Configuration management.
//!
//! Settings are resolved once per command, field by field, with priority:
//!
//! 1. CLI flag (`--catalog-url`, `--spreadsheet`)
//! 2. Environment variable (a `.env` file is loaded into the environment
//!    by `main` before parsing)
//! 3. JSON config file: `~/.shelfsync/config.json`, or `--config <path>`
//! 4. Built-in default
//!
//! # Credentials
//!
//! WooCommerce consumer key/secret come from the environment or the config
//! file. The Google access token is taken from `GOOGLE_ACCESS_TOKEN`, or
//! read from a token file (`{"access_token": "..."}`) written by whatever
//! OAuth flow the operator uses.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_PER_PAGE: usize = 100;
pub const DEFAULT_SPREADSHEET_NAME: &str = "WooCommerce-products";
pub const DEFAULT_SHEET_TITLE: &str = "products";

pub const ENV_CATALOG_URL: &str = "SHELFSYNC_CATALOG_URL";
pub const ENV_CONSUMER_KEY: &str = "WOOCOMMERCE_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "WOOCOMMERCE_CONSUMER_SECRET";
pub const ENV_PER_PAGE: &str = "SHELFSYNC_PER_PAGE";
pub const ENV_SPREADSHEET: &str = "SHELFSYNC_SPREADSHEET";
pub const ENV_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";
pub const ENV_TOKEN_FILE: &str = "SHELFSYNC_GOOGLE_TOKEN";

/// Contents of `config.json`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub catalog_url: Option<String>,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub per_page: Option<usize>,
    pub spreadsheet: Option<String>,
    pub sheet_title: Option<String>,
    pub google_token_file: Option<PathBuf>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub catalog_url: Option<String>,
    pub spreadsheet: Option<String>,
    pub config_path: Option<PathBuf>,
}

/// WooCommerce connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// REST base, e.g. `https://shop.example.com/wp-json/wc/v3`.
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub per_page: usize,
}

/// Google Sheets settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSettings {
    pub spreadsheet_name: String,
    pub sheet_title: String,
    pub access_token: String,
}

/// Fully resolved settings for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub sheets: SheetSettings,
}

/// `~/.shelfsync`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".shelfsync"))
}

/// `~/.shelfsync/config.json`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.json"))
}

/// `~/.shelfsync/credentials/token.json`
#[must_use]
pub fn default_token_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("credentials").join("token.json"))
}

/// Load the config file.
///
/// An explicit path must exist; the default path is optional.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_config_file(explicit: Option<&Path>) -> Result<ConfigFile> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ConfigFile::default()),
        },
    };

    let content = fs::read_to_string(&path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    debug!(path = %path.display(), "Loaded config file");

    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
    })
}

/// Resolve settings from the process environment.
///
/// # Errors
///
/// Returns an error if the config file is unreadable, a required setting
/// is missing, or the Google token cannot be read.
pub fn resolve_settings(overrides: &Overrides) -> Result<Settings> {
    let file = load_config_file(overrides.config_path.as_deref())?;
    resolve_with(overrides, &file, |name| std::env::var(name).ok())
}

/// Resolve settings against an explicit environment lookup.
///
/// # Errors
///
/// - [`Error::MissingSetting`] for a missing catalog URL, consumer key or
///   secret, or Google token
/// - [`Error::Config`] for an invalid page size or unreadable token file
pub fn resolve_with<E>(overrides: &Overrides, file: &ConfigFile, env: E) -> Result<Settings>
where
    E: Fn(&str) -> Option<String>,
{
    let env = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    let base_url = overrides
        .catalog_url
        .clone()
        .or_else(|| env(ENV_CATALOG_URL))
        .or_else(|| file.catalog_url.clone())
        .ok_or(Error::MissingSetting {
            name: "catalog URL",
            env: ENV_CATALOG_URL,
            key: "catalog_url",
        })?;

    let consumer_key = env(ENV_CONSUMER_KEY)
        .or_else(|| file.consumer_key.clone())
        .ok_or(Error::MissingSetting {
            name: "WooCommerce consumer key",
            env: ENV_CONSUMER_KEY,
            key: "consumer_key",
        })?;

    let consumer_secret = env(ENV_CONSUMER_SECRET)
        .or_else(|| file.consumer_secret.clone())
        .ok_or(Error::MissingSetting {
            name: "WooCommerce consumer secret",
            env: ENV_CONSUMER_SECRET,
            key: "consumer_secret",
        })?;

    let per_page = match env(ENV_PER_PAGE) {
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            Error::Config(format!("{ENV_PER_PAGE} must be a positive integer, got \"{raw}\""))
        })?,
        None => file.per_page.unwrap_or(DEFAULT_PER_PAGE),
    };
    if per_page == 0 {
        return Err(Error::Config("Page size must be at least 1".to_string()));
    }

    let spreadsheet_name = overrides
        .spreadsheet
        .clone()
        .or_else(|| env(ENV_SPREADSHEET))
        .or_else(|| file.spreadsheet.clone())
        .unwrap_or_else(|| DEFAULT_SPREADSHEET_NAME.to_string());

    let sheet_title = file
        .sheet_title
        .clone()
        .unwrap_or_else(|| DEFAULT_SHEET_TITLE.to_string());

    let access_token = match env(ENV_ACCESS_TOKEN) {
        Some(token) => token,
        None => {
            let path = env(ENV_TOKEN_FILE)
                .map(PathBuf::from)
                .or_else(|| file.google_token_file.clone())
                .or_else(default_token_path);
            match path {
                Some(path) if path.exists() => read_access_token(&path)?,
                _ => {
                    return Err(Error::MissingSetting {
                        name: "Google access token",
                        env: ENV_ACCESS_TOKEN,
                        key: "google_token_file",
                    });
                }
            }
        }
    };

    Ok(Settings {
        catalog: CatalogSettings {
            base_url,
            consumer_key,
            consumer_secret,
            per_page,
        },
        sheets: SheetSettings {
            spreadsheet_name,
            sheet_title,
            access_token,
        },
    })
}

#[derive(Deserialize)]
struct TokenFile {
    access_token: Option<String>,
}

/// Read `access_token` from an OAuth token file.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file is unreadable, not JSON, or has no
/// non-empty `access_token`.
pub fn read_access_token(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read token file {}: {e}", path.display()))
    })?;
    let token: TokenFile = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse token file {}: {e}", path.display()))
    })?;

    token
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Config(format!("No access_token in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_CATALOG_URL, "https://env.example.com/wp-json/wc/v3"),
            (ENV_CONSUMER_KEY, "ck_env"),
            (ENV_CONSUMER_SECRET, "cs_env"),
            (ENV_ACCESS_TOKEN, "ya29.env"),
        ]
    }

    #[test]
    fn test_defaults_apply() {
        let settings =
            resolve_with(&Overrides::default(), &ConfigFile::default(), env_of(&full_env())).unwrap();
        assert_eq!(settings.catalog.per_page, DEFAULT_PER_PAGE);
        assert_eq!(settings.sheets.spreadsheet_name, DEFAULT_SPREADSHEET_NAME);
        assert_eq!(settings.sheets.sheet_title, DEFAULT_SHEET_TITLE);
        assert_eq!(settings.sheets.access_token, "ya29.env");
    }

    #[test]
    fn test_flag_beats_env_beats_file() {
        let file = ConfigFile {
            catalog_url: Some("https://file.example.com".into()),
            spreadsheet: Some("From File".into()),
            per_page: Some(50),
            ..ConfigFile::default()
        };
        let overrides = Overrides {
            catalog_url: Some("https://flag.example.com".into()),
            ..Overrides::default()
        };

        let mut env = full_env();
        env.push((ENV_SPREADSHEET, "From Env"));
        let settings = resolve_with(&overrides, &file, env_of(&env)).unwrap();

        assert_eq!(settings.catalog.base_url, "https://flag.example.com");
        assert_eq!(settings.sheets.spreadsheet_name, "From Env");
        assert_eq!(settings.catalog.per_page, 50);
    }

    #[test]
    fn test_blank_env_counts_as_unset() {
        let file = ConfigFile {
            consumer_key: Some("ck_file".into()),
            ..ConfigFile::default()
        };
        let mut env = full_env();
        env.retain(|(k, _)| *k != ENV_CONSUMER_KEY);
        env.push((ENV_CONSUMER_KEY, "  "));
        let settings = resolve_with(&Overrides::default(), &file, env_of(&env)).unwrap();
        assert_eq!(settings.catalog.consumer_key, "ck_file");
    }

    #[test]
    fn test_missing_catalog_url() {
        let mut env = full_env();
        env.retain(|(k, _)| *k != ENV_CATALOG_URL);
        let err = resolve_with(&Overrides::default(), &ConfigFile::default(), env_of(&env))
            .unwrap_err();
        assert!(matches!(err, Error::MissingSetting { env: ENV_CATALOG_URL, .. }));
    }

    #[test]
    fn test_invalid_page_size() {
        let mut env = full_env();
        env.push((ENV_PER_PAGE, "lots"));
        assert!(matches!(
            resolve_with(&Overrides::default(), &ConfigFile::default(), env_of(&env)),
            Err(Error::Config(_))
        ));

        let file = ConfigFile {
            per_page: Some(0),
            ..ConfigFile::default()
        };
        assert!(resolve_with(&Overrides::default(), &file, env_of(&full_env())).is_err());
    }

    #[test]
    fn test_token_read_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, r#"{"access_token": "ya29.file", "refresh_token": "r"}"#).unwrap();

        let mut env = full_env();
        env.retain(|(k, _)| *k != ENV_ACCESS_TOKEN);
        env.push((ENV_TOKEN_FILE, path.to_str().unwrap()));

        let settings =
            resolve_with(&Overrides::default(), &ConfigFile::default(), env_of(&env)).unwrap();
        assert_eq!(settings.sheets.access_token, "ya29.file");
    }

    #[test]
    fn test_missing_token_file_is_missing_setting() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile {
            google_token_file: Some(dir.path().join("absent.json")),
            ..ConfigFile::default()
        };
        let mut env = full_env();
        env.retain(|(k, _)| *k != ENV_ACCESS_TOKEN);

        let err = resolve_with(&Overrides::default(), &file, env_of(&env)).unwrap_err();
        assert!(matches!(err, Error::MissingSetting { env: ENV_ACCESS_TOKEN, .. }));
    }

    #[test]
    fn test_token_file_without_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, r#"{"refresh_token": "r"}"#).unwrap();
        assert!(matches!(read_access_token(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"catalog_url": "https://shop.example.com/wp-json/wc/v3", "per_page": 25}"#,
        )
        .unwrap();

        let file = load_config_file(Some(&path)).unwrap();
        assert_eq!(file.per_page, Some(25));
        assert_eq!(file.spreadsheet, None);

        assert!(load_config_file(Some(&dir.path().join("missing.json"))).is_err());

        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_config_file(Some(&path)), Err(Error::Config(_))));
    }
}
