// ABOUTME: Persisted MySQL connection settings with interactive first-run setup
// ABOUTME: Loads dbConfig.json when present, otherwise prompts and saves it

use crate::console::Console;
use crate::error::{CliError, CliResult};
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "./dbConfig.json";
pub const DEFAULT_OUTPUT_DIR: &str = "./bkp";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PORT: u16 = 3306;

/// Connection parameters, read-only after startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Not prompted for; may be added to the file by hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Settings {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

/// Filesystem locations used by the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config_file: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Load settings from `path`, or run first-time setup when the file is absent.
///
/// Setup prompts for host, user, password and database in that order. Blank
/// host and user fall back to `localhost` and `root`; password and database
/// are kept exactly as typed. The result is written to `path` (parent
/// directories are created) before being returned.
///
/// # Errors
///
/// - [`CliError::ConfigParse`] if the file exists but is malformed; there is
///   no fallback to prompting.
/// - [`CliError::Filesystem`] if the file cannot be read or written.
/// - [`CliError::Prompt`] if the console fails during setup.
pub fn load_or_create<C: Console + ?Sized>(path: &Path, console: &mut C) -> CliResult<Settings> {
    if path.exists() {
        let settings = load(path)?;
        tracing::info!("Loaded settings from {}", path.display());
        say(console, "")?;
        say(console, "✅ Settings found! Using the saved connection settings:")?;
        say(console, &describe(&settings))?;
        return Ok(settings);
    }

    say(console, "")?;
    say(
        console,
        "⚙️  Let's configure the database connection. Enter the following:",
    )?;

    let host = ask(console, "🔑 Host (default: localhost)")?;
    let user = ask(console, "🔑 User (default: root)")?;
    let password = console.read_secret("🔑 Password").map_err(CliError::Prompt)?;
    let database = ask(console, "🔑 Database name")?;

    let settings = Settings {
        host: or_default(host, DEFAULT_HOST),
        user: or_default(user, DEFAULT_USER),
        password,
        database,
        port: None,
    };

    save(path, &settings)?;
    tracing::info!("Saved settings to {}", path.display());
    say(console, "")?;
    say(
        console,
        &format!("✅ Settings saved to '{}'.", path.display()),
    )?;

    Ok(settings)
}

/// Parse an existing settings file.
pub fn load(path: &Path) -> CliResult<Settings> {
    let raw = fs::read_to_string(path).map_err(|e| CliError::filesystem(path, e))?;
    serde_json::from_str(&raw).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save(path: &Path, settings: &Settings) -> CliResult<()> {
    utils::write_json_pretty(path, settings)
}

/// Settings summary for display. The password is masked.
pub fn describe(settings: &Settings) -> String {
    format!(
        "  host: {}\n  port: {}\n  user: {}\n  password: {}\n  database: {}",
        settings.host,
        settings.port(),
        settings.user,
        if settings.password.is_empty() {
            "(empty)"
        } else {
            "********"
        },
        settings.database
    )
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

fn ask<C: Console + ?Sized>(console: &mut C, prompt: &str) -> CliResult<String> {
    console.read_line(prompt).map_err(CliError::Prompt)
}

fn say<C: Console + ?Sized>(console: &mut C, line: &str) -> CliResult<()> {
    console.write_line(line).map_err(CliError::Prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use tempfile::tempdir;

    #[test]
    fn first_run_applies_defaults_for_blank_host_and_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dbConfig.json");
        let mut console = ScriptedConsole::new(["", "", "", "shop"]);

        let settings = load_or_create(&path, &mut console).unwrap();

        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.user, "root");
        assert_eq!(settings.password, "");
        assert_eq!(settings.database, "shop");
        assert_eq!(console.prompts().len(), 4);

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["host"], "localhost");
        assert_eq!(on_disk["user"], "root");
        assert_eq!(on_disk["password"], "");
        assert!(on_disk.get("port").is_none());
    }

    #[test]
    fn second_load_does_not_prompt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dbConfig.json");
        let mut setup = ScriptedConsole::new(["db.internal", "app", "s3cret", "shop"]);
        let first = load_or_create(&path, &mut setup).unwrap();

        let mut again = ScriptedConsole::new(Vec::<String>::new());
        let second = load_or_create(&path, &mut again).unwrap();
        let third = load_or_create(&path, &mut again).unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert!(again.prompts().is_empty());
    }

    #[test]
    fn setup_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/conf/dbConfig.json");
        let mut console = ScriptedConsole::new(["h", "u", "p", "d"]);
        load_or_create(&path, &mut console).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dbConfig.json");
        fs::write(&path, "{ not json").unwrap();
        let mut console = ScriptedConsole::new(["should", "not", "be", "used"]);

        let result = load_or_create(&path, &mut console);

        assert!(matches!(result, Err(CliError::ConfigParse { .. })));
        assert!(console.prompts().is_empty());
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dbConfig.json");
        fs::write(&path, r#"{"host": "localhost", "user": "root"}"#).unwrap();
        assert!(matches!(load(&path), Err(CliError::ConfigParse { .. })));
    }

    #[test]
    fn optional_port_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dbConfig.json");
        fs::write(
            &path,
            r#"{"host": "h", "user": "u", "password": "", "database": "d", "port": 3307}"#,
        )
        .unwrap();
        let settings = load(&path).unwrap();
        assert_eq!(settings.port(), 3307);
    }

    #[test]
    fn describe_masks_password() {
        let settings = Settings {
            host: "h".into(),
            user: "u".into(),
            password: "hunter2".into(),
            database: "d".into(),
            port: None,
        };
        let text = describe(&settings);
        assert!(!text.contains("hunter2"));
        assert!(text.contains("3306"));
    }
}
