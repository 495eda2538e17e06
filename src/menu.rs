// ABOUTME: Interactive numbered menu driving export and import operations
// ABOUTME: Sequential state machine; operation failures are reported and the menu resumes

use crate::config::Settings;
use crate::console::Console;
use crate::error::{CliError, CliResult};
use crate::{export, import};
use std::path::{Path, PathBuf};

const BANNER: &str = r#"
    ╔════════════════════════════════════════════╗
    ║            📦 MySQL to JSON CLI            ║
    ╠════════════════════════════════════════════╣
    ║   1. 📤 Export data from a table           ║
    ║   2. 📥 Import data from a JSON file       ║
    ║   3. ❌ Exit                                ║
    ╚════════════════════════════════════════════╝
"#;

/// Where the menu loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    AwaitingChoice,
    ExportFlow,
    ImportFlow,
    Exit,
}

impl MenuState {
    /// State selected by a menu answer, or `None` for an invalid answer.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(MenuState::ExportFlow),
            "2" => Some(MenuState::ImportFlow),
            "3" => Some(MenuState::Exit),
            _ => None,
        }
    }
}

pub struct Menu<'a, C: Console + ?Sized> {
    console: &'a mut C,
    settings: &'a Settings,
    output_dir: PathBuf,
}

impl<'a, C: Console + ?Sized> Menu<'a, C> {
    pub fn new(console: &'a mut C, settings: &'a Settings, output_dir: impl AsRef<Path>) -> Self {
        Self {
            console,
            settings,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Run until the user picks Exit.
    ///
    /// Export and import failures never end the loop. Only a console failure
    /// (for example stdin closing) returns an error.
    pub async fn run(&mut self) -> CliResult<()> {
        let mut state = MenuState::AwaitingChoice;

        loop {
            state = match state {
                MenuState::AwaitingChoice => self.await_choice()?,
                MenuState::ExportFlow => {
                    self.export_flow().await?;
                    MenuState::AwaitingChoice
                }
                MenuState::ImportFlow => {
                    self.import_flow().await?;
                    MenuState::AwaitingChoice
                }
                MenuState::Exit => {
                    self.say("")?;
                    self.say("👋 Thanks for using the MySQL to JSON CLI. Goodbye!")?;
                    return Ok(());
                }
            };
        }
    }

    fn await_choice(&mut self) -> CliResult<MenuState> {
        self.console.clear().map_err(CliError::Prompt)?;
        self.say(BANNER)?;

        let choice = self.ask("👉 Choose an option")?;
        match MenuState::from_choice(&choice) {
            Some(next) => Ok(next),
            None => {
                tracing::debug!("Invalid menu choice {:?}", choice);
                self.say("")?;
                self.say("❌ Invalid option! Please try again.")?;
                self.pause()?;
                Ok(MenuState::AwaitingChoice)
            }
        }
    }

    async fn export_flow(&mut self) -> CliResult<()> {
        let table_name = self.ask("📝 Enter the name of the table to export")?;
        let table_name = table_name.trim();

        match export::export_table(self.settings, table_name, &self.output_dir).await {
            Ok(report) => {
                let file_name = report
                    .path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| report.path.display().to_string());
                self.say("")?;
                self.say(&format!(
                    "✨ Exported {} rows to \"{}\" successfully! ✨",
                    report.rows, file_name
                ))?;
            }
            Err(e) => {
                tracing::warn!("Export of '{}' failed: {}", table_name, e);
                self.say("")?;
                self.say(&format!("❌ Error exporting data: {}", e))?;
            }
        }

        self.pause()
    }

    async fn import_flow(&mut self) -> CliResult<()> {
        let file_path = self.ask("📝 Enter the path of the JSON file")?;
        let table_name = self.ask("📝 Enter the name of the table to import into")?;
        let file_path = PathBuf::from(file_path.trim());
        let table_name = table_name.trim();

        match import::import_table(self.settings, &file_path, table_name).await {
            Ok(report) => {
                self.say("")?;
                self.say(&format!(
                    "✨ Imported {} rows from \"{}\" into table \"{}\" successfully! ✨",
                    report.rows,
                    file_path.display(),
                    report.table_name
                ))?;
            }
            Err(e) => {
                tracing::warn!(
                    "Import of {} into '{}' failed: {}",
                    file_path.display(),
                    table_name,
                    e
                );
                self.say("")?;
                self.say(&format!("❌ Error importing data: {}", e))?;
            }
        }

        self.pause()
    }

    fn pause(&mut self) -> CliResult<()> {
        self.ask("🔄 Press Enter to return to the main menu...")
            .map(|_| ())
    }

    fn ask(&mut self, prompt: &str) -> CliResult<String> {
        self.console.read_line(prompt).map_err(CliError::Prompt)
    }

    fn say(&mut self, line: &str) -> CliResult<()> {
        self.console.write_line(line).map_err(CliError::Prompt)
    }
}
