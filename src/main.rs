// ABOUTME: CLI entry point for mysql-json-cli
// ABOUTME: Loads or creates connection settings, then runs the interactive menu

use mysql_json_cli::config::{self, Paths};
use mysql_json_cli::console::TerminalConsole;
use mysql_json_cli::menu::Menu;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; keep the default quiet so they don't interleave with the menu
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let paths = Paths::default();
    let mut console = TerminalConsole::new();

    let settings = config::load_or_create(&paths.config_file, &mut console)?;

    Menu::new(&mut console, &settings, &paths.output_dir)
        .run()
        .await?;

    Ok(())
}
