// ABOUTME: Exports one MySQL table to <output_dir>/<table>.json
// ABOUTME: Reads every row over a single connection and writes an ExportDocument

use crate::config::Settings;
use crate::document::ExportDocument;
use crate::error::CliResult;
use crate::mysql::{self, reader};
use crate::utils;
use futures::FutureExt;
use std::path::{Path, PathBuf};

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
}

/// File an export of `table_name` is written to.
pub fn export_path(output_dir: &Path, table_name: &str) -> PathBuf {
    output_dir.join(format!("{}.json", table_name))
}

/// Export every row of `table_name` to `<output_dir>/<table_name>.json`.
///
/// The table name is validated before a connection is opened. The output
/// directory is created when missing and an existing file for the same table
/// is replaced. An empty table produces `"data": []`.
///
/// # Errors
///
/// Returns the first failure among table name validation, connection,
/// query, or writing the file. Nothing is written when the read fails.
pub async fn export_table(
    settings: &Settings,
    table_name: &str,
    output_dir: &Path,
) -> CliResult<ExportReport> {
    mysql::validate_table_name(table_name)?;

    let table = table_name.to_string();
    let data = mysql::with_connection(settings, move |conn| {
        async move { reader::read_table_rows(conn, &table).await }.boxed()
    })
    .await?;

    let document = ExportDocument {
        table_name: table_name.to_string(),
        data,
    };

    let path = export_path(output_dir, table_name);
    utils::write_json_pretty(&path, &document)?;

    tracing::info!(
        "Exported {} rows from '{}' to {}",
        document.data.len(),
        table_name,
        path.display()
    );

    Ok(ExportReport {
        path,
        rows: document.data.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn export_path_uses_table_name() {
        assert_eq!(
            export_path(Path::new("./bkp"), "users"),
            PathBuf::from("./bkp/users.json")
        );
    }

    #[tokio::test]
    async fn invalid_table_name_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        // Unroutable settings: reaching the connector would fail differently
        let settings = Settings {
            host: "invalid.invalid".into(),
            user: "root".into(),
            password: String::new(),
            database: "db".into(),
            port: None,
        };

        let result = export_table(&settings, "../escape", dir.path()).await;

        assert!(matches!(result, Err(CliError::InvalidTableName(_))));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
