// ABOUTME: Imports an ExportDocument file into a MySQL table
// ABOUTME: Derives the column list from the first record and inserts rows one at a time

use crate::config::Settings;
use crate::document::{ExportDocument, Record};
use crate::error::{CliError, CliResult};
use crate::mysql::{self, converter, quote_identifier};
use futures::FutureExt;
use indicatif::{ProgressBar, ProgressStyle};
use mysql_async::{prelude::*, Conn, Params, Value};
use std::path::Path;

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub table_name: String,
    pub rows: usize,
}

/// Parameterized insert derived from the first record of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    pub table_name: String,
    pub columns: Vec<String>,
    pub sql: String,
}

impl InsertPlan {
    /// Build `INSERT INTO <table> (<columns>) VALUES (?, ...)` from `first`'s
    /// keys, in that record's key order.
    ///
    /// The table name must pass [`mysql::validate_table_name`]. Column names
    /// are backtick-quoted so any key from the file stays a single identifier.
    pub fn from_first_record(table_name: &str, first: &Record) -> CliResult<Self> {
        mysql::validate_table_name(table_name)?;

        if first.is_empty() {
            return Err(CliError::InvalidFormat(
                "record 1 has no columns".to_string(),
            ));
        }

        let columns: Vec<String> = first.columns().map(str::to_string).collect();
        let column_list = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(table_name),
            column_list,
            placeholders
        );

        Ok(Self {
            table_name: table_name.to_string(),
            columns,
            sql,
        })
    }

    /// Bind parameters for `record`, looked up in plan column order.
    ///
    /// `position` is the 1-based record index used in error messages. A record
    /// missing one of the plan's columns, or carrying one the plan lacks, is
    /// rejected.
    pub fn params_for(&self, record: &Record, position: usize) -> CliResult<Vec<Value>> {
        let mut params = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let cell = record.get(column).ok_or_else(|| {
                CliError::InvalidFormat(format!(
                    "record {} is missing column '{}'",
                    position, column
                ))
            })?;
            params.push(converter::cell_to_value(cell));
        }

        if let Some(extra) = record
            .columns()
            .find(|name| !self.columns.iter().any(|c| c == name))
        {
            return Err(CliError::InvalidFormat(format!(
                "record {} has unexpected column '{}'",
                position, extra
            )));
        }

        Ok(params)
    }
}

/// Insert `records` one statement at a time over `conn`.
///
/// There is no surrounding transaction: rows inserted before a failure stay
/// committed and the remaining rows are skipped.
pub async fn insert_records(
    conn: &mut Conn,
    plan: &InsertPlan,
    records: &[Record],
) -> CliResult<usize> {
    let statement = conn
        .prep(plan.sql.as_str())
        .await
        .map_err(|e| CliError::query(format!("preparing insert into '{}'", plan.table_name), e))?;

    let progress = ProgressBar::new(records.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} rows") {
        progress.set_style(style);
    }

    let mut inserted = 0;
    for (idx, record) in records.iter().enumerate() {
        let position = idx + 1;
        let params = match plan.params_for(record, position) {
            Ok(params) => params,
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        };

        if let Err(e) = conn.exec_drop(&statement, Params::Positional(params)).await {
            progress.abandon();
            tracing::warn!(
                "Insert into '{}' stopped at record {} after {} rows",
                plan.table_name,
                position,
                inserted
            );
            return Err(CliError::query(
                format!("inserting record {} into '{}'", position, plan.table_name),
                e,
            ));
        }

        inserted += 1;
        progress.inc(1);
    }

    progress.finish_and_clear();

    Ok(inserted)
}

/// Import the document at `file_path` into `table_name`.
///
/// The file is read and validated before any connection is opened, so an
/// invalid file leaves the table untouched. The document's own `tableName`
/// is informational only; rows go to `table_name`.
///
/// # Errors
///
/// - [`CliError::InvalidTableName`] for a rejected target table name
/// - [`CliError::Filesystem`] if the file cannot be read
/// - [`CliError::InvalidFormat`] if `data` is absent, not an array, empty,
///   or a record does not match the first record's columns
/// - [`CliError::Connection`] / [`CliError::Query`] from the database
pub async fn import_table(
    settings: &Settings,
    file_path: &Path,
    table_name: &str,
) -> CliResult<ImportReport> {
    mysql::validate_table_name(table_name)?;

    let document = ExportDocument::read(file_path)?;

    if !document.table_name.is_empty() && document.table_name != table_name {
        tracing::info!(
            "File {} was exported from '{}'; importing into '{}'",
            file_path.display(),
            document.table_name,
            table_name
        );
    }

    let plan = InsertPlan::from_first_record(table_name, &document.data[0])?;

    tracing::info!(
        "Importing {} records from {} into '{}'",
        document.data.len(),
        file_path.display(),
        table_name
    );

    let records = document.data;
    let rows = mysql::with_connection(settings, move |conn| {
        async move { insert_records(conn, &plan, &records).await }.boxed()
    })
    .await?;

    tracing::info!("Imported {} rows into '{}'", rows, table_name);

    Ok(ImportReport {
        table_name: table_name.to_string(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CellValue;

    fn record(fields: &[(&str, CellValue)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn unreachable_settings() -> Settings {
        Settings {
            host: "invalid.invalid".into(),
            user: "root".into(),
            password: String::new(),
            database: "db".into(),
            port: None,
        }
    }

    #[test]
    fn insert_uses_first_record_key_order() {
        let first = record(&[
            ("name", CellValue::Text("Alice".into())),
            ("id", CellValue::Int(1)),
        ]);
        let plan = InsertPlan::from_first_record("users", &first).unwrap();
        assert_eq!(plan.columns, ["name", "id"]);
        assert_eq!(
            plan.sql,
            "INSERT INTO `users` (`name`, `id`) VALUES (?, ?)"
        );
    }

    #[test]
    fn column_names_are_quoted() {
        let first = record(&[("a`) VALUES (1); --", CellValue::Null)]);
        let plan = InsertPlan::from_first_record("t", &first).unwrap();
        assert_eq!(plan.sql, "INSERT INTO `t` (`a``) VALUES (1); --`) VALUES (?)");
    }

    #[test]
    fn table_name_is_validated() {
        let first = record(&[("id", CellValue::Int(1))]);
        let result = InsertPlan::from_first_record("users; DROP TABLE x", &first);
        assert!(matches!(result, Err(CliError::InvalidTableName(_))));
    }

    #[test]
    fn empty_first_record_is_rejected() {
        let result = InsertPlan::from_first_record("users", &Record::new());
        assert!(matches!(result, Err(CliError::InvalidFormat(_))));
    }

    #[test]
    fn params_follow_plan_order_not_record_order() {
        let first = record(&[("id", CellValue::Int(1)), ("name", CellValue::Null)]);
        let plan = InsertPlan::from_first_record("users", &first).unwrap();

        let reordered = record(&[
            ("name", CellValue::Text("Bob".into())),
            ("id", CellValue::Int(2)),
        ]);
        let params = plan.params_for(&reordered, 2).unwrap();
        assert_eq!(params, vec![Value::Int(2), Value::Bytes(b"Bob".to_vec())]);
    }

    #[test]
    fn missing_column_fails_with_record_position() {
        let first = record(&[("id", CellValue::Int(1)), ("name", CellValue::Null)]);
        let plan = InsertPlan::from_first_record("users", &first).unwrap();

        let err = plan
            .params_for(&record(&[("id", CellValue::Int(2))]), 2)
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidFormat(_)));
        assert!(err.to_string().contains("record 2"));
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn extra_column_fails() {
        let first = record(&[("id", CellValue::Int(1))]);
        let plan = InsertPlan::from_first_record("users", &first).unwrap();

        let err = plan
            .params_for(
                &record(&[("id", CellValue::Int(2)), ("age", CellValue::Int(3))]),
                3,
            )
            .unwrap_err();
        assert!(err.to_string().contains("unexpected column 'age'"));
    }

    #[tokio::test]
    async fn empty_data_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"tableName": "users", "data": []}"#).unwrap();

        let result = import_table(&unreachable_settings(), &path, "users").await;

        assert!(matches!(result, Err(CliError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn absent_data_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"tableName": "users"}"#).unwrap();

        let result = import_table(&unreachable_settings(), &path, "users").await;

        assert!(matches!(result, Err(CliError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn missing_file_is_a_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_table(
            &unreachable_settings(),
            &dir.path().join("nope.json"),
            "users",
        )
        .await;
        assert!(matches!(result, Err(CliError::Filesystem { .. })));
    }
}
