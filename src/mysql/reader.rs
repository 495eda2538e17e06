// ABOUTME: Full-table reads from MySQL
// ABOUTME: Validates the table name and returns rows as ordered records

use crate::document::Record;
use crate::error::{CliError, CliResult};
use crate::mysql::{converter, quote_identifier, validate_table_name};
use mysql_async::{prelude::*, Conn, Row};

/// Read all rows from a table in the connection's default database.
///
/// Uses the binary protocol so dates, times and numbers arrive typed. For
/// large tables this holds every row in memory.
///
/// # Errors
///
/// - [`CliError::InvalidTableName`] if the name fails validation
/// - [`CliError::Query`] if the statement fails (missing table, no database selected)
///
/// # Examples
///
/// ```no_run
/// # use mysql_json_cli::mysql::reader::read_table_rows;
/// # async fn example(conn: &mut mysql_async::Conn) -> mysql_json_cli::error::CliResult<()> {
/// let rows = read_table_rows(conn, "users").await?;
/// println!("Read {} rows", rows.len());
/// # Ok(())
/// # }
/// ```
pub async fn read_table_rows(conn: &mut Conn, table_name: &str) -> CliResult<Vec<Record>> {
    validate_table_name(table_name)?;

    tracing::info!("Reading all rows from table '{}'", table_name);

    let query = format!("SELECT * FROM {}", quote_identifier(table_name));

    let rows: Vec<Row> = conn
        .exec(query.as_str(), ())
        .await
        .map_err(|e| CliError::query(format!("reading table '{}'", table_name), e))?;

    tracing::info!("Read {} rows from table '{}'", rows.len(), table_name);

    Ok(rows.into_iter().map(converter::row_to_record).collect())
}
