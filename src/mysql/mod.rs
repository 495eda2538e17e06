// ABOUTME: MySQL connection handling and identifier safety
// ABOUTME: Opens one short-lived connection per operation and always closes it

pub mod converter;
pub mod reader;

use crate::config::Settings;
use crate::error::{CliError, CliResult};
use futures::future::BoxFuture;
use mysql_async::{Conn, Opts, OptsBuilder};

/// MySQL's identifier length limit.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Validate a table name before it is spliced into SQL or a file name.
///
/// Table names must contain only ASCII letters, digits and underscores and be
/// at most 64 characters long. This rejects both SQL injection attempts and
/// path traversal through `<output_dir>/<table>.json`.
///
/// # Examples
///
/// ```
/// # use mysql_json_cli::mysql::validate_table_name;
/// assert!(validate_table_name("users").is_ok());
/// assert!(validate_table_name("order_items_2024").is_ok());
/// assert!(validate_table_name("users`; DROP TABLE users; --").is_err());
/// assert!(validate_table_name("../etc/passwd").is_err());
/// ```
pub fn validate_table_name(table_name: &str) -> CliResult<()> {
    let valid = !table_name.is_empty()
        && table_name.len() <= MAX_IDENTIFIER_LEN
        && table_name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');

    if !valid {
        return Err(CliError::InvalidTableName(table_name.to_string()));
    }

    Ok(())
}

/// Quote an identifier with backticks, doubling any embedded backtick.
///
/// ```
/// # use mysql_json_cli::mysql::quote_identifier;
/// assert_eq!(quote_identifier("users"), "`users`");
/// assert_eq!(quote_identifier("we`ird"), "`we``ird`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Build driver options from the saved settings.
///
/// An empty database name connects without selecting a default schema.
pub fn connection_opts(settings: &Settings) -> Opts {
    let database = (!settings.database.is_empty()).then(|| settings.database.clone());

    OptsBuilder::default()
        .ip_or_hostname(settings.host.clone())
        .tcp_port(settings.port())
        .user(Some(settings.user.clone()))
        .pass(Some(settings.password.clone()))
        .db_name(database)
        .into()
}

/// Open a connection using the saved settings.
pub async fn connect(settings: &Settings) -> CliResult<Conn> {
    tracing::debug!(
        "Connecting to MySQL at {}:{} as '{}'",
        settings.host,
        settings.port(),
        settings.user
    );

    let conn = Conn::new(connection_opts(settings))
        .await
        .map_err(CliError::Connection)?;

    tracing::debug!("Connected to MySQL");

    Ok(conn)
}

/// Run `operation` against a fresh connection, then close it.
///
/// The connection is closed whether or not the operation succeeds. An
/// operation error takes precedence over a close error; a close error after a
/// successful operation is reported as [`CliError::Connection`]. Errors are
/// returned to the caller, never logged here.
///
/// The future returned by `operation` borrows only the connection, so it
/// must own whatever else it needs.
///
/// # Examples
///
/// ```no_run
/// # use futures::FutureExt;
/// # use mysql_json_cli::{config::Settings, mysql::{with_connection, reader::read_table_rows}};
/// # async fn example(settings: &Settings) -> mysql_json_cli::error::CliResult<()> {
/// let table = "users".to_string();
/// let rows = with_connection(settings, move |conn| {
///     async move { read_table_rows(conn, &table).await }.boxed()
/// })
/// .await?;
/// println!("{} rows", rows.len());
/// # Ok(())
/// # }
/// ```
pub async fn with_connection<T, F>(settings: &Settings, operation: F) -> CliResult<T>
where
    F: for<'c> FnOnce(&'c mut Conn) -> BoxFuture<'c, CliResult<T>>,
{
    let mut conn = connect(settings).await?;

    let result = operation(&mut conn).await;
    let closed = conn.disconnect().await;

    tracing::debug!("Closed MySQL connection");

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(CliError::Connection(e)),
        (Err(e), _) => Err(e),
    }
}
