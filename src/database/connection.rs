use futures::stream::BoxStream;
use futures::TryStreamExt;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Connection, Executor, PgConnection, Row, SqliteConnection, Statement};

use super::values::{render_pg_value, render_sqlite_value};
use crate::constants::stages;
use crate::error::JobError;
use crate::logging::log_job_operation;

/// Receives a result set one row at a time
pub trait RowSink {
    fn header(&mut self, columns: &[String]) -> Result<(), JobError>;

    fn row(&mut self, values: Vec<String>) -> Result<(), JobError>;
}

/// Native driver behind a [`ReportConnection`], chosen from the URL scheme
enum Backend {
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

/// A single job's own database connection.
///
/// Connections are never shared between jobs. Call [`ReportConnection::close`]
/// when done; a connection dropped on an error or panic path is torn down by
/// the driver.
pub struct ReportConnection {
    backend: Backend,
    job_id: String,
}

impl ReportConnection {
    /// Open a connection for `job_id` using a driver URL
    /// (`postgres://...`, `postgresql://...`, `sqlite:...`)
    pub async fn open(database_url: &str, job_id: &str) -> Result<Self, JobError> {
        log_job_operation(
            stages::DB_CONNECT,
            job_id,
            "connecting",
            Some("Opening DB connection"),
        );

        let backend = if database_url.starts_with("postgres://")
            || database_url.starts_with("postgresql://")
        {
            Backend::Postgres(PgConnection::connect(database_url).await?)
        } else if database_url.starts_with("sqlite:") {
            Backend::Sqlite(SqliteConnection::connect(database_url).await?)
        } else {
            let scheme = database_url.split(':').next().unwrap_or_default();
            return Err(JobError::Database(format!(
                "unsupported database URL scheme '{scheme}'"
            )));
        };

        Ok(Self {
            backend,
            job_id: job_id.to_string(),
        })
    }

    /// Run one query and stream every row into `sink`. Returns the row count.
    pub async fn export_query<S: RowSink>(&mut self, sql: &str, sink: &mut S) -> Result<u64, JobError> {
        let sql = normalize_sql(sql);

        let row_count = match &mut self.backend {
            Backend::Postgres(conn) => {
                let statement = (&mut *conn).prepare(sql).await?;
                sink.header(&column_names(statement.columns()))?;
                drain(statement.query().fetch(&mut *conn), sink, render_pg_row).await?
            }
            Backend::Sqlite(conn) => {
                let statement = (&mut *conn).prepare(sql).await?;
                sink.header(&column_names(statement.columns()))?;
                drain(statement.query().fetch(&mut *conn), sink, render_sqlite_row).await?
            }
        };

        log_job_operation(
            stages::DB_EXEC,
            &self.job_id,
            "executed",
            Some(&format!("Executed SQL | Rows={row_count}")),
        );
        Ok(row_count)
    }

    /// Release the connection; close errors are only logged
    pub async fn close(self) {
        let job_id = self.job_id;
        let closed = match self.backend {
            Backend::Postgres(conn) => conn.close().await,
            Backend::Sqlite(conn) => conn.close().await,
        };
        if let Err(e) = closed {
            tracing::warn!(job = %job_id, error = %e, "Error while closing DB connection");
        }
        log_job_operation(stages::DB_CLOSE, &job_id, "closed", Some("Connection closed."));
    }
}

fn column_names<C: Column>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

async fn drain<R, S: RowSink>(
    mut rows: BoxStream<'_, Result<R, sqlx::Error>>,
    sink: &mut S,
    render: fn(&R) -> Result<Vec<String>, JobError>,
) -> Result<u64, JobError> {
    let mut row_count: u64 = 0;
    while let Some(row) = rows.try_next().await? {
        sink.row(render(&row)?)?;
        row_count += 1;
    }
    Ok(row_count)
}

fn render_pg_row(row: &PgRow) -> Result<Vec<String>, JobError> {
    (0..row.len())
        .map(|idx| render_pg_value(row, idx).map_err(JobError::from))
        .collect()
}

fn render_sqlite_row(row: &SqliteRow) -> Result<Vec<String>, JobError> {
    (0..row.len())
        .map(|idx| render_sqlite_value(row, idx).map_err(JobError::from))
        .collect()
}

/// Trim whitespace and trailing statement terminators
fn normalize_sql(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CollectingSink {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    }

    impl RowSink for CollectingSink {
        fn header(&mut self, columns: &[String]) -> Result<(), JobError> {
            self.header = columns.to_vec();
            Ok(())
        }

        fn row(&mut self, values: Vec<String>) -> Result<(), JobError> {
            self.rows.push(values);
            Ok(())
        }
    }

    #[test]
    fn normalize_strips_terminators() {
        assert_eq!(normalize_sql("  SELECT 1;\n"), "SELECT 1");
        assert_eq!(normalize_sql("SELECT 1 ;;"), "SELECT 1");
    }

    #[tokio::test]
    async fn exports_rows_in_order() {
        let mut conn = ReportConnection::open("sqlite::memory:", "test").await.unwrap();
        let mut sink = CollectingSink::default();

        let count = conn
            .export_query(
                "SELECT 1 AS id, 'alpha' AS name UNION ALL SELECT 2, 'beta';",
                &mut sink,
            )
            .await
            .unwrap();
        conn.close().await;

        assert_eq!(count, 2);
        assert_eq!(sink.header, ["id", "name"]);
        assert_eq!(sink.rows, vec![vec!["1", "alpha"], vec!["2", "beta"]]);
    }

    #[tokio::test]
    async fn sql_errors_carry_native_text() {
        let mut conn = ReportConnection::open("sqlite::memory:", "test").await.unwrap();
        let mut sink = CollectingSink::default();

        let err = conn
            .export_query("SELECT * FROM missing_table", &mut sink)
            .await
            .unwrap_err();
        conn.close().await;

        assert!(matches!(err, JobError::Database(ref msg) if msg.contains("missing_table")));
    }

    #[tokio::test]
    async fn unknown_scheme_is_rejected() {
        let result = ReportConnection::open("nosuchdriver://nowhere", "test").await;
        assert!(matches!(result, Err(JobError::Database(ref msg)) if msg.contains("nosuchdriver")));
    }

    #[tokio::test]
    async fn empty_result_still_has_header() {
        let mut conn = ReportConnection::open("sqlite::memory:", "test").await.unwrap();
        let mut sink = CollectingSink::default();

        let count = conn
            .export_query("SELECT 1 AS id, 'x' AS name WHERE 1 = 0", &mut sink)
            .await
            .unwrap();
        conn.close().await;

        assert_eq!(count, 0);
        assert_eq!(sink.header, ["id", "name"]);
        assert!(sink.rows.is_empty());
    }

    #[tokio::test]
    async fn exports_postgres_numeric_and_date_columns() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            println!("DATABASE_URL not set - skipping PostgreSQL export test");
            return;
        };
        let mut conn = ReportConnection::open(&url, "test").await.unwrap();
        let mut sink = CollectingSink::default();

        let count = conn
            .export_query(
                "SELECT 'north'::text AS region, 12.50::numeric AS total, DATE '2026-10-16' AS day",
                &mut sink,
            )
            .await
            .unwrap();
        conn.close().await;

        assert_eq!(count, 1);
        assert_eq!(sink.header, ["region", "total", "day"]);
        assert_eq!(sink.rows, vec![vec!["north", "12.50", "2026-10-16"]]);
    }
}
