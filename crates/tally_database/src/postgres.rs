//! PostgreSQL counter store.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Text;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tally_core::DailyTally;
use tally_error::{DatabaseError, DatabaseErrorKind};
use tally_interface::CounterStore;
use tracing::{debug, info, instrument};

use crate::schema::counts;
use crate::{QueryReport, is_row_query};

/// Schema migrations bundled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = counts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct CountRow {
    date: NaiveDate,
    count: i32,
}

#[derive(Debug, QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Text)]
    row: String,
}

/// Counter store backed by a PostgreSQL `counts` table.
///
/// Every query runs on Tokio's blocking pool with a pooled connection.
#[derive(Debug, Clone)]
pub struct PgCounterStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PgCounterStore {
    /// Open a connection pool to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the pool cannot open its first connection.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tally_database::PgCounterStore;
    ///
    /// let store = PgCounterStore::connect("postgres://localhost/tally", 4)
    ///     .expect("Failed to connect");
    /// ```
    pub fn connect(database_url: &str, pool_size: u32) -> Result<Self, DatabaseError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder().max_size(pool_size).build(manager)?;
        info!(pool_size, "Connected to counter database");
        Ok(Self { pool })
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns error if a migration fails.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let applied = self
            .blocking(|conn| {
                conn.run_pending_migrations(MIGRATIONS)
                    .map(|versions| versions.len())
                    .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))
            })
            .await?;
        info!(applied, "Counter schema up to date");
        Ok(())
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, DatabaseError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            work(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Join(e.to_string())))?
    }
}

fn query_rows(conn: &mut PgConnection, statement: &str) -> Result<QueryReport, DatabaseError> {
    let wrapped = format!(
        "SELECT row_to_json(t)::text AS row FROM ({}) AS t",
        statement.trim().trim_end_matches(';')
    );
    let rows: Vec<JsonRow> = diesel::sql_query(wrapped).load(conn)?;

    let rows = rows
        .iter()
        .map(|r| {
            serde_json::from_str::<serde_json::Value>(&r.row)
                .map(|value| QueryReport::json_row(&value))
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(QueryReport::rows(rows))
}

#[async_trait]
impl CounterStore for PgCounterStore {
    #[instrument(skip(self))]
    async fn record(&self, tally: DailyTally) -> Result<(), DatabaseError> {
        self.blocking(move |conn| {
            diesel::insert_into(counts::table)
                .values(&CountRow {
                    date: tally.date,
                    count: tally.count,
                })
                .on_conflict(counts::date)
                .do_update()
                .set(counts::count.eq(tally.count))
                .execute(conn)?;
            Ok(())
        })
        .await?;
        debug!("Recorded daily count");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, date: NaiveDate) -> Result<Option<DailyTally>, DatabaseError> {
        self.blocking(move |conn| {
            let row = counts::table
                .find(date)
                .select(CountRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(|r| DailyTally::new(r.date, r.count)))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn execute(&self, statement: &str) -> Result<String, DatabaseError> {
        let statement = statement.to_string();
        let report = self
            .blocking(move |conn| {
                if is_row_query(&statement) {
                    query_rows(conn, &statement)
                } else {
                    let affected = diesel::sql_query(statement.as_str()).execute(conn)?;
                    Ok(QueryReport::affected(affected))
                }
            })
            .await?;
        Ok(report.to_string())
    }
}
