use crate::database::error::DatabaseError;
use crate::database::error::DatabaseError::ConnectionFailed;
use crate::database::migrations::run_migrations;
use crate::notification::sweep::{MemberRecord, MemberStore};
use crate::tools::log_message_and_return;
use diesel::SqliteConnection;
use diesel::r2d2::ConnectionManager;
use r2d2::Pool;
use std::time::Duration;

pub(crate) mod dao;
pub(crate) mod error;
mod migrations;
pub(crate) mod model;
mod schema;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Open the member database and make sure its schema is up-to-date.
pub fn init_db(database_url: &str) -> Result<DbPool, DatabaseError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(2)
        .connection_timeout(CONNECTION_TIMEOUT)
        .build(manager)
        .map_err(log_message_and_return(
            "Can't open the member database.",
            ConnectionFailed,
        ))?;

    let mut connection = pool.get().map_err(log_message_and_return(
        "Can't get a connection to the member database.",
        ConnectionFailed,
    ))?;
    run_migrations(&mut *connection)?;

    Ok(pool)
}

/// Member store backed by the SQLite database.
/// Diesel being synchronous, queries are run on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteMemberStore {
    pool: DbPool,
}

impl SqliteMemberStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl MemberStore for SqliteMemberStore {
    async fn fetch_members(&self) -> Result<Vec<MemberRecord>, DatabaseError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(log_message_and_return(
                "Can't get a connection to the member database.",
                ConnectionFailed,
            ))?;
            dao::member::retrieve_members(&mut connection)
        })
        .await
        .map_err(|e| DatabaseError::UnderlyingDatabase(e.to_string()))?
    }
}
