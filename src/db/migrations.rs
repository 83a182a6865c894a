use sqlx::MySqlConnection;
use tracing::info;

/// Ensure the `jobs` table and its indexes exist
///
/// The DDL is embedded from the migrations directory at compile time and
/// uses `CREATE TABLE IF NOT EXISTS`, so a table created by an earlier tool
/// is adopted rather than rejected. Safe to run on every load.
pub async fn run_migrations(conn: &mut MySqlConnection) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Ensuring jobs table schema...");

    sqlx::migrate!("./migrations").run(conn).await?;

    info!("Jobs table schema is up to date");
    Ok(())
}
