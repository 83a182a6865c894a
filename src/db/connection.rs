use sqlx::mysql::MySqlConnectOptions;
use sqlx::{ConnectOptions, MySqlConnection};
use tracing::{debug, info};

use crate::config::DatabaseConfig;

/// Connection options for the server, without selecting a schema
fn server_options(db: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&db.host)
        .port(db.port)
        .username(&db.user)
        .password(&db.password)
        .charset("utf8mb4")
}

/// Open the single connection used for a load
///
/// The connection is owned exclusively by the caller for the whole run; there
/// is no pool and no second writer.
pub async fn get_connection(db: &DatabaseConfig) -> Result<MySqlConnection, sqlx::Error> {
    debug!("Connecting to MySQL at {}:{}/{}", db.host, db.port, db.database);
    let conn = server_options(db).database(&db.database).connect().await?;
    info!("MySQL connection established ({}:{}/{})", db.host, db.port, db.database);
    Ok(conn)
}

/// Create the schema if it does not exist yet
pub async fn create_database_if_not_exists(db: &DatabaseConfig) -> Result<(), sqlx::Error> {
    let mut conn = server_options(db).connect().await?;

    // Schema name is restricted to identifier characters by config validation
    let statement = format!(
        "CREATE DATABASE IF NOT EXISTS `{}` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci",
        db.database
    );
    sqlx::raw_sql(&statement).execute(&mut conn).await?;
    info!("Database '{}' created or already exists", db.database);

    sqlx::Connection::close(conn).await
}

/// Drop ONLY_FULL_GROUP_BY from a comma-separated sql_mode value
pub fn without_only_full_group_by(mode: &str) -> String {
    mode.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case("ONLY_FULL_GROUP_BY"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Relax the session sql_mode so the grouped reporting views can be created
///
/// Returns the mode now in effect.
pub async fn relax_sql_mode(conn: &mut MySqlConnection) -> Result<String, sqlx::Error> {
    let current: String = sqlx::query_scalar("SELECT CAST(@@SESSION.sql_mode AS CHAR)")
        .fetch_one(&mut *conn)
        .await?;
    debug!("Current SQL mode: {}", current);

    // Mode names are server-provided keywords, safe to inline
    let relaxed = without_only_full_group_by(&current);
    sqlx::raw_sql(&format!("SET SESSION sql_mode = '{}'", relaxed))
        .execute(&mut *conn)
        .await?;

    let updated: String = sqlx::query_scalar("SELECT CAST(@@SESSION.sql_mode AS CHAR)")
        .fetch_one(&mut *conn)
        .await?;
    info!("Updated SQL mode: {}", updated);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_full_group_by_is_removed_wherever_it_appears() {
        assert_eq!(
            without_only_full_group_by("ONLY_FULL_GROUP_BY,STRICT_TRANS_TABLES,NO_ZERO_DATE"),
            "STRICT_TRANS_TABLES,NO_ZERO_DATE"
        );
        assert_eq!(
            without_only_full_group_by("STRICT_TRANS_TABLES,ONLY_FULL_GROUP_BY"),
            "STRICT_TRANS_TABLES"
        );
        assert_eq!(without_only_full_group_by("ONLY_FULL_GROUP_BY"), "");
        assert_eq!(without_only_full_group_by(""), "");
    }
}
