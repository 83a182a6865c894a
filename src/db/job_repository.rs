use sqlx::MySqlConnection;
use tracing::debug;

use crate::db::models::NewJobRow;

const INSERT_COLUMNS: &str = "title, company, location, salary_avg, salary_min, salary_max, \
     is_remote, seniority, category, skills, post_date, scraped_date";

/// Build a multi-row INSERT with one placeholder group per row
fn bulk_insert_sql(rows: usize) -> String {
    let group = "(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
    let mut query = format!("INSERT INTO jobs ({}) VALUES ", INSERT_COLUMNS);
    for i in 0..rows {
        if i > 0 {
            query.push_str(", ");
        }
        query.push_str(group);
    }
    query
}

/// Repository for `jobs` table operations
///
/// Every function takes a plain connection so callers decide the transaction
/// boundary: pass `&mut *tx` to run inside one.
pub struct JobRepository;

impl JobRepository {
    /// Number of rows currently stored
    pub async fn count(conn: &mut MySqlConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(conn)
            .await
    }

    /// Remove every row; returns the number deleted
    pub async fn delete_all(conn: &mut MySqlConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM jobs").execute(conn).await?;
        debug!("Deleted {} rows from jobs", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Insert all rows with a single statement; returns the number inserted
    pub async fn bulk_create(
        conn: &mut MySqlConnection,
        rows: &[NewJobRow],
    ) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            debug!("Bulk create called with empty row list");
            return Ok(0);
        }

        let sql = bulk_insert_sql(rows.len());
        let mut query = sqlx::query(&sql);
        for row in rows {
            query = query
                .bind(&row.title)
                .bind(&row.company)
                .bind(&row.location)
                .bind(row.salary_avg)
                .bind(row.salary_min)
                .bind(row.salary_max)
                .bind(row.is_remote)
                .bind(&row.seniority)
                .bind(&row.category)
                .bind(&row.skills)
                .bind(row.post_date)
                .bind(row.scraped_date);
        }

        let result = query.execute(conn).await?;
        debug!("Bulk insert completed: {} rows inserted", result.rows_affected());
        Ok(result.rows_affected())
    }
}
