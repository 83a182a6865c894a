//! Reporting views consumed by the BI dashboard.
//!
//! The SQL below is a compatibility contract with the dashboard: column names,
//! bucket edges, ordering and HAVING thresholds must not change.

use sqlx::MySqlConnection;
use tracing::{error, info, warn};

use crate::db::models::{SalaryRangeSample, Verification, ViewOutcome, ViewRowCount, ViewStatus};

/// A named view definition
#[derive(Debug, Clone, Copy)]
pub struct ReportView {
    pub name: &'static str,
    pub label: &'static str,
    pub sql: &'static str,
}

/// Dropped before recreation; includes two retired view names
pub const DROP_VIEWS_SQL: &str = r#"
DROP VIEW IF EXISTS
    view_job_summary,
    view_company_analysis,
    view_seniority_analysis,
    view_category_analysis,
    view_location_analysis,
    view_skills_analysis,
    view_remote_analysis,
    view_salary_ranges,
    view_seniority_salary_detail,
    view_company_benchmark,
    view_simple_summary,
    view_companies,
    view_seniority
"#;

/// Views row-counted during verification
pub static KEY_VIEWS: [(&str, &str); 4] = [
    ("view_job_summary", "Job Summary"),
    ("view_salary_ranges", "Salary Ranges"),
    ("view_company_analysis", "Company Analysis"),
    ("view_seniority_analysis", "Seniority Analysis"),
];

const VIEW_JOB_SUMMARY: &str = r#"
CREATE OR REPLACE VIEW view_job_summary AS
SELECT
    COUNT(*) as total_jobs,
    COUNT(DISTINCT company) as unique_companies,
    ROUND(AVG(salary_avg), 2) as average_salary,
    SUM(is_remote) as remote_jobs,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage,
    ROUND(MIN(salary_avg), 2) as min_salary,
    ROUND(MAX(salary_avg), 2) as max_salary,
    ROUND(AVG(salary_max - salary_min), 2) as avg_salary_range
FROM jobs
WHERE salary_avg IS NOT NULL
"#;

const VIEW_COMPANY_ANALYSIS: &str = r#"
CREATE OR REPLACE VIEW view_company_analysis AS
SELECT
    company,
    COUNT(*) as job_count,
    ROUND(AVG(salary_avg), 2) as avg_salary,
    ROUND(MIN(salary_avg), 2) as min_salary,
    ROUND(MAX(salary_avg), 2) as max_salary,
    SUM(is_remote) as remote_count,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage
FROM jobs
WHERE company IS NOT NULL AND TRIM(company) != ''
GROUP BY company
HAVING COUNT(*) >= 2
ORDER BY avg_salary DESC
"#;

const VIEW_SENIORITY_ANALYSIS: &str = r#"
CREATE OR REPLACE VIEW view_seniority_analysis AS
SELECT
    COALESCE(seniority, 'Not Specified') as seniority,
    COUNT(*) as job_count,
    ROUND(AVG(salary_avg), 2) as avg_salary,
    ROUND(STDDEV(salary_avg), 2) as salary_std_dev,
    ROUND(MIN(salary_avg), 2) as min_salary,
    ROUND(MAX(salary_avg), 2) as max_salary,
    SUM(is_remote) as remote_count,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage
FROM jobs
WHERE salary_avg IS NOT NULL
GROUP BY COALESCE(seniority, 'Not Specified')
ORDER BY
    CASE COALESCE(seniority, 'Not Specified')
        WHEN 'Junior' THEN 1
        WHEN 'Mid-level' THEN 2
        WHEN 'Senior' THEN 3
        WHEN 'Manager' THEN 4
        WHEN 'Director' THEN 5
        WHEN 'Executive' THEN 6
        ELSE 7
    END
"#;

const VIEW_CATEGORY_ANALYSIS: &str = r#"
CREATE OR REPLACE VIEW view_category_analysis AS
SELECT
    COALESCE(category, 'Not Specified') as category,
    COUNT(*) as job_count,
    ROUND(AVG(salary_avg), 2) as avg_salary,
    SUM(is_remote) as remote_count,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage
FROM jobs
WHERE salary_avg IS NOT NULL
GROUP BY COALESCE(category, 'Not Specified')
ORDER BY job_count DESC
"#;

const VIEW_LOCATION_ANALYSIS: &str = r#"
CREATE OR REPLACE VIEW view_location_analysis AS
SELECT
    COALESCE(location, 'Not Specified') as location,
    COUNT(*) as job_count,
    ROUND(AVG(salary_avg), 2) as avg_salary,
    SUM(is_remote) as remote_count,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage,
    GROUP_CONCAT(DISTINCT company ORDER BY company SEPARATOR ', ') as companies
FROM jobs
WHERE location IS NOT NULL AND TRIM(location) != '' AND salary_avg IS NOT NULL
GROUP BY COALESCE(location, 'Not Specified')
HAVING COUNT(*) >= 3
ORDER BY job_count DESC
"#;

const VIEW_SKILLS_ANALYSIS: &str = r#"
CREATE OR REPLACE VIEW view_skills_analysis AS
SELECT
    skill,
    COUNT(*) as demand_count,
    ROUND(AVG(salary_avg), 2) as avg_salary,
    COUNT(DISTINCT company) as company_count
FROM (
    SELECT
        TRIM(SUBSTRING_INDEX(SUBSTRING_INDEX(skills, ',', numbers.n), ',', -1)) as skill,
        salary_avg,
        company
    FROM jobs
    JOIN (
        SELECT 1 n UNION SELECT 2 UNION SELECT 3 UNION SELECT 4 UNION SELECT 5
        UNION SELECT 6 UNION SELECT 7 UNION SELECT 8 UNION SELECT 9 UNION SELECT 10
    ) numbers
    ON CHAR_LENGTH(skills) - CHAR_LENGTH(REPLACE(skills, ',', '')) >= numbers.n - 1
    WHERE skills IS NOT NULL AND TRIM(skills) != '' AND salary_avg IS NOT NULL
) skill_table
WHERE skill != ''
GROUP BY skill
HAVING COUNT(*) >= 2
ORDER BY demand_count DESC, avg_salary DESC
"#;

const VIEW_REMOTE_ANALYSIS: &str = r#"
CREATE OR REPLACE VIEW view_remote_analysis AS
SELECT
    CASE
        WHEN is_remote = 1 THEN 'Remote'
        ELSE 'On-site'
    END as work_type,
    COUNT(*) as job_count,
    ROUND(AVG(salary_avg), 2) as avg_salary,
    ROUND(MIN(salary_avg), 2) as min_salary,
    ROUND(MAX(salary_avg), 2) as max_salary,
    ROUND(AVG(salary_max - salary_min), 2) as avg_salary_range
FROM jobs
WHERE salary_avg IS NOT NULL
GROUP BY is_remote
ORDER BY avg_salary DESC
"#;

const VIEW_SALARY_RANGES: &str = r#"
CREATE OR REPLACE VIEW view_salary_ranges AS
SELECT
    salary_range,
    COUNT(*) as job_count,
    ROUND(AVG(salary_avg), 2) as avg_in_range,
    SUM(is_remote) as remote_count,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage
FROM (
    SELECT
        salary_avg,
        is_remote,
        CASE
            WHEN salary_avg < 50000 THEN 'Under 50K'
            WHEN salary_avg BETWEEN 50000 AND 74999 THEN '50K - 75K'
            WHEN salary_avg BETWEEN 75000 AND 99999 THEN '75K - 100K'
            WHEN salary_avg BETWEEN 100000 AND 149999 THEN '100K - 150K'
            WHEN salary_avg BETWEEN 150000 AND 199999 THEN '150K - 200K'
            ELSE 'Over 200K'
        END as salary_range
    FROM jobs
    WHERE salary_avg IS NOT NULL
) salary_buckets
GROUP BY salary_range
ORDER BY
    CASE salary_range
        WHEN 'Under 50K' THEN 1
        WHEN '50K - 75K' THEN 2
        WHEN '75K - 100K' THEN 3
        WHEN '100K - 150K' THEN 4
        WHEN '150K - 200K' THEN 5
        ELSE 6
    END
"#;

const VIEW_SENIORITY_SALARY_DETAIL: &str = r#"
CREATE OR REPLACE VIEW view_seniority_salary_detail AS
SELECT
    COALESCE(seniority, 'Not Specified') as seniority,
    COUNT(*) as job_count,
    ROUND(AVG(salary_avg), 2) as avg_salary,
    ROUND(MIN(salary_avg), 2) as min_salary,
    ROUND(MAX(salary_avg), 2) as max_salary,
    ROUND(AVG(salary_max - salary_min), 2) as avg_salary_range,
    SUM(is_remote) as remote_count,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage,
    ROUND(STDDEV(salary_avg), 2) as salary_std_dev
FROM jobs
WHERE salary_avg IS NOT NULL
GROUP BY COALESCE(seniority, 'Not Specified')
ORDER BY avg_salary DESC
"#;

const VIEW_COMPANY_BENCHMARK: &str = r#"
CREATE OR REPLACE VIEW view_company_benchmark AS
SELECT
    company,
    COUNT(*) as job_count,
    ROUND(AVG(salary_avg), 2) as avg_salary,
    ROUND(MIN(salary_avg), 2) as min_salary,
    ROUND(MAX(salary_avg), 2) as max_salary,
    SUM(is_remote) as remote_count,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage,
    CASE
        WHEN AVG(salary_avg) > (SELECT AVG(salary_avg) FROM jobs WHERE salary_avg IS NOT NULL) THEN 'Above Market'
        ELSE 'At/Below Market'
    END as market_position,
    CASE
        WHEN AVG(salary_avg) > (SELECT AVG(salary_avg) FROM jobs WHERE salary_avg IS NOT NULL) +
                              (SELECT STDDEV(salary_avg) FROM jobs WHERE salary_avg IS NOT NULL) THEN 'Premium'
        WHEN AVG(salary_avg) < (SELECT AVG(salary_avg) FROM jobs WHERE salary_avg IS NOT NULL) -
                              (SELECT STDDEV(salary_avg) FROM jobs WHERE salary_avg IS NOT NULL) THEN 'Budget'
        ELSE 'Market Rate'
    END as salary_tier
FROM jobs
WHERE company IS NOT NULL
    AND TRIM(company) != ''
    AND salary_avg IS NOT NULL
GROUP BY company
HAVING COUNT(*) >= 2
ORDER BY avg_salary DESC
"#;

const VIEW_MONTHLY_TRENDS: &str = r#"
CREATE OR REPLACE VIEW view_monthly_trends AS
SELECT
    DATE_FORMAT(post_date, '%Y-%m') as month_year,
    COUNT(*) as job_count,
    ROUND(AVG(salary_avg), 2) as avg_salary,
    SUM(is_remote) as remote_jobs,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage,
    COUNT(DISTINCT company) as unique_companies
FROM jobs
WHERE post_date IS NOT NULL AND salary_avg IS NOT NULL
GROUP BY DATE_FORMAT(post_date, '%Y-%m')
ORDER BY month_year DESC
"#;

const VIEW_SIMPLE_SUMMARY: &str = r#"
CREATE OR REPLACE VIEW view_simple_summary AS
SELECT
    COUNT(*) as total_jobs,
    COUNT(DISTINCT company) as unique_companies,
    ROUND(AVG(salary_avg), 2) as average_salary,
    SUM(is_remote) as remote_jobs,
    ROUND((SUM(is_remote) / COUNT(*)) * 100, 2) as remote_percentage,
    ROUND(MIN(salary_avg), 2) as min_salary,
    ROUND(MAX(salary_avg), 2) as max_salary
FROM jobs
WHERE salary_avg IS NOT NULL
"#;

pub static REPORT_VIEWS: [ReportView; 12] = [
    ReportView {
        name: "view_job_summary",
        label: "Job Summary",
        sql: VIEW_JOB_SUMMARY,
    },
    ReportView {
        name: "view_company_analysis",
        label: "Company Analysis",
        sql: VIEW_COMPANY_ANALYSIS,
    },
    ReportView {
        name: "view_seniority_analysis",
        label: "Seniority Analysis",
        sql: VIEW_SENIORITY_ANALYSIS,
    },
    ReportView {
        name: "view_category_analysis",
        label: "Category Analysis",
        sql: VIEW_CATEGORY_ANALYSIS,
    },
    ReportView {
        name: "view_location_analysis",
        label: "Location Analysis",
        sql: VIEW_LOCATION_ANALYSIS,
    },
    ReportView {
        name: "view_skills_analysis",
        label: "Skills Analysis",
        sql: VIEW_SKILLS_ANALYSIS,
    },
    ReportView {
        name: "view_remote_analysis",
        label: "Remote Analysis",
        sql: VIEW_REMOTE_ANALYSIS,
    },
    ReportView {
        name: "view_salary_ranges",
        label: "Salary Range Analysis",
        sql: VIEW_SALARY_RANGES,
    },
    ReportView {
        name: "view_seniority_salary_detail",
        label: "Seniority Salary Detail",
        sql: VIEW_SENIORITY_SALARY_DETAIL,
    },
    ReportView {
        name: "view_company_benchmark",
        label: "Company Salary Benchmark",
        sql: VIEW_COMPANY_BENCHMARK,
    },
    ReportView {
        name: "view_monthly_trends",
        label: "Monthly Trends",
        sql: VIEW_MONTHLY_TRENDS,
    },
    ReportView {
        name: "view_simple_summary",
        label: "Simple Summary",
        sql: VIEW_SIMPLE_SUMMARY,
    },
];

/// Drop the known views if present
pub async fn drop_views(conn: &mut MySqlConnection) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(DROP_VIEWS_SQL).execute(conn).await?;
    info!("Dropped all existing views");
    Ok(())
}

/// Create each view in `defs`, continuing past individual failures
pub async fn create_views(conn: &mut MySqlConnection, defs: &[ReportView]) -> Vec<ViewOutcome> {
    let mut outcomes = Vec::with_capacity(defs.len());

    for view in defs {
        let status = match sqlx::raw_sql(view.sql).execute(&mut *conn).await {
            Ok(_) => {
                info!("View '{}' created successfully", view.label);
                ViewStatus::Created
            }
            Err(e) => {
                error!("Error creating view '{}': {}", view.label, e);
                ViewStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        outcomes.push(ViewOutcome {
            name: view.name,
            label: view.label,
            status,
        });
    }

    let created = outcomes.iter().filter(|o| o.is_created()).count();
    info!("Created {}/{} views", created, outcomes.len());
    outcomes
}

/// Drop then recreate all reporting views
///
/// A failed drop is logged and creation still runs, since every definition
/// is `CREATE OR REPLACE`.
pub async fn recreate_views(conn: &mut MySqlConnection) -> Vec<ViewOutcome> {
    if let Err(e) = drop_views(&mut *conn).await {
        warn!("Could not drop existing views, replacing in place: {}", e);
    }
    create_views(conn, &REPORT_VIEWS).await
}

/// List views, row-count the key ones, and sample the salary ranges
pub async fn verify(conn: &mut MySqlConnection) -> Verification {
    let mut verification = Verification::default();

    match sqlx::query_scalar::<_, String>(
        "SELECT CAST(table_name AS CHAR) AS view_name \
         FROM information_schema.tables \
         WHERE table_schema = DATABASE() AND table_type = 'VIEW' \
         ORDER BY table_name",
    )
    .fetch_all(&mut *conn)
    .await
    {
        Ok(names) => {
            info!("Found {} views in database", names.len());
            for (i, name) in names.iter().enumerate() {
                info!("{}. {}", i + 1, name);
            }
            verification.views_found = names;
        }
        Err(e) => {
            warn!("Could not list views: {}", e);
            verification.errors.push(format!("listing views: {}", e));
        }
    }

    for (name, label) in KEY_VIEWS {
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", name))
            .fetch_one(&mut *conn)
            .await;
        let entry = match count {
            Ok(rows) => {
                info!("✓ {}: {} rows", label, rows);
                ViewRowCount { name, label, rows: Some(rows), error: None }
            }
            Err(e) => {
                warn!("✗ {}: ERROR - {}", label, e);
                ViewRowCount { name, label, rows: None, error: Some(e.to_string()) }
            }
        };
        verification.key_views.push(entry);
    }

    match sqlx::query_as::<_, SalaryRangeSample>(
        "SELECT salary_range, job_count, avg_in_range \
         FROM view_salary_ranges ORDER BY job_count DESC LIMIT 3",
    )
    .fetch_all(&mut *conn)
    .await
    {
        Ok(sample) => {
            for row in &sample {
                info!(
                    "  {:15} | {:3} jobs | ${} avg",
                    row.salary_range,
                    row.job_count,
                    row.avg_in_range.round(0)
                );
            }
            verification.salary_range_sample = sample;
        }
        Err(e) => {
            warn!("Could not sample view_salary_ranges: {}", e);
            verification.errors.push(format!("sampling salary ranges: {}", e));
        }
    }

    verification
}
