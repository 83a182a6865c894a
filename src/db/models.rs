use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

/// One `jobs` row ready to insert, after load-time defaults and coercion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewJobRow {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary_avg: Option<f64>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub is_remote: i8,
    pub seniority: Option<String>,
    pub category: Option<String>,
    pub skills: Option<String>,
    pub post_date: Option<NaiveDate>,
    pub scraped_date: Option<NaiveDateTime>,
}

/// Outcome of creating one reporting view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewStatus {
    Created,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewOutcome {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub status: ViewStatus,
}

impl ViewOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self.status, ViewStatus::Created)
    }
}

/// Row count of a key view, or the error raised while counting it
#[derive(Debug, Clone, Serialize)]
pub struct ViewRowCount {
    pub name: &'static str,
    pub label: &'static str,
    pub rows: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One line of `view_salary_ranges`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SalaryRangeSample {
    pub salary_range: String,
    pub job_count: i64,
    #[serde(serialize_with = "serialize_decimal")]
    pub avg_in_range: bigdecimal::BigDecimal,
}

fn serialize_decimal<S>(value: &bigdecimal::BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}

/// Post-creation checks; errors are recorded, never raised
#[derive(Debug, Clone, Default, Serialize)]
pub struct Verification {
    pub views_found: Vec<String>,
    pub key_views: Vec<ViewRowCount>,
    pub salary_range_sample: Vec<SalaryRangeSample>,
    pub errors: Vec<String>,
}
