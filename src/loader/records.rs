use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::cleaning::fields::parse_datetime;
use crate::db::models::NewJobRow;
use crate::error::LoadError;

/// Columns without which the load is refused
pub const REQUIRED_COLUMNS: [&str; 3] = ["title", "company", "salary_avg"];

const NOT_SPECIFIED: &str = "Not Specified";
const UNKNOWN_COMPANY: &str = "Unknown";

/// One line of the cleaned CSV, before coercion
#[derive(Debug, Default, Deserialize)]
pub struct CleanedRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_avg: Option<String>,
    #[serde(default)]
    pub salary_min: Option<String>,
    #[serde(default)]
    pub salary_max: Option<String>,
    #[serde(default)]
    pub is_remote: Option<String>,
    #[serde(default)]
    pub seniority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub post_date: Option<String>,
    #[serde(default)]
    pub scraped_date: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn or_default(value: Option<String>, default: &str) -> Option<String> {
    Some(present(value).unwrap_or_else(|| default.to_string()))
}

fn decimal(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Any non-zero number is remote; null or unparsable is on-site
///
/// Values other than 0 and 1 are collapsed to 1 rather than stored as-is.
fn flag(value: Option<&str>) -> i8 {
    match decimal(value) {
        Some(v) if v != 0.0 => 1,
        _ => 0,
    }
}

impl From<CleanedRecord> for NewJobRow {
    fn from(record: CleanedRecord) -> Self {
        NewJobRow {
            title: present(record.title),
            company: or_default(record.company, UNKNOWN_COMPANY),
            location: or_default(record.location, NOT_SPECIFIED),
            salary_avg: decimal(record.salary_avg.as_deref()),
            salary_min: decimal(record.salary_min.as_deref()),
            salary_max: decimal(record.salary_max.as_deref()),
            is_remote: flag(record.is_remote.as_deref()),
            seniority: or_default(record.seniority, NOT_SPECIFIED),
            category: or_default(record.category, NOT_SPECIFIED),
            skills: or_default(record.skills, ""),
            post_date: record
                .post_date
                .as_deref()
                .and_then(parse_datetime)
                .map(|dt| dt.date()),
            scraped_date: record.scraped_date.as_deref().and_then(parse_datetime),
        }
    }
}

/// Parse cleaned CSV text into insert-ready rows
pub fn parse_cleaned(content: &[u8]) -> Result<Vec<NewJobRow>, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(content);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for record in reader.deserialize::<CleanedRecord>() {
        rows.push(NewJobRow::from(record?));
    }
    Ok(rows)
}

/// Read the cleaned file written by the Normalizer
pub fn read_cleaned(path: &Path) -> Result<Vec<NewJobRow>, LoadError> {
    if !path.exists() {
        return Err(LoadError::SourceMissing(path.to_path_buf()));
    }

    info!("Loading data from {}", path.display());
    let content = std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse_cleaned(&content)?;
    info!("Loaded {} records", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "title,company,location,salary_avg,salary_min,salary_max,is_remote,seniority,category,skills,post_date,scraped_date\n";

    #[test]
    fn defaults_fill_missing_text() {
        let csv = format!("{}Dev,,,55000.0,50000.0,60000.0,1,,,,,\n", HEADER);
        let rows = parse_cleaned(csv.as_bytes()).unwrap();

        let row = &rows[0];
        assert_eq!(row.title.as_deref(), Some("Dev"));
        assert_eq!(row.company.as_deref(), Some("Unknown"));
        assert_eq!(row.location.as_deref(), Some("Not Specified"));
        assert_eq!(row.seniority.as_deref(), Some("Not Specified"));
        assert_eq!(row.category.as_deref(), Some("Not Specified"));
        assert_eq!(row.skills.as_deref(), Some(""));
        assert_eq!(row.salary_avg, Some(55000.0));
        assert_eq!(row.is_remote, 1);
        assert_eq!(row.post_date, None);
        assert_eq!(row.scraped_date, None);
    }

    #[test]
    fn values_are_coerced_for_storage() {
        let csv = format!(
            "{},Acme,Berlin,abc,,60000,,Senior,Data,\"rust, sql\",2025-12-20,2025-12-22 00:09:14\n",
            HEADER
        );
        let rows = parse_cleaned(csv.as_bytes()).unwrap();

        let row = &rows[0];
        assert_eq!(row.title, None);
        assert_eq!(row.salary_avg, None);
        assert_eq!(row.salary_min, None);
        assert_eq!(row.salary_max, Some(60000.0));
        assert_eq!(row.is_remote, 0);
        assert_eq!(row.skills.as_deref(), Some("rust, sql"));
        assert_eq!(row.post_date, NaiveDate::from_ymd_opt(2025, 12, 20));
        assert_eq!(
            row.scraped_date,
            NaiveDate::from_ymd_opt(2025, 12, 22).and_then(|d| d.and_hms_opt(0, 9, 14))
        );
    }

    #[test]
    fn remote_flag_collapses_to_zero_or_one() {
        let csv = "title,company,salary_avg,is_remote\nA,Acme,1,2\nB,Acme,1,-1\nC,Acme,1,0.0\nD,Acme,1,yes\n";
        let rows = parse_cleaned(csv.as_bytes()).unwrap();
        let flags: Vec<i8> = rows.iter().map(|r| r.is_remote).collect();
        assert_eq!(flags, vec![1, 1, 0, 0]);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let rows = parse_cleaned(b"title,company,salary_avg\nDev,Acme,1.5\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].is_remote, 0);
        assert_eq!(rows[0].location.as_deref(), Some("Not Specified"));
    }

    #[test]
    fn missing_required_columns_are_fatal() {
        let err = parse_cleaned(b"title,location\nDev,Berlin\n").unwrap_err();
        match err {
            LoadError::MissingColumns(cols) => assert_eq!(cols, vec!["company", "salary_avg"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn missing_file_is_reported_before_anything_else() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_cleaned(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::SourceMissing(_)));
    }
}
