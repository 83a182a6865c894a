use std::collections::HashSet;

use chrono::NaiveDateTime;
use csv::ReaderBuilder;

use crate::error::CleanError;

/// Typed cells of one column
#[derive(Debug, Clone, PartialEq)]
pub enum Cells {
    Text(Vec<Option<String>>),
    Decimal(Vec<Option<f64>>),
    /// 0/1 flag, never null
    Flag(Vec<u8>),
    DateTime(Vec<Option<NaiveDateTime>>),
}

impl Cells {
    pub fn len(&self) -> usize {
        match self {
            Cells::Text(v) => v.len(),
            Cells::Decimal(v) => v.len(),
            Cells::Flag(v) => v.len(),
            Cells::DateTime(v) => v.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Cells,
}

/// Column-oriented working dataset for the cleaning steps
///
/// Every column always holds exactly `rows` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    rows: usize,
}

/// Lowercase, trim, and replace internal spaces with underscores
///
/// `"  Salary Min "` becomes `salary_min`.
pub fn normalize_header(label: &str) -> String {
    label.to_lowercase().trim().replace(' ', "_")
}

impl Frame {
    /// Parse CSV text into a frame of text columns
    ///
    /// Headers are normalized and columns whose normalized label was already
    /// seen are dropped, so the leftmost occurrence wins.
    pub fn from_csv_str(content: &str) -> Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();

        let mut seen = HashSet::new();
        let mut kept: Vec<(usize, String)> = Vec::new();
        for (idx, raw) in headers.iter().enumerate() {
            let name = normalize_header(raw);
            if seen.insert(name.clone()) {
                kept.push((idx, name));
            }
        }

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); kept.len()];
        let mut rows = 0;
        for record in reader.records() {
            let record = record?;
            for (slot, (idx, _)) in cells.iter_mut().zip(&kept) {
                let value = record
                    .get(*idx)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                slot.push(value);
            }
            rows += 1;
        }

        let columns = kept
            .into_iter()
            .zip(cells)
            .map(|((_, name), cells)| Column {
                name,
                cells: Cells::Text(cells),
            })
            .collect();

        Ok(Frame { columns, rows })
    }

    /// Read a CSV file, decoding lossily when it is not valid UTF-8
    pub fn read_csv(path: &std::path::Path) -> Result<Self, CleanError> {
        let bytes = std::fs::read(path).map_err(|source| CleanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);

        let frame = Self::from_csv_str(&content)?;
        if frame.columns.iter().all(|c| c.name.is_empty()) {
            return Err(CleanError::EmptyHeader(path.to_path_buf()));
        }
        Ok(frame)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Cells> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.cells)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Cells> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.cells)
    }

    /// Replace the cells of `name`, appending the column if it does not exist
    pub fn set(&mut self, name: &str, cells: Cells) {
        debug_assert_eq!(cells.len(), self.rows);
        match self.get_mut(name) {
            Some(slot) => *slot = cells,
            None => self.columns.push(Column {
                name: name.to_string(),
                cells,
            }),
        }
    }

    /// Take the cells of `name` out of the frame, leaving an empty text column
    pub fn take(&mut self, name: &str) -> Option<Cells> {
        self.get_mut(name)
            .map(|slot| std::mem::replace(slot, Cells::Text(Vec::new())))
    }

    /// Keep only the listed columns that exist, in the listed order
    pub fn project(mut self, order: &[&str]) -> Frame {
        let mut columns = Vec::with_capacity(order.len());
        for name in order {
            if let Some(pos) = self.columns.iter().position(|c| c.name == *name) {
                columns.push(self.columns.swap_remove(pos));
            }
        }
        Frame {
            columns,
            rows: self.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_normalization_ignores_case_and_spacing() {
        assert_eq!(normalize_header("Salary Min"), "salary_min");
        assert_eq!(normalize_header("salary_min"), "salary_min");
        assert_eq!(normalize_header("  SALARY_MIN  "), "salary_min");
        assert_eq!(normalize_header("Post Date"), "post_date");
    }

    #[test]
    fn duplicate_columns_keep_the_first_occurrence() {
        let frame = Frame::from_csv_str("Company,title,company\nAcme,Dev,Other\n").unwrap();

        assert_eq!(frame.names().collect::<Vec<_>>(), vec!["company", "title"]);
        assert_eq!(
            frame.get("company"),
            Some(&Cells::Text(vec![Some("Acme".to_string())]))
        );
    }

    #[test]
    fn empty_and_missing_cells_are_null() {
        let frame = Frame::from_csv_str("title,company,location\nDev,,Berlin\nOps\n").unwrap();

        assert_eq!(frame.rows(), 2);
        assert_eq!(
            frame.get("company"),
            Some(&Cells::Text(vec![None, None]))
        );
        assert_eq!(
            frame.get("location"),
            Some(&Cells::Text(vec![Some("Berlin".to_string()), None]))
        );
    }

    #[test]
    fn projection_is_best_effort_and_ordered() {
        let frame = Frame::from_csv_str("skills,extra,title\nrust,x,Dev\n").unwrap();
        let projected = frame.project(&["title", "company", "skills"]);

        assert_eq!(projected.names().collect::<Vec<_>>(), vec!["title", "skills"]);
        assert_eq!(projected.rows(), 1);
    }
}
