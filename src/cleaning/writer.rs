use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::fields::DateLayout;
use super::frame::{Cells, Frame};
use crate::error::CleanError;

/// Render a salary value; whole numbers keep a trailing `.0`
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Pre-rendered text of one output column
fn render(cells: &Cells) -> Vec<String> {
    match cells {
        Cells::Text(values) => values.iter().map(|v| v.clone().unwrap_or_default()).collect(),
        Cells::Decimal(values) => values
            .iter()
            .map(|v| v.map(format_decimal).unwrap_or_default())
            .collect(),
        Cells::Flag(values) => values.iter().map(u8::to_string).collect(),
        Cells::DateTime(values) => {
            let layout = DateLayout::for_column(values);
            values
                .iter()
                .map(|v| v.as_ref().map(|dt| layout.format(dt)).unwrap_or_default())
                .collect()
        }
    }
}

/// Serialize the frame as CSV with a header row
pub fn write_csv<W: Write>(frame: &Frame, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record(frame.names())?;

    let rendered: Vec<Vec<String>> = frame.columns().iter().map(|c| render(&c.cells)).collect();
    for row in 0..frame.rows() {
        writer.write_record(rendered.iter().map(|col| col[row].as_str()))?;
    }

    writer.flush()?;
    Ok(())
}

/// Overwrite `path` with the frame
pub fn write_file(frame: &Frame, path: &Path) -> Result<(), CleanError> {
    let file = File::create(path).map_err(|source| CleanError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(frame, file)?;
    Ok(())
}
