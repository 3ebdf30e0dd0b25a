//! Tabular export of stored readings as CSV or XLSX.
//!
//! Readings are first flattened into an [`ExportTable`] of display strings
//! (six fixed columns), which is then serialized by the requested writer.

use chrono::{NaiveDate, SecondsFormat};
use rust_xlsxwriter::Workbook;

use crate::error::ExportError;
use crate::models::WeatherReading;

// ---

pub const HEADERS: [&str; 6] = [
    "Timestamp",
    "Temperature",
    "Humidity",
    "Wind Speed",
    "Condition",
    "Location",
];

pub const SHEET_NAME: &str = "Weather Data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// Download name hint, e.g. `weather-data-2025-03-26.csv`.
    pub fn file_name(self, date: NaiveDate) -> String {
        format!("weather-data-{}.{}", date.format("%Y-%m-%d"), self.extension())
    }
}

/// In-memory table: one row of rendered cells per reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTable {
    rows: Vec<[String; 6]>,
}

impl ExportTable {
    pub fn from_readings(readings: &[WeatherReading]) -> Self {
        // ---
        let rows = readings
            .iter()
            .map(|r| {
                [
                    r.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                    format!("{}°C", r.temperature),
                    format!("{}%", r.humidity),
                    format!("{} km/h", r.wind_speed),
                    r.condition.clone(),
                    r.location.clone(),
                ]
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[[String; 6]] {
        &self.rows
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        // ---
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADERS)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        // ---
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, header) in HEADERS.iter().enumerate() {
            sheet.write_string(0, col as u16, *header)?;
        }
        for (i, row) in self.rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                sheet.write_string(i as u32 + 1, col as u16, cell.as_str())?;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

/// Render readings (newest first) into the requested format.
///
/// An empty slice yields a header-only table.
pub fn export_table(
    readings: &[WeatherReading],
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    // ---
    let table = ExportTable::from_readings(readings);
    let bytes = match format {
        ExportFormat::Csv => table.to_csv()?,
        ExportFormat::Xlsx => table.to_xlsx()?,
    };

    tracing::debug!(
        "Exported {} rows as {} ({} bytes)",
        table.rows().len(),
        format.extension(),
        bytes.len()
    );
    Ok(bytes)
}
