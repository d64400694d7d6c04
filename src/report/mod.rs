use std::{
    collections::BTreeSet,
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;

use crate::{ledger::entities::DayRecord, utils::time::day_id_to_label};

/// Synthetic row holding each day's total tracked hours. Always the last row
/// of the matrix and always in hours, even in percentage mode.
pub const TOTAL_ROW: &str = "total elapsed";

const SECONDS_PER_HOUR: f64 = 60.0 * 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    /// Cell values are hours worked on the order that day.
    Hours,
    /// Cell values are the order's share of the day's total, in percent.
    Percentage,
}

impl std::fmt::Display for ReportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportMode::Hours => write!(f, "hours"),
            ReportMode::Percentage => write!(f, "percentage"),
        }
    }
}

/// Day × order pivot of the ledger. Columns are day ids in chronological
/// order, rows are every order name ever recorded plus [TOTAL_ROW].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMatrix {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

/// Pivots raw day records into a report matrix. Hours are rounded to one
/// decimal; percentages divide by the day's unrounded total and are zero for
/// days whose stored total is zero, the stored total is never back-filled
/// from the orders.
pub fn build_matrix(records: &[DayRecord], mode: ReportMode) -> ReportMatrix {
    let mut columns = BTreeSet::new();
    let mut order_names = BTreeSet::new();
    for record in records {
        columns.insert(record.day.clone());
        order_names.extend(record.orders.keys().cloned());
    }

    // YYYYMMDD sorts lexicographically in chronological order.
    let columns: Vec<String> = columns.into_iter().collect();
    let mut rows: Vec<String> = order_names.into_iter().collect();
    rows.push(TOTAL_ROW.to_string());

    let mut values = vec![vec![0.0; columns.len()]; rows.len()];

    for record in records {
        let Ok(column) = columns.binary_search(&record.day) else {
            continue;
        };
        let total_hours = record.elapsed / SECONDS_PER_HOUR;
        values[rows.len() - 1][column] = round_cell(total_hours);

        for (name, seconds) in &record.orders {
            let Some(row) = rows.iter().position(|row| row == name) else {
                continue;
            };
            let hours = seconds / SECONDS_PER_HOUR;
            let cell = match mode {
                ReportMode::Hours => hours,
                ReportMode::Percentage if total_hours == 0.0 => 0.0,
                ReportMode::Percentage => hours / total_hours * 100.0,
            };
            values[row][column] = round_cell(cell);
        }
    }

    ReportMatrix {
        rows,
        columns,
        values,
    }
}

impl ReportMatrix {
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.rows
            .iter()
            .zip(&self.values)
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column headers in display form, DD-MM-YYYY.
    pub fn column_labels(&self) -> Result<Vec<String>> {
        self.columns.iter().map(|day| day_id_to_label(day)).collect()
    }

    /// Drops every column outside the calendar month containing `today`.
    pub fn retain_current_month(&mut self, today: NaiveDate) -> Result<()> {
        let mut keep = Vec::with_capacity(self.columns.len());
        for day_id in &self.columns {
            let date = crate::utils::time::day_id_to_date(day_id)?;
            keep.push(date.year() == today.year() && date.month() == today.month());
        }

        let mut keep_column = keep.iter().copied();
        self.columns.retain(|_| keep_column.next().unwrap());
        for row in &mut self.values {
            let mut keep_column = keep.iter().copied();
            row.retain(|_| keep_column.next().unwrap());
        }
        Ok(())
    }

    /// Serializes the matrix into spreadsheet-compatible CSV, one line per
    /// row with the order name in the first field.
    pub fn to_csv(&self) -> Result<String> {
        let mut out = String::new();
        out.push_str("order");
        for label in self.column_labels()? {
            out.push(',');
            out.push_str(&csv_field(&label));
        }
        out.push('\n');

        for (name, values) in self.rows() {
            out.push_str(&csv_field(name));
            for value in values {
                out.push(',');
                out.push_str(&format!("{value:.1}"));
            }
            out.push('\n');
        }
        Ok(out)
    }

    #[cfg(test)]
    fn value(&self, row: &str, day_id: &str) -> Option<f64> {
        let row = self.rows.iter().position(|v| v == row)?;
        let column = self.columns.iter().position(|v| v == day_id)?;
        Some(self.values[row][column])
    }
}

/// Writes the matrix to `destination`, optionally handing it to the
/// platform's file opener afterwards.
pub async fn export_csv(matrix: &ReportMatrix, destination: &Path, open_after: bool) -> Result<()> {
    let csv = matrix.to_csv()?;
    tokio::fs::write(destination, csv)
        .await
        .with_context(|| format!("Failed to write report to {destination:?}"))?;
    if open_after {
        open_in_viewer(destination)?;
    }
    Ok(())
}

/// Fire-and-forget handoff to whatever the OS associates with the file.
fn open_in_viewer(path: &Path) -> Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(path);
        command
    };
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut command = Command::new("open");
        command.arg(path);
        command
    };
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    };

    command.stdout(Stdio::null()).stderr(Stdio::null());
    #[allow(clippy::zombie_processes)]
    let _ = command
        .spawn()
        .with_context(|| format!("Failed to open {path:?} in a viewer"))?;
    Ok(())
}

fn round_cell(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
