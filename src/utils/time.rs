use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};

/// This is the standard way of converting a day to its record key in worktally.
pub fn date_to_day_id(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn day_id_to_date(day_id: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(day_id, "%Y%m%d")
        .map_err(|e| anyhow!("Day id {day_id} is not a YYYYMMDD date: {e}"))
}

/// Day ids are shown to the user as DD-MM-YYYY in reports.
pub fn day_id_to_label(day_id: &str) -> Result<String> {
    Ok(day_id_to_date(day_id)?.format("%d-%m-%Y").to_string())
}

/// Timer display format, hours unpadded like a stopwatch face.
pub fn format_elapsed(v: Duration) -> String {
    format!(
        "{}:{:02}:{:02}",
        v.num_hours(),
        v.num_minutes() % 60,
        v.num_seconds() % 60
    )
}
