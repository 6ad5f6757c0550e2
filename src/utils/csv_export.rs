use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};

use crate::model::attendance::AttendanceEntry;

pub const CSV_HEADERS: [&str; 5] = ["Name", "Roll Number", "Class", "Time", "Status"];

pub fn export_filename(date: NaiveDate) -> String {
    format!("attendance_{}.csv", date.format("%Y-%m-%d"))
}

/// Wall-clock time of a scan, e.g. `8:05:09 AM`.
pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%-I:%M:%S %p").to_string()
}

pub fn attendance_csv(entries: &[AttendanceEntry]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for entry in entries {
        writer.write_record([
            entry.student.name.as_str(),
            entry.student.roll_no.as_str(),
            entry.student.class.as_str(),
            format_time(entry.timestamp).as_str(),
            entry.status.as_ref(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e.error()))
}
