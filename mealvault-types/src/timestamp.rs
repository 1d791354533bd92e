//! Timestamp formats shared by the stores and the audit log.
//!
//! Registration stamps and the split audit date/time must keep these exact
//! shapes to round-trip with previously stored data.

use chrono::Local;

pub const REGISTRATION_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const LOG_DATE_FORMAT: &str = "%d-%m-%Y";
pub const LOG_TIME_FORMAT: &str = "%H:%M:%S";

/// Current local time as a `YYYY-MM-DD HH:MM:SS` registration stamp.
pub fn registration_now() -> String {
    Local::now().format(REGISTRATION_FORMAT).to_string()
}

/// Current local date as `DD-MM-YYYY` for an audit row.
pub fn log_date_now() -> String {
    Local::now().format(LOG_DATE_FORMAT).to_string()
}

/// Current local time as `HH:MM:SS` for an audit row.
pub fn log_time_now() -> String {
    Local::now().format(LOG_TIME_FORMAT).to_string()
}
