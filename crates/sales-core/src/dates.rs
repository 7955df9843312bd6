use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

/// Format used when writing dates back out (CSV export, reports).
///
/// `%.f` prints nothing for whole seconds, so exported values re-parse to the
/// same instant.
pub const EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Date-time patterns tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only patterns; the parsed value is midnight of that day.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%b %d, %Y"];

// ── DateParser ────────────────────────────────────────────────────────────────

/// Parses the textual order and ship dates found in sales exports.
pub struct DateParser;

impl DateParser {
    /// Parse `s` into a naive date-time, or `None` when no format matches.
    ///
    /// Handles:
    /// * RFC 3339 with `Z` or an explicit offset, normalised to UTC.
    /// * ISO 8601 date-times with `T` or a space separator.
    /// * Month-first slash dates (`01/15/2024`).
    /// * Abbreviated month names (`15-Jan-2024`, `Jan 15, 2024`).
    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc).naive_utc());
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        debug!("DateParser: no format matched \"{}\"", s);
        None
    }

    /// Render a date-time in [`EXPORT_FORMAT`].
    pub fn format(value: &NaiveDateTime) -> String {
        value.format(EXPORT_FORMAT).to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
