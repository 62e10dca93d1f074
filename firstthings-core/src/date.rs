//! Calendar date handling
//!
//! Due dates and list item start/end dates are naive calendar dates.
//! They are never converted through a timezone: "2024-03-15" is March 15
//! everywhere, and "today" is always the local calendar day.
//!
//! Supported input formats for [`parse_date`]:
//! - ISO dates: "2026-01-25"
//! - Human dates: "Jan 25", "January 25 2026"
//! - Relative: "today", "tomorrow", "monday", "next friday"
//! - Offset: "in 3 days", "in 1 week"

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

use crate::error::{CoreError, Result};

/// Storage format for calendar dates
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Today's date on the local calendar
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a stored calendar date.
///
/// Accepts "YYYY-MM-DD" and tolerates a trailing time component
/// ("2024-03-15T00:00:00Z"), which is discarded without shifting the day.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    let day_part = match input.split_once('T') {
        Some((day, _)) => day,
        None => input,
    };

    NaiveDate::parse_from_str(day_part, ISO_DATE)
        .map_err(|e| CoreError::parse_with_source(format!("Invalid date '{}'", input), e))
}

/// Overdue means due strictly before `today` and still open
pub fn is_overdue(due: Option<NaiveDate>, completed: bool, today: NaiveDate) -> bool {
    match due {
        Some(date) => date < today && !completed,
        None => false,
    }
}

/// Parse user input into a NaiveDate
///
/// Supports multiple formats:
/// - ISO: "2026-01-25"
/// - Human: "Jan 25", "January 25", "Jan 25 2026"
/// - Relative: "today", "tomorrow"
/// - Weekdays: "monday", "tuesday", etc. (next occurrence)
/// - Prefixed: "next monday", "next friday"
/// - Offset: "in 3 days", "in 1 week", "in 2 weeks"
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    parse_date_relative_to(input, today())
}

/// Same as [`parse_date`] with an explicit reference day
pub fn parse_date_relative_to(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim().to_lowercase();

    if let Some(date) = try_parse_relative(&input, today) {
        return Ok(date);
    }

    if let Some(date) = try_parse_weekday(&input, today) {
        return Ok(date);
    }

    if let Some(date) = try_parse_offset(&input, today) {
        return Ok(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(&input, ISO_DATE) {
        return Ok(date);
    }

    let with_year = [
        "%b %d %Y", // Jan 25 2026
        "%B %d %Y", // January 25 2026
        "%m/%d/%Y", // 01/25/2026
        "%d %b %Y", // 25 Jan 2026
        "%d %B %Y", // 25 January 2026
    ];

    for format in &with_year {
        if let Ok(date) = NaiveDate::parse_from_str(&input, format) {
            return Ok(date);
        }
    }

    // chrono needs a year to build a date, so borrow the current one and
    // roll forward when the day has already passed.
    let without_year = ["%b %d", "%B %d", "%m/%d"];

    for format in &without_year {
        let padded = format!("{} {}", input, today.year());
        let padded_format = format!("{} %Y", format);
        if let Ok(date) = NaiveDate::parse_from_str(&padded, &padded_format) {
            if date < today {
                return date
                    .with_year(today.year() + 1)
                    .ok_or_else(|| CoreError::parse("Invalid date"));
            }
            return Ok(date);
        }
    }

    Err(CoreError::parse(format!(
        "Could not parse date '{}'. Try formats like: 'tomorrow', 'Jan 25', '2026-01-25', 'next monday', 'in 3 days'",
        input
    )))
}

fn try_parse_relative(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    match input {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        _ => None,
    }
}

fn try_parse_weekday(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let weekday_str = input.strip_prefix("next ").unwrap_or(input);

    let target_weekday = match weekday_str {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };

    // Next occurrence, never today
    let days = (target_weekday.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64
        + 7)
        % 7;
    let days_until = if days == 0 { 7 } else { days as u64 };

    today.checked_add_days(Days::new(days_until))
}

fn try_parse_offset(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let rest = input.strip_prefix("in ")?.trim();
    let parts: Vec<&str> = rest.split_whitespace().collect();

    if parts.len() != 2 {
        return None;
    }

    let num: u64 = parts[0].parse().ok()?;

    match parts[1] {
        "day" | "days" => today.checked_add_days(Days::new(num)),
        "week" | "weeks" => today.checked_add_days(Days::new(num.checked_mul(7)?)),
        _ => None,
    }
}

/// Format a NaiveDate for human-readable display
///
/// Returns strings like: "Today", "Tomorrow", "Mon Jan 27", "Overdue (3 days ago)"
pub fn format_date_human(date: NaiveDate, today: NaiveDate) -> String {
    let diff = date.signed_duration_since(today).num_days();

    match diff {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        2..=6 => date.format("%a %b %d").to_string(),
        7..=365 => date.format("%b %d").to_string(),
        _ if diff < 0 => format!("Overdue ({} days ago)", -diff),
        _ => date.format(ISO_DATE).to_string(),
    }
}

/// Serde adapter for optional calendar dates.
///
/// Absent dates are written as `""`. Reading accepts `""`, `null`, or a
/// missing field (with `#[serde(default)]`) as `None`.
pub mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::{ISO_DATE, parse_calendar_date};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.collect_str(&d.format(ISO_DATE)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_calendar_date(s).map(Some).map_err(D::Error::custom),
        }
    }
}
