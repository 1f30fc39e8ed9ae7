use chrono::{NaiveDate, NaiveDateTime, Utc};

pub const DISPLAY_DATE_TIME: &str = "%a %-d %b %Y, %H:%M";
pub const DISPLAY_DATE: &str = "%-d %b %Y";

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Completed years between `date_of_birth` and `on`. Zero for future birth dates.
pub fn age_on(date_of_birth: NaiveDate, on: NaiveDate) -> u32 {
    on.years_since(date_of_birth).unwrap_or(0)
}

/// Mean of the known ages, rounded to one decimal place.
pub fn average_age(ages: impl IntoIterator<Item = u32>) -> Option<f64> {
    let (sum, count) = ages
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), age| (sum + u64::from(age), count + 1));
    if count == 0 {
        return None;
    }
    let mean = sum as f64 / count as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Parses the value of an `<input type="datetime-local">`, with or without seconds.
pub fn parse_event_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
