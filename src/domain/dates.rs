use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::domain::entities::table::Cell;

const MONTHS_PT: [(&str, &str); 12] = [
    ("janeiro", "01"),
    ("fevereiro", "02"),
    ("março", "03"),
    ("abril", "04"),
    ("maio", "05"),
    ("junho", "06"),
    ("julho", "07"),
    ("agosto", "08"),
    ("setembro", "09"),
    ("outubro", "10"),
    ("novembro", "11"),
    ("dezembro", "12"),
];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parses marketplace sale dates such as `15 de janeiro de 2024 10:30 hs.`.
pub fn parse_marketplace_date(text: &str) -> Option<NaiveDateTime> {
    let mut normalized = text
        .replace(" de ", " ")
        .replace(" hs.", "")
        .trim()
        .to_lowercase();
    if let Some(&(name, number)) = MONTHS_PT
        .iter()
        .find(|(name, _)| normalized.contains(*name))
    {
        normalized = normalized.replace(name, number);
    }

    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = parse_time(parts[3])?;
    Some(date.and_time(time))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

/// Generic date cell parser: typed datetimes, spreadsheet serial numbers and
/// the ISO / day-first text layouts.
pub fn parse_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(value) => Some(*value),
        Cell::Number(serial) => from_excel_serial(*serial),
        Cell::Text(text) => parse_datetime_text(text),
        Cell::Empty => None,
    }
}

pub fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    // fractional seconds are dropped
    let trimmed = trimmed.split('.').next().unwrap_or(trimmed);
    for format in DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(value);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn parse_day(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid datetime")
    }

    #[test]
    fn marketplace_dates_parse_portuguese_month_names() {
        assert_eq!(
            parse_marketplace_date("15 de janeiro de 2024 10:30 hs."),
            Some(at(2024, 1, 15, 10, 30))
        );
        assert_eq!(
            parse_marketplace_date("3 de Março de 2024 08:05 hs."),
            Some(at(2024, 3, 3, 8, 5))
        );
        assert_eq!(
            parse_marketplace_date("28 de dezembro de 2023 23:59:10 hs."),
            NaiveDate::from_ymd_opt(2023, 12, 28).and_then(|d| d.and_hms_opt(23, 59, 10))
        );
    }

    #[test]
    fn marketplace_dates_reject_incomplete_text() {
        assert_eq!(parse_marketplace_date("15 de janeiro de 2024"), None);
        assert_eq!(parse_marketplace_date(""), None);
        assert_eq!(parse_marketplace_date("31 de fevereiro de 2024 10:00 hs."), None);
        assert_eq!(parse_marketplace_date("15 de brumário de 2024 10:00 hs."), None);
    }

    #[test]
    fn generic_dates_accept_iso_serial_and_day_first() {
        assert_eq!(
            parse_datetime(&Cell::Text("2024-02-01 14:20:00".into())),
            Some(at(2024, 2, 1, 14, 20))
        );
        assert_eq!(
            parse_datetime(&Cell::Text("01/02/2024".into())),
            Some(at(2024, 2, 1, 0, 0))
        );
        assert_eq!(
            parse_datetime(&Cell::Number(45_323.5)),
            Some(at(2024, 2, 1, 12, 0))
        );
        assert_eq!(parse_datetime(&Cell::Text("ontem".into())), None);
        assert_eq!(parse_datetime(&Cell::Empty), None);
    }

    #[test]
    fn weekday_names_are_english() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date");
        assert_eq!(weekday_name(monday), "Monday");
    }
}
