// Date helpers: display formatting and the holidays query date range.

use chrono::{Datelike, NaiveDate, Utc};

// Render an ISO date ("2025-12-25") as a "day month" label ("25 December"),
// no year, no zero padding. Input that does not parse is returned unchanged
// rather than failing the render.
pub fn format_date(iso_date: &str) -> String {
    match NaiveDate::parse_from_str(iso_date, "%Y-%m-%d") {
        Ok(date) => date.format("%-d %B").to_string(),
        Err(_) => iso_date.to_string(),
    }
}

// Jan 1 and Dec 31 of the given year.
pub fn year_span(year: i32) -> (NaiveDate, NaiveDate) {
    // Both dates exist for every year chrono can represent.
    let from = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid calendar date");
    let to = NaiveDate::from_ymd_opt(year, 12, 31).expect("valid calendar date");
    (from, to)
}

// The holidays query always spans the current calendar year.
pub fn current_year_span() -> (NaiveDate, NaiveDate) {
    year_span(Utc::now().date_naive().year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_day_month() {
        assert_eq!(format_date("2025-12-25"), "25 December");
        assert_eq!(format_date("2025-01-01"), "1 January");
        // Single-digit days are not zero padded.
        assert_eq!(format_date("2026-03-05"), "5 March");
    }

    #[test]
    fn test_format_date_passes_malformed_input_through() {
        assert_eq!(format_date("not-a-date"), "not-a-date");
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("2025-13-40"), "2025-13-40");
    }

    #[test]
    fn test_year_span_covers_full_year() {
        let (from, to) = year_span(2025);
        assert_eq!(from.format("%Y-%m-%d").to_string(), "2025-01-01");
        assert_eq!(to.format("%Y-%m-%d").to_string(), "2025-12-31");
    }

    #[test]
    fn test_current_year_span_uses_current_year() {
        let (from, to) = current_year_span();
        let year = Utc::now().date_naive().year();
        assert_eq!(from.year(), year);
        assert_eq!(to.year(), year);
        assert_eq!((from.month(), from.day()), (1, 1));
        assert_eq!((to.month(), to.day()), (12, 31));
    }
}
