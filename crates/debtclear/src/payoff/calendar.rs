use chrono::{Months, NaiveDate};

/// Calendar date `months` after `start`; day-of-month clamps to month end.
pub fn debt_free_date(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(months))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_calendar_months() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date");
        assert_eq!(
            debt_free_date(start, 14),
            NaiveDate::from_ymd_opt(2026, 3, 15)
        );
        assert_eq!(debt_free_date(start, 0), Some(start));
    }

    #[test]
    fn clamps_to_end_of_shorter_month() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date");
        assert_eq!(
            debt_free_date(start, 1),
            NaiveDate::from_ymd_opt(2025, 2, 28)
        );
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(
            parse_date(" 2025-09-24 "),
            Ok(NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date"))
        );
        assert!(parse_date("24/09/2025").is_err());
    }
}
