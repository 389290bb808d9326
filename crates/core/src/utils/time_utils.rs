use chrono::{Months, NaiveDate, NaiveDateTime, Utc};

/// Today's date in UTC. All ledger dates are calendar dates in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Current UTC timestamp without timezone, as stored on ledger rows.
pub fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Adds whole calendar months to a date.
///
/// Day-of-month is kept where possible and clamped to the last day of the
/// target month otherwise (Jan 31 + 1 month = Feb 28/29). Saturates at
/// `NaiveDate::MAX` instead of overflowing.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Subtracts whole calendar months, clamping like [`add_months`].
pub fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn add_months_keeps_day_of_month() {
        assert_eq!(add_months(d(2024, 3, 15), 2), d(2024, 5, 15));
    }

    #[test]
    fn add_months_rolls_over_year() {
        assert_eq!(add_months(d(2024, 11, 10), 2), d(2025, 1, 10));
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(d(2023, 12, 31), 2), d(2024, 2, 29));
        assert_eq!(add_months(d(2025, 1, 31), 1), d(2025, 2, 28));
    }

    #[test]
    fn sub_months_clamps_to_month_end() {
        assert_eq!(sub_months(d(2024, 5, 31), 3), d(2024, 2, 29));
    }

    #[test]
    fn add_zero_months_is_identity() {
        assert_eq!(add_months(d(2024, 6, 30), 0), d(2024, 6, 30));
    }
}
