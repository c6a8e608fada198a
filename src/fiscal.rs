use chrono::{Datelike, NaiveDate, Utc};

/// First month of the Indian fiscal year (April).
const FISCAL_YEAR_START_MONTH: u32 = 4;

/// Fiscal year a given date falls in. The year label is the calendar year
/// the fiscal year starts in: 2024-03-31 belongs to FY 2023, 2024-04-01 to
/// FY 2024.
pub fn fiscal_year_of(date: NaiveDate) -> i32 {
    if date.month() >= FISCAL_YEAR_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Fiscal year for "today".
pub fn current_fiscal_year() -> i32 {
    fiscal_year_of(Utc::now().date_naive())
}

/// Resolves an optional `year` request parameter to a concrete fiscal year.
pub fn resolve_year(param: Option<i32>) -> i32 {
    param.unwrap_or_else(current_fiscal_year)
}

/// Inclusive date range covered by a fiscal year (April 1st to March 31st).
pub fn fiscal_year_bounds(year: i32) -> (NaiveDate, NaiveDate) {
    // Both dates are always valid for any in-range year.
    let start = NaiveDate::from_ymd_opt(year, FISCAL_YEAR_START_MONTH, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 4, 1).unwrap());
    let end = NaiveDate::from_ymd_opt(year + 1, 3, 31)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(1971, 3, 31).unwrap());
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(2024, 4, 1 => 2024; "april first starts a new fiscal year")]
    #[test_case(2024, 3, 31 => 2023; "march belongs to the previous fiscal year")]
    #[test_case(2025, 1, 15 => 2024; "january stays in the running fiscal year")]
    #[test_case(2024, 12, 31 => 2024; "december stays in the current fiscal year")]
    fn fiscal_year_assignment(y: i32, m: u32, d: u32) -> i32 {
        fiscal_year_of(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn explicit_year_param_wins() {
        assert_eq!(resolve_year(Some(2019)), 2019);
    }

    #[test]
    fn bounds_span_april_to_march() {
        let (start, end) = fiscal_year_bounds(2024);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(fiscal_year_of(start), 2024);
        assert_eq!(fiscal_year_of(end), 2024);
    }
}
