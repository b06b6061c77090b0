//! Resolves month names from query parameters to filters on the date of sale.

/// The month name used when a request does not specify one.
pub const DEFAULT_MONTH_NAME: &str = "march";

/// A calendar month, used to scope reports to sales made in that month of any year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Month {
    /// January
    January,
    /// February
    February,
    /// March
    March,
    /// April
    April,
    /// May
    May,
    /// June
    June,
    /// July
    July,
    /// August
    August,
    /// September
    September,
    /// October
    October,
    /// November
    November,
    /// December
    December,
}

impl Month {
    /// Look up a month by its English name, ignoring case.
    ///
    /// Whitespace is significant, so `" march"` does not resolve.
    ///
    /// Returns `None` for anything that is not one of the twelve month names.
    pub fn from_name(name: &str) -> Option<Self> {
        let month = match name.to_lowercase().as_str() {
            "january" => Month::January,
            "february" => Month::February,
            "march" => Month::March,
            "april" => Month::April,
            "may" => Month::May,
            "june" => Month::June,
            "july" => Month::July,
            "august" => Month::August,
            "september" => Month::September,
            "october" => Month::October,
            "november" => Month::November,
            "december" => Month::December,
            _ => return None,
        };

        Some(month)
    }

    /// The two-digit month number, e.g. "03" for March.
    pub fn code(self) -> &'static str {
        match self {
            Month::January => "01",
            Month::February => "02",
            Month::March => "03",
            Month::April => "04",
            Month::May => "05",
            Month::June => "06",
            Month::July => "07",
            Month::August => "08",
            Month::September => "09",
            Month::October => "10",
            Month::November => "11",
            Month::December => "12",
        }
    }

    /// A SQLite `GLOB` pattern matching dates of sale that start with
    /// `YYYY-<code>-DD`, for any four-digit year.
    ///
    /// This is a textual prefix match on the stored string, not a date comparison.
    pub fn date_pattern(self) -> String {
        format!("[0-9][0-9][0-9][0-9]-{}-[0-9][0-9]*", self.code())
    }
}

/// Resolve the `month` query parameter, falling back to [DEFAULT_MONTH_NAME] when it is
/// absent or empty.
pub fn month_or_default(name: Option<&str>) -> Option<Month> {
    let name = name.filter(|name| !name.is_empty());
    Month::from_name(name.unwrap_or(DEFAULT_MONTH_NAME))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{Month, month_or_default};

    #[test]
    fn resolves_names_case_insensitively() {
        assert_eq!(Month::from_name("March"), Some(Month::March));
        assert_eq!(Month::from_name("MARCH"), Some(Month::March));
        assert_eq!(Month::from_name("dEcEmBeR"), Some(Month::December));
    }

    #[test]
    fn surrounding_whitespace_is_not_ignored() {
        assert_eq!(Month::from_name(" march"), None);
        assert_eq!(Month::from_name("march "), None);
        assert_eq!(month_or_default(Some(" march")), None);
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        assert_eq!(Month::from_name("mar"), None);
        assert_eq!(Month::from_name(""), None);
        assert_eq!(Month::from_name("03"), None);
        assert_eq!(Month::from_name("smarch"), None);
    }

    #[test]
    fn codes_are_two_digits() {
        assert_eq!(Month::January.code(), "01");
        assert_eq!(Month::September.code(), "09");
        assert_eq!(Month::December.code(), "12");
    }

    #[test]
    fn defaults_to_march() {
        assert_eq!(month_or_default(None), Some(Month::March));
        assert_eq!(month_or_default(Some("july")), Some(Month::July));
        assert_eq!(month_or_default(Some("nope")), None);
    }

    #[test]
    fn empty_month_defaults_to_march() {
        assert_eq!(month_or_default(Some("")), Some(Month::March));
    }

    #[test]
    fn date_pattern_matches_month_prefix_for_any_year() {
        let conn = Connection::open_in_memory().unwrap();
        let pattern = Month::March.date_pattern();
        let matches = |date: &str| -> bool {
            conn.query_row("SELECT ?1 GLOB ?2", (date, &pattern), |row| row.get(0))
                .unwrap()
        };

        assert!(matches("2021-03-05"));
        assert!(matches("1999-03-31T20:29:54+05:30"));
        assert!(!matches("2021-04-05"));
        assert!(!matches("21-03-05"));
        assert!(!matches("2021-3-05"));
        assert!(!matches("x2021-03-05"));
    }
}
