//! Parsing of the query string parameters shared by the API endpoints.
//!
//! Every parameter arrives as an optional string so that a missing or
//! malformed value is reported as an [Error] with a JSON message instead of
//! an extractor rejection.

use serde::Deserialize;
use time::Month;

use crate::Error;

/// The raw query parameters for endpoints that only take a month.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MonthParams {
    pub month: Option<String>,
}

/// The raw query parameters for the transaction listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListParams {
    pub page_number: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
    pub month: Option<String>,
}

/// Parse the required `month` parameter as a calendar month.
///
/// # Errors
/// Returns [Error::MissingParameter] if the value is absent or blank, and
/// [Error::InvalidParameter] if it is not a whole number from 1 to 12.
pub(crate) fn parse_month(raw: Option<&str>) -> Result<Month, Error> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Err(Error::MissingParameter("month")),
        Some(value) => value,
    };

    let invalid = || Error::InvalidParameter {
        name: "month",
        value: value.to_owned(),
        reason: "expected a whole number from 1 to 12",
    };

    let number: u8 = value.parse().map_err(|_| invalid())?;

    Month::try_from(number).map_err(|_| invalid())
}

/// Parse a positive page parameter, falling back to `default` when the value
/// is absent or blank.
///
/// # Errors
/// Returns [Error::InvalidParameter] if the value is not a whole number or is
/// less than 1.
pub(crate) fn parse_page_param(
    name: &'static str,
    raw: Option<&str>,
    default: u64,
) -> Result<u64, Error> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(value) => value,
    };

    match value.parse::<u64>() {
        Ok(0) => Err(Error::InvalidParameter {
            name,
            value: value.to_owned(),
            reason: "must be at least 1",
        }),
        Ok(number) => Ok(number),
        Err(_) => Err(Error::InvalidParameter {
            name,
            value: value.to_owned(),
            reason: "expected a whole number",
        }),
    }
}

#[cfg(test)]
mod tests {
    use time::Month;

    use crate::Error;

    use super::{parse_month, parse_page_param};

    #[test]
    fn parses_every_month() {
        for number in 1..=12u8 {
            let got = parse_month(Some(&number.to_string())).expect("Could not parse month");

            assert_eq!(u8::from(got), number);
        }
    }

    #[test]
    fn month_tolerates_surrounding_whitespace() {
        assert_eq!(parse_month(Some(" 3 ")), Ok(Month::March));
    }

    #[test]
    fn missing_month_is_missing_parameter() {
        assert_eq!(parse_month(None), Err(Error::MissingParameter("month")));
        assert_eq!(parse_month(Some("")), Err(Error::MissingParameter("month")));
        assert_eq!(parse_month(Some("  ")), Err(Error::MissingParameter("month")));
    }

    #[test]
    fn out_of_range_month_is_invalid() {
        for value in ["0", "13", "-1", "March", "3.5"] {
            let got = parse_month(Some(value));

            assert!(
                matches!(got, Err(Error::InvalidParameter { name: "month", .. })),
                "month {value:?} gave {got:?}"
            );
        }
    }

    #[test]
    fn page_param_defaults_when_absent() {
        assert_eq!(parse_page_param("pageSize", None, 10), Ok(10));
        assert_eq!(parse_page_param("pageSize", Some(""), 10), Ok(10));
    }

    #[test]
    fn page_param_rejects_zero_and_garbage() {
        for value in ["0", "-2", "ten", "1.5"] {
            let got = parse_page_param("pageNumber", Some(value), 1);

            assert!(
                matches!(got, Err(Error::InvalidParameter { name: "pageNumber", .. })),
                "pageNumber {value:?} gave {got:?}"
            );
        }
    }

    #[test]
    fn page_param_parses_positive_numbers() {
        assert_eq!(parse_page_param("pageNumber", Some("3"), 1), Ok(3));
    }
}
