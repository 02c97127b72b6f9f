//! Colon-delimited duration parsing (`HH:MM:SS`, `MM:SS`, `SS`).

use thiserror::Error;

/// Hours, minutes, seconds. Anything longer is rejected rather than read as days.
pub const MAX_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp cannot be empty")]
    Empty,
    #[error("invalid field {field:?} in timestamp {value:?}")]
    InvalidField { field: String, value: String },
    #[error("timestamp {0:?} has more than {MAX_FIELDS} fields, expected HH:MM:SS")]
    TooManyFields(String),
    #[error("timestamp {0:?} does not fit in 64 bits of seconds")]
    Overflow(String),
}

/// Parse a duration such as `"00:01:30"` into whole seconds.
///
/// Fields are read most-significant first and summed with place value 60,
/// so `"01:30"` is 90 and `"90"` is 90 as well. Field ranges are not
/// normalized: `"00:90:00"` is 5400.
///
/// ```
/// use temporal_labels::timestamp::parse_hms;
/// assert_eq!(parse_hms("00:01:30").unwrap(), 90);
/// assert_eq!(parse_hms("01:00:00").unwrap(), 3600);
/// ```
pub fn parse_hms(hms: &str) -> Result<u64, TimestampError> {
    let hms = hms.trim();
    if hms.is_empty() {
        return Err(TimestampError::Empty);
    }

    let fields: Vec<&str> = hms.split(':').collect();
    if fields.len() > MAX_FIELDS {
        return Err(TimestampError::TooManyFields(hms.to_owned()));
    }

    let mut total: u64 = 0;
    for (position, field) in fields.iter().rev().enumerate() {
        // u64::from_str would accept a leading '+'
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimestampError::InvalidField {
                field: field.to_string(),
                value: hms.to_owned(),
            });
        }
        let value: u64 = field
            .parse()
            .map_err(|_| TimestampError::Overflow(hms.to_owned()))?;
        let place = 60u64.pow(position as u32);
        total = value
            .checked_mul(place)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| TimestampError::Overflow(hms.to_owned()))?;
    }

    Ok(total)
}

/// Render whole seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hh_mm_ss() {
        assert_eq!(parse_hms("00:00:00").unwrap(), 0);
        assert_eq!(parse_hms("00:01:00").unwrap(), 60);
        assert_eq!(parse_hms("01:00:00").unwrap(), 3600);
        assert_eq!(parse_hms("00:01:30").unwrap(), 90);
        assert_eq!(parse_hms("01:30:45").unwrap(), 5445);
    }

    #[test]
    fn parses_shorter_forms() {
        assert_eq!(parse_hms("05:30").unwrap(), 330);
        assert_eq!(parse_hms("90").unwrap(), 90);
        assert_eq!(parse_hms(" 00:00:07 ").unwrap(), 7);
    }

    #[test]
    fn does_not_normalize_field_ranges() {
        assert_eq!(parse_hms("00:90:00").unwrap(), 5400);
        assert_eq!(parse_hms("00:00:75").unwrap(), 75);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_hms(""), Err(TimestampError::Empty));
        assert_eq!(parse_hms("   "), Err(TimestampError::Empty));
        assert!(matches!(
            parse_hms("abc"),
            Err(TimestampError::InvalidField { .. })
        ));
        assert!(matches!(
            parse_hms("00::10"),
            Err(TimestampError::InvalidField { .. })
        ));
        assert!(matches!(
            parse_hms("00:-1:10"),
            Err(TimestampError::InvalidField { .. })
        ));
        assert!(matches!(
            parse_hms("00:01:30.5"),
            Err(TimestampError::InvalidField { .. })
        ));
    }

    #[test]
    fn rejects_more_than_three_fields() {
        assert_eq!(
            parse_hms("1:02:03:04"),
            Err(TimestampError::TooManyFields("1:02:03:04".to_owned()))
        );
    }

    #[test]
    fn reports_overflow() {
        assert!(matches!(
            parse_hms("99999999999999999999"),
            Err(TimestampError::Overflow(_))
        ));
        assert!(matches!(
            parse_hms("18446744073709551615:00"),
            Err(TimestampError::Overflow(_))
        ));
    }

    #[test]
    fn formats_seconds() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(90), "00:01:30");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(90_000), "25:00:00");
    }
}
