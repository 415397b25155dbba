//! Small shared helpers for the CLI layer: tag and date/time parsing.
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::{AgendaError, Result};

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Parses a reminder timestamp. Accepts RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC), or a bare date (taken at
/// midnight UTC).
pub fn parse_when(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)));
    }

    Err(AgendaError::InvalidFormat {
        message: format!("Unrecognized date/time: {}", input),
    })
}

/// Parses a calendar day in `YYYY-MM-DD` form.
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| AgendaError::InvalidFormat {
        message: format!("Invalid date '{}': {}", input, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parse_tags_trims_and_drops_empties() {
        let tags = parse_tags(Some(" work, urgent,, design ".to_string()));
        assert_eq!(tags, vec!["work", "urgent", "design"]);
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn parse_when_accepts_common_forms() {
        assert!(parse_when("2024-05-01T09:00:00Z").is_ok());
        assert!(parse_when("2024-05-01T09:00").is_ok());

        let midnight = parse_when("2024-05-01").unwrap();
        assert_eq!(midnight.hour(), 0);

        assert!(parse_when("next tuesday").is_err());
    }
}
