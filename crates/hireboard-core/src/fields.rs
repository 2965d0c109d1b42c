//! Codecs for record fields whose stored form differs from the domain form.
//!
//! List-valued fields (requirements, benefits, skills) are stored as
//! comma-joined strings; timestamps are stored as strings.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppError;

const LIST_SEPARATOR: char = ',';

/// Parse a comma-joined field into its items, trimming whitespace and
/// dropping empty segments.
///
/// `"a, b ,c"` → `["a", "b", "c"]`
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join items into the stored comma-separated form.
///
/// Items are trimmed. An item that is blank or contains the separator could
/// not be recovered by [`split_list`], so it is rejected.
pub fn join_list<S: AsRef<str>>(field: &str, items: &[S]) -> Result<String, AppError> {
    let mut cleaned = Vec::with_capacity(items.len());
    for item in items {
        let item = item.as_ref().trim();
        if item.is_empty() {
            return Err(AppError::ValidationError(format!(
                "{field} contains an empty item"
            )));
        }
        if item.contains(LIST_SEPARATOR) {
            return Err(AppError::ValidationError(format!(
                "{field} item '{item}' must not contain '{LIST_SEPARATOR}'"
            )));
        }
        cleaned.push(item);
    }
    Ok(cleaned.join(","))
}

/// Parse a stored timestamp. Accepts RFC 3339 and bare `YYYY-MM-DD`
/// (midnight UTC). Unparseable values are logged and dropped.
pub fn parse_timestamp(field: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Some(ts) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Some(ts.and_utc());
    }

    tracing::warn!(%field, value = %raw, "Ignoring unparseable timestamp");
    None
}

/// Format a timestamp in the stored form.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Reject a required text field that is missing or blank.
pub fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_split_trims_items() {
        assert_eq!(split_list("a, b, c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("  rust ,  sql"), vec!["rust", "sql"]);
    }

    #[test]
    fn test_split_drops_empty_segments() {
        assert!(split_list("").is_empty());
        assert!(split_list(" , ,").is_empty());
        assert_eq!(split_list("a,,b,"), vec!["a", "b"]);
    }

    #[test]
    fn test_join_then_split_is_lossless() {
        let items = vec!["5+ years Rust", "Postgres", "On-call rotation"];
        let joined = join_list("requirements", &items).unwrap();
        assert_eq!(joined, "5+ years Rust,Postgres,On-call rotation");
        assert_eq!(split_list(&joined), items);
    }

    #[test]
    fn test_split_then_join_is_equivalent() {
        let stored = "a, b, c";
        let items = split_list(stored);
        let rejoined = join_list("requirements", &items).unwrap();
        assert_eq!(split_list(&rejoined), split_list(stored));
    }

    #[test]
    fn test_join_rejects_unrecoverable_items() {
        let err = join_list("benefits", &["Dental, vision"]).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = join_list("benefits", &["Dental", "  "]).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_join_empty_list() {
        let empty: [&str; 0] = [];
        assert_eq!(join_list("skills", &empty).unwrap(), "");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            parse_timestamp("posted_at", Some("2024-03-01T12:30:00Z")),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp("posted_at", Some("2024-03-01T14:30:00+02:00")),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp("expires_at", Some("2024-03-01")),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_degrades_to_none() {
        assert_eq!(parse_timestamp("posted_at", None), None);
        assert_eq!(parse_timestamp("posted_at", Some("")), None);
        assert_eq!(parse_timestamp("posted_at", Some("next tuesday")), None);
    }

    #[test]
    fn test_format_timestamp_round_trips() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let stored = format_timestamp(&ts);
        assert_eq!(stored, "2025-01-02T03:04:05.000Z");
        assert_eq!(parse_timestamp("x", Some(&stored)), Some(ts));
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("title", "Engineer").is_ok());
        assert!(require_text("title", "").is_err());
        assert!(require_text("title", "   ").is_err());
    }
}
