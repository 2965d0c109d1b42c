use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;

/// Integer identifier of a record in any collection.
///
/// Reference fields arrive from the backend either as a bare id (`7`, `"7"`)
/// or as an embedded lookup object (`{"Id": 7, "Name": "..."}`). Both forms
/// deserialize into the same `RecordId`, so callers never re-check the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(i64);

impl RecordId {
    /// Build an id from a raw integer. Ids are strictly positive.
    pub fn new(raw: i64) -> Result<Self, AppError> {
        if raw <= 0 {
            return Err(AppError::ValidationError(format!(
                "Invalid record id {raw}: must be a positive integer"
            )));
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let raw: i64 = trimmed.parse().map_err(|_| {
            AppError::ValidationError(format!("Invalid record id '{trimmed}': not an integer"))
        })?;
        Self::new(raw)
    }
}

impl From<RecordId> for serde_json::Value {
    fn from(id: RecordId) -> Self {
        serde_json::Value::from(id.0)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReference {
    Number(i64),
    Text(String),
    Embedded {
        #[serde(rename = "Id")]
        id: Box<RawReference>,
    },
}

impl RawReference {
    fn resolve(self) -> Result<RecordId, AppError> {
        match self {
            RawReference::Number(n) => RecordId::new(n),
            RawReference::Text(s) => s.parse(),
            RawReference::Embedded { id } => id.resolve(),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawReference::deserialize(deserializer)?
            .resolve()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_ids() {
        assert_eq!("42".parse::<RecordId>().unwrap().get(), 42);
        assert_eq!(" 7 ".parse::<RecordId>().unwrap().get(), 7);
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        for raw in ["", "abc", "1.5", "0", "-3"] {
            let err = raw.parse::<RecordId>().unwrap_err();
            assert!(
                matches!(err, AppError::ValidationError(_)),
                "expected validation error for {raw:?}"
            );
        }
    }

    #[test]
    fn test_deserialize_bare_and_embedded_references() {
        let bare: RecordId = serde_json::from_value(json!(12)).unwrap();
        let text: RecordId = serde_json::from_value(json!("12")).unwrap();
        let embedded: RecordId =
            serde_json::from_value(json!({"Id": 12, "Name": "Acme"})).unwrap();
        assert_eq!(bare, text);
        assert_eq!(bare, embedded);
    }

    #[test]
    fn test_deserialize_rejects_garbage_reference() {
        assert!(serde_json::from_value::<RecordId>(json!("twelve")).is_err());
        assert!(serde_json::from_value::<RecordId>(json!({"Name": "Acme"})).is_err());
        assert!(serde_json::from_value::<RecordId>(json!(true)).is_err());
    }

    #[test]
    fn test_serializes_as_integer() {
        let id = RecordId::new(5).unwrap();
        assert_eq!(serde_json::to_value(id).unwrap(), json!(5));
    }
}
