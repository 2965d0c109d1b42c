use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Comparison operators supported by the record backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    EqualTo,
    /// Case-insensitive substring match.
    Contains,
    GreaterThanOrEqualTo,
    /// Set membership: the field equals any of the values.
    ExactMatch,
}

/// One conjunct of a `where` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub values: Vec<Value>,
}

impl Condition {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator: Operator::EqualTo,
            values: vec![value.into()],
        }
    }

    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator: Operator::Contains,
            values: vec![value.into()],
        }
    }

    pub fn gte(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator: Operator::GreaterThanOrEqualTo,
            values: vec![value.into()],
        }
    }

    pub fn one_of<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.to_string(),
            operator: Operator::ExactMatch,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluate this condition against a stored record.
    ///
    /// Reference fields stored as embedded objects are compared by their `Id`.
    pub fn matches(&self, record: &Value) -> bool {
        let Some(actual) = record.get(&self.field).map(reference_value) else {
            return false;
        };

        match self.operator {
            Operator::EqualTo | Operator::ExactMatch => {
                self.values.iter().any(|expected| loosely_equal(actual, expected))
            }
            Operator::Contains => {
                let Some(haystack) = as_text(actual) else {
                    return false;
                };
                let haystack = haystack.to_lowercase();
                self.values.iter().any(|needle| {
                    as_text(needle).is_some_and(|n| haystack.contains(&n.to_lowercase()))
                })
            }
            Operator::GreaterThanOrEqualTo => {
                let Some(lhs) = as_number(actual) else {
                    return false;
                };
                self.values
                    .iter()
                    .filter_map(as_number)
                    .any(|rhs| lhs >= rhs)
            }
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let include = self.operator == Operator::ExactMatch;
        let mut state = serializer.serialize_struct("Condition", if include { 4 } else { 3 })?;
        state.serialize_field("FieldName", &self.field)?;
        state.serialize_field("Operator", &self.operator)?;
        state.serialize_field("Values", &self.values)?;
        if include {
            state.serialize_field("Include", &true)?;
        }
        state.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field: String,
    #[serde(rename = "sorttype")]
    pub direction: SortDirection,
}

/// A fetch request: projected fields, conjunctive conditions, ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Query {
    #[serde(serialize_with = "serialize_fields")]
    pub fields: Vec<String>,
    #[serde(rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(rename = "orderBy", skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
}

impl Query {
    pub fn select(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// True if the record satisfies every condition.
    pub fn matches(&self, record: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

/// `["Id", "Name"]` → `[{"field": {"Name": "Id"}}, {"field": {"Name": "Name"}}]`
fn serialize_fields<S: Serializer>(fields: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    struct FieldName<'a>(&'a str);

    impl Serialize for FieldName<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut inner = serializer.serialize_map(Some(1))?;
            inner.serialize_entry("Name", self.0)?;
            inner.end()
        }
    }

    struct FieldEntry<'a>(&'a str);

    impl Serialize for FieldEntry<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut outer = serializer.serialize_map(Some(1))?;
            outer.serialize_entry("field", &FieldName(self.0))?;
            outer.end()
        }
    }

    serializer.collect_seq(fields.iter().map(|f| FieldEntry(f)))
}

fn reference_value(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map.get("Id").unwrap_or(value),
        other => other,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Equality that treats `7` and `"7"` as the same value, since identifiers
/// and numeric fields are not consistently typed in stored records.
fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
