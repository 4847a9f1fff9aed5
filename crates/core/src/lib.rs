//! hrdeck core types: records, field kinds, sort keys.

#![forbid(unsafe_code)]

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

pub mod kinds;

/// One business entity (employee, permission request, advance, expense) as
/// returned by the API: an opaque field-to-scalar mapping.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Comparison kind declared for a sortable field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldKind {
    Lexicographic,
    Numeric,
    Date,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn is_ascending(self) -> bool {
        matches!(self, SortDirection::Ascending)
    }
}

pub mod prelude {
    pub use super::kinds::{ColumnSpec, ResourceKind, TableSpec};
    pub use super::{FieldKind, Record, SortDirection, SortValue};
}

/// Borrow a string field from a record.
pub fn field_str<'a>(rec: &'a Record, field: &str) -> Option<&'a str> {
    rec.get(field).and_then(|v| v.as_str())
}

/// Record identifier used for mutation targeting. Ids on this API are
/// integers, sometimes serialized as strings.
pub fn record_id(rec: &Record, id_field: &str) -> Option<i64> {
    match rec.get(id_field)? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Render a scalar field for table output. Missing and null come out as "-".
pub fn display_value(rec: &Record, field: &str) -> String {
    match rec.get(field) {
        None | Some(serde_json::Value::Null) => "-".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Sort key extracted from one record for one declared field kind.
///
/// `Missing` covers absent fields and values that failed to parse for the
/// declared kind; those sort after every parsable value in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Time(i64),
    Missing,
}

/// Parse the date formats this API emits into a unix timestamp.
pub fn parse_date_ts(s: &str) -> Option<i64> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp());
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
    }
    None
}

/// Extract the sort key for `field` using its declared comparison kind.
pub fn sort_value(rec: &Record, field: &str, kind: FieldKind) -> SortValue {
    let Some(v) = rec.get(field) else {
        return SortValue::Missing;
    };
    match kind {
        FieldKind::Lexicographic => match v {
            serde_json::Value::String(s) => SortValue::Text(s.to_lowercase()),
            serde_json::Value::Number(n) => SortValue::Text(n.to_string()),
            serde_json::Value::Bool(b) => SortValue::Text(b.to_string()),
            _ => SortValue::Missing,
        },
        FieldKind::Numeric => {
            let n = match v {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match n {
                Some(n) if !n.is_nan() => SortValue::Number(n),
                _ => SortValue::Missing,
            }
        }
        FieldKind::Date => match v.as_str().and_then(parse_date_ts) {
            Some(ts) => SortValue::Time(ts),
            None => SortValue::Missing,
        },
    }
}

impl SortValue {
    /// Compare two keys under `dir`. Missing keys stay last regardless of
    /// direction and compare equal to each other, so a stable sort keeps
    /// their prior relative order.
    pub fn compare(&self, other: &SortValue, dir: SortDirection) -> Ordering {
        use SortValue::*;
        let natural = match (self, other) {
            (Missing, Missing) => return Ordering::Equal,
            (Missing, _) => return Ordering::Greater,
            (_, Missing) => return Ordering::Less,
            (Text(a), Text(b)) => a.cmp(b),
            (Number(a), Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Time(a), Time(b)) => a.cmp(b),
            // Mixed variants cannot come from one field kind; treat as equal.
            _ => Ordering::Equal,
        };
        if dir.is_ascending() {
            natural
        } else {
            natural.reverse()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(json: serde_json::Value) -> Record {
        json.as_object().expect("object").clone()
    }

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        assert_eq!(record_id(&rec(serde_json::json!({"id": 7})), "id"), Some(7));
        assert_eq!(record_id(&rec(serde_json::json!({"id": "7"})), "id"), Some(7));
        assert_eq!(record_id(&rec(serde_json::json!({"id": true})), "id"), None);
    }

    #[test]
    fn date_formats_parse() {
        assert!(parse_date_ts("2024-03-11T11:31:18Z").is_some());
        assert!(parse_date_ts("2024-03-11T11:31:18").is_some());
        assert!(parse_date_ts("2024-03-11").is_some());
        assert!(parse_date_ts("11/03/2024").is_none());
    }

    #[test]
    fn unparsable_sorts_last_in_both_directions() {
        let good = sort_value(
            &rec(serde_json::json!({"requestDate": "2024-03-11"})),
            "requestDate",
            FieldKind::Date,
        );
        let bad = sort_value(
            &rec(serde_json::json!({"requestDate": "not a date"})),
            "requestDate",
            FieldKind::Date,
        );
        assert_eq!(bad, SortValue::Missing);
        assert_eq!(good.compare(&bad, SortDirection::Ascending), Ordering::Less);
        assert_eq!(good.compare(&bad, SortDirection::Descending), Ordering::Less);
        assert_eq!(bad.compare(&good, SortDirection::Descending), Ordering::Greater);
    }

    #[test]
    fn lexicographic_compare_is_case_insensitive() {
        let a = SortValue::Text("anne izni".into());
        let b = sort_value(
            &rec(serde_json::json!({"permissionType": "Anne izni"})),
            "permissionType",
            FieldKind::Lexicographic,
        );
        assert_eq!(a.compare(&b, SortDirection::Ascending), Ordering::Equal);
    }

    #[test]
    fn numeric_kind_parses_strings() {
        let v = sort_value(
            &rec(serde_json::json!({"wage": "1250.50"})),
            "wage",
            FieldKind::Numeric,
        );
        assert_eq!(v, SortValue::Number(1250.5));
    }
}
