//! Survey records as exported by the field-survey app, and their decoding
//! into typed fields.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{GeoPoint, TagSet};

/// Reserved form keys carrying the point location
pub const LONGITUDE_KEY: &str = "LONGITUDE";
pub const LATITUDE_KEY: &str = "LATITUDE";

const BOOLEAN_TYPE: &str = "boolean";

/// One exported survey note: `{"form": {"formitems": [...]}}`
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyRecord {
    pub form: Form,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub formitems: Vec<FormItem>,
}

/// A single form field descriptor
#[derive(Debug, Clone, Deserialize)]
pub struct FormItem {
    pub key: String,

    #[serde(default)]
    pub value: Value,

    /// Declared widget type ("boolean", "string", "double", ...)
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Longitude,
    Latitude,
}

/// A form field decoded once at the input boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Coordinate(Axis, String),
    BooleanFlag(String, bool),
    TextTag(String, String),
}

impl FormItem {
    pub fn new(key: &str, value: &str, kind: &str) -> Self {
        Self {
            key: key.to_string(),
            value: Value::String(value.to_string()),
            kind: kind.to_string(),
        }
    }

    fn value_text(&self) -> String {
        match &self.value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Decode into a typed field. Items with an empty value carry nothing.
    pub fn decode(&self) -> Option<Field> {
        let value = self.value_text();
        if value.is_empty() {
            return None;
        }

        if self.kind == BOOLEAN_TYPE {
            match value.as_str() {
                "true" => return Some(Field::BooleanFlag(self.key.clone(), true)),
                "false" => return Some(Field::BooleanFlag(self.key.clone(), false)),
                _ => {}
            }
        }

        let field = match self.key.as_str() {
            LONGITUDE_KEY => Field::Coordinate(Axis::Longitude, value),
            LATITUDE_KEY => Field::Coordinate(Axis::Latitude, value),
            _ => Field::TextTag(self.key.clone(), value),
        };
        Some(field)
    }
}

/// Fields of one record sorted into location and tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRecord {
    pub longitude: Option<String>,
    pub latitude: Option<String>,
    pub tags: TagSet,
}

impl DecodedRecord {
    /// Location if both coordinates are present and parse as finite numbers
    pub fn location(&self) -> Option<GeoPoint> {
        let lon = parse_coordinate(self.longitude.as_deref()?)?;
        let lat = parse_coordinate(self.latitude.as_deref()?)?;
        Some(GeoPoint { lat, lon })
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warn!("Ignoring unparseable coordinate {:?}", raw);
            None
        }
    }
}

impl SurveyRecord {
    pub fn from_items(items: Vec<FormItem>) -> Self {
        Self {
            form: Form { formitems: items },
        }
    }

    /// Later items with the same key override earlier ones.
    pub fn decode(&self) -> DecodedRecord {
        let mut decoded = DecodedRecord::default();

        for field in self.form.formitems.iter().filter_map(FormItem::decode) {
            match field {
                Field::Coordinate(Axis::Longitude, v) => decoded.longitude = Some(v),
                Field::Coordinate(Axis::Latitude, v) => decoded.latitude = Some(v),
                Field::BooleanFlag(_, false) => {}
                Field::BooleanFlag(key, true) => {
                    decoded.tags.insert(key, "yes".to_string());
                }
                Field::TextTag(key, value) => {
                    decoded.tags.insert(key, value);
                }
            }
        }

        decoded
    }
}
