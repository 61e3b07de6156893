//! JSON lines formatter
//!
//! Keys come from the fields named in the configured format string
//! (`%(asctime)s %(levelname)s %(message)s` yields `asctime`, `levelname` and
//! `message`). `message` and every `extra` attribute are always present, and
//! an attached error is rendered under `exc_info`.

use super::template::{Field, FieldData, Template, TemplateStyle};
use crate::core::config::JsonFormatterSection;
use crate::core::error::Result;
use crate::core::log_record::LogRecord;
use crate::core::timestamp::ZonedTimestamp;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct JsonFormatter {
    template: Template,
    timestamp: ZonedTimestamp,
}

impl JsonFormatter {
    pub fn new(format: &str, style: &str, timezone: &str) -> Result<Self> {
        let style: TemplateStyle = style.parse()?;
        Ok(Self {
            template: Template::parse(format, style)?,
            timestamp: ZonedTimestamp::new(timezone, None)?,
        })
    }

    pub fn from_section(section: &JsonFormatterSection, timezone: &str) -> Result<Self> {
        Self::new(&section.format, &section.style, timezone)
    }

    /// Keys taken from the format string, in order of appearance
    pub fn keys(&self) -> Vec<&str> {
        self.template.fields().into_iter().map(Field::key).collect()
    }

    /// Build the JSON object for a record
    pub fn to_value(&self, record: &LogRecord) -> Value {
        let mut object = Map::new();

        for field in self.template.fields() {
            let value = match field {
                Field::LogColor | Field::Reset => continue,
                Field::Asctime => Value::String(self.timestamp.format(&record.timestamp)),
                Field::Extra(key) => record
                    .extra
                    .get(key)
                    .map_or(Value::Null, |v| v.to_json_value()),
                other => FieldData::from_record(other, record).to_json_value(),
            };
            object.insert(field.key().to_string(), value);
        }

        object
            .entry("message")
            .or_insert_with(|| Value::String(record.message.clone()));

        for (key, value) in record.extra.fields() {
            object
                .entry(key.as_str())
                .or_insert_with(|| value.to_json_value());
        }

        if let Some(ref error) = record.error {
            object.insert("exc_info".to_string(), Value::String(error.render()));
        }

        Value::Object(object)
    }

    /// One JSON object, no trailing newline
    pub fn format(&self, record: &LogRecord) -> String {
        self.to_value(record).to_string()
    }
}
