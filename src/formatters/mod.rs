//! Record formatters
//!
//! Every sink owns exactly one [`Formatter`]. The set of formatters is closed
//! and fixed when the crate is compiled; which one a sink gets is decided by
//! [`OutputFormatterFactory`].

pub mod factory;
pub mod template;
pub mod text;

#[cfg(feature = "color")]
pub mod colored;
#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "color")]
pub use self::colored::ColoredFormatter;
pub use factory::{Capabilities, OutputFormatterFactory, Target};
#[cfg(feature = "json")]
pub use json::JsonFormatter;
pub use template::{Template, TemplateStyle};
pub use text::TimestampFormatter;

use crate::core::log_record::LogRecord;

#[derive(Debug, Clone)]
pub enum Formatter {
    Plain(TimestampFormatter),
    #[cfg(feature = "color")]
    Colored(ColoredFormatter),
    #[cfg(feature = "json")]
    Structured(JsonFormatter),
}

impl Formatter {
    /// Render one record; may span several lines when an error is attached
    pub fn format(&self, record: &LogRecord) -> String {
        match self {
            Formatter::Plain(f) => f.format(record),
            #[cfg(feature = "color")]
            Formatter::Colored(f) => f.format(record),
            #[cfg(feature = "json")]
            Formatter::Structured(f) => f.format(record),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Formatter::Plain(_) => "plain",
            #[cfg(feature = "color")]
            Formatter::Colored(_) => "colored",
            #[cfg(feature = "json")]
            Formatter::Structured(_) => "json",
        }
    }
}

impl From<TimestampFormatter> for Formatter {
    fn from(f: TimestampFormatter) -> Self {
        Formatter::Plain(f)
    }
}

#[cfg(feature = "color")]
impl From<ColoredFormatter> for Formatter {
    fn from(f: ColoredFormatter) -> Self {
        Formatter::Colored(f)
    }
}

#[cfg(feature = "json")]
impl From<JsonFormatter> for Formatter {
    fn from(f: JsonFormatter) -> Self {
        Formatter::Structured(f)
    }
}

/// Append the error section of a record on the following lines
pub(crate) fn append_exception(out: &mut String, record: &LogRecord) {
    if let Some(ref error) = record.error {
        out.push('\n');
        out.push_str(&error.render());
    }
}
