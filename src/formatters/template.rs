//! Record templates
//!
//! A template is parsed once at construction into literal and field segments,
//! so rendering never fails. Three placeholder styles are understood:
//!
//! | style | example |
//! |---|---|
//! | `{` | `{asctime} [{levelname:<8}] {message}` |
//! | `%` | `%(asctime)s [%(levelname)-8s] %(message)s` |
//! | `$` | `${asctime} [$levelname] ${message}` |
//!
//! Unknown field names refer to the record's `extra` attributes.

use crate::core::error::{LoggerError, Result};
use crate::core::log_context::FieldValue;
use crate::core::log_record::LogRecord;
use std::fmt::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateStyle {
    #[default]
    Brace,
    Percent,
    Dollar,
}

impl FromStr for TemplateStyle {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "{" => Ok(TemplateStyle::Brace),
            "%" => Ok(TemplateStyle::Percent),
            "$" => Ok(TemplateStyle::Dollar),
            other => Err(LoggerError::formatter_config(
                "style",
                format!("style must be one of '{{', '%', '$', got '{}'", other),
            )),
        }
    }
}

/// A placeholder that can appear in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Asctime,
    Created,
    Msecs,
    RelativeCreated,
    LevelName,
    LevelNo,
    Name,
    Message,
    Thread,
    ThreadName,
    Process,
    Module,
    Filename,
    Lineno,
    /// Escape sequence for the record's severity color (colored output only)
    LogColor,
    /// Escape sequence resetting all attributes (colored output only)
    Reset,
    Extra(String),
}

impl Field {
    fn parse(name: &str) -> Self {
        match name {
            "asctime" => Field::Asctime,
            "created" => Field::Created,
            "msecs" => Field::Msecs,
            "relativeCreated" => Field::RelativeCreated,
            "levelname" => Field::LevelName,
            "levelno" => Field::LevelNo,
            "name" => Field::Name,
            "message" => Field::Message,
            "thread" => Field::Thread,
            "threadName" => Field::ThreadName,
            "process" => Field::Process,
            "module" => Field::Module,
            "filename" => Field::Filename,
            "lineno" => Field::Lineno,
            "log_color" => Field::LogColor,
            "reset" => Field::Reset,
            other => Field::Extra(other.to_string()),
        }
    }

    /// Key used for this field in structured output
    pub fn key(&self) -> &str {
        match self {
            Field::Asctime => "asctime",
            Field::Created => "created",
            Field::Msecs => "msecs",
            Field::RelativeCreated => "relativeCreated",
            Field::LevelName => "levelname",
            Field::LevelNo => "levelno",
            Field::Name => "name",
            Field::Message => "message",
            Field::Thread => "thread",
            Field::ThreadName => "threadName",
            Field::Process => "process",
            Field::Module => "module",
            Field::Filename => "filename",
            Field::Lineno => "lineno",
            Field::LogColor => "log_color",
            Field::Reset => "reset",
            Field::Extra(name) => name,
        }
    }
}

/// Raw value of a field before the format spec is applied
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Str(String),
    Int(i64),
    Float(f64),
}

impl FieldData {
    /// Extract a record field; `asctime` and color fields are supplied by the formatter
    pub fn from_record(field: &Field, record: &LogRecord) -> Self {
        match field {
            Field::Created => FieldData::Float(record.created()),
            Field::Msecs => FieldData::Float(record.msecs()),
            Field::RelativeCreated => FieldData::Float(record.relative_created()),
            Field::LevelName => FieldData::Str(record.level.to_str().to_string()),
            Field::LevelNo => FieldData::Int(i64::from(record.level.levelno())),
            Field::Name => FieldData::Str(record.name.clone()),
            Field::Message => FieldData::Str(record.message.clone()),
            Field::Thread => FieldData::Int(record.thread_id as i64),
            Field::ThreadName => FieldData::Str(
                record
                    .thread_name
                    .clone()
                    .unwrap_or_else(|| format!("Thread-{}", record.thread_id)),
            ),
            Field::Process => FieldData::Int(i64::from(record.process_id)),
            Field::Module => FieldData::Str(record.module().unwrap_or_default().to_string()),
            Field::Filename => FieldData::Str(record.filename().unwrap_or_default().to_string()),
            Field::Lineno => FieldData::Int(record.line.map_or(0, i64::from)),
            Field::Extra(key) => match record.extra.get(key) {
                Some(FieldValue::Int(i)) => FieldData::Int(*i),
                Some(FieldValue::Float(f)) => FieldData::Float(*f),
                Some(value) => FieldData::Str(value.to_string()),
                None => FieldData::Str(String::new()),
            },
            Field::Asctime | Field::LogColor | Field::Reset => FieldData::Str(String::new()),
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldData::Str(s) => serde_json::Value::String(s.clone()),
            FieldData::Int(i) => serde_json::Value::Number((*i).into()),
            FieldData::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

/// Width/precision/alignment attached to a placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    fill: Option<char>,
    align: Option<Align>,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    kind: Option<char>,
}

impl FieldSpec {
    /// Parse a brace spec: `[[fill]align][0][width][.precision][type]`
    fn parse_brace(spec: &str) -> Result<Self> {
        let mut out = FieldSpec::default();
        let chars: Vec<char> = spec.chars().collect();
        let mut i = 0;

        let align_of = |c: char| match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            _ => None,
        };

        if chars.len() >= 2 && align_of(chars[1]).is_some() {
            out.fill = Some(chars[0]);
            out.align = align_of(chars[1]);
            i = 2;
        } else if let Some(align) = chars.first().and_then(|c| align_of(*c)) {
            out.align = Some(align);
            i = 1;
        }

        if chars.get(i) == Some(&'0') {
            out.zero = true;
            i += 1;
        }

        let (width, next) = read_number(&chars, i);
        out.width = width;
        i = next;

        if chars.get(i) == Some(&'.') {
            let (precision, next) = read_number(&chars, i + 1);
            if precision.is_none() {
                return Err(bad_spec(spec));
            }
            out.precision = precision;
            i = next;
        }

        match chars.get(i) {
            None => {}
            Some(c) if matches!(c, 's' | 'd' | 'f' | 'r') && i + 1 == chars.len() => {
                out.kind = Some(*c);
            }
            Some(_) => return Err(bad_spec(spec)),
        }

        Ok(out)
    }

    /// Apply this spec to a value
    pub fn apply(&self, data: FieldData) -> String {
        let numeric = !matches!(data, FieldData::Str(_));
        let body = match (data, self.kind) {
            (FieldData::Float(f), Some('d')) => format!("{}", f.trunc() as i64),
            (FieldData::Int(i), Some('f')) => format!("{:.*}", self.precision.unwrap_or(6), i as f64),
            (FieldData::Float(f), Some('f')) => format!("{:.*}", self.precision.unwrap_or(6), f),
            (FieldData::Float(f), _) => match self.precision {
                Some(p) => format!("{:.*}", p, f),
                None => f.to_string(),
            },
            (FieldData::Int(i), _) => i.to_string(),
            (FieldData::Str(s), Some('r')) => format!("{:?}", s),
            (FieldData::Str(s), _) => match self.precision {
                Some(p) => s.chars().take(p).collect(),
                None => s,
            },
        };
        self.pad(body, numeric)
    }

    fn pad(&self, body: String, numeric: bool) -> String {
        let Some(width) = self.width else {
            return body;
        };
        let len = body.chars().count();
        if len >= width {
            return body;
        }
        let missing = width - len;

        if self.zero && self.align.is_none() {
            let (sign, digits) = match body.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", body.as_str()),
            };
            return format!("{}{}{}", sign, "0".repeat(missing), digits);
        }

        let fill = self.fill.unwrap_or(' ');
        let align = self
            .align
            .unwrap_or(if numeric { Align::Right } else { Align::Left });
        let pad = |n: usize| fill.to_string().repeat(n);

        match align {
            Align::Left => format!("{}{}", body, pad(missing)),
            Align::Right => format!("{}{}", pad(missing), body),
            Align::Center => {
                let left = missing / 2;
                format!("{}{}{}", pad(left), body, pad(missing - left))
            }
        }
    }
}

fn read_number(chars: &[char], start: usize) -> (Option<usize>, usize) {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return (None, start);
    }
    let number: String = chars[start..end].iter().collect();
    (number.parse().ok(), end)
}

fn bad_spec(spec: &str) -> LoggerError {
    LoggerError::formatter_config("format", format!("invalid field spec '{}'", spec))
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field { field: Field, spec: FieldSpec },
}

/// A parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    style: TemplateStyle,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::FormatterConfig`] on unbalanced braces, empty
    /// field names or invalid specs.
    pub fn parse(source: &str, style: TemplateStyle) -> Result<Self> {
        let segments = match style {
            TemplateStyle::Brace => parse_brace(source)?,
            TemplateStyle::Percent => parse_percent(source)?,
            TemplateStyle::Dollar => parse_dollar(source)?,
        };
        Ok(Self {
            source: source.to_string(),
            style,
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn style(&self) -> TemplateStyle {
        self.style
    }

    /// Fields in order of first appearance, without duplicates
    pub fn fields(&self) -> Vec<&Field> {
        let mut seen: Vec<&Field> = Vec::new();
        for segment in &self.segments {
            if let Segment::Field { field, .. } = segment {
                if !seen.contains(&field) {
                    seen.push(field);
                }
            }
        }
        seen
    }

    pub fn uses(&self, wanted: &Field) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field { field, .. } if field == wanted))
    }

    /// Render with a resolver supplying each field's raw value
    pub fn render_with<F>(&self, mut resolve: F) -> String
    where
        F: FnMut(&Field) -> FieldData,
    {
        let mut out = String::with_capacity(self.source.len() + 64);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { field, spec } => {
                    let _ = write!(out, "{}", spec.apply(resolve(field)));
                }
            }
        }
        out
    }
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Literal(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Literal(text.to_string()));
    }
}

fn field_segment(name: &str, spec: FieldSpec, source: &str) -> Result<Segment> {
    if name.is_empty() {
        return Err(LoggerError::formatter_config(
            "format",
            format!("empty field name in '{}'", source),
        ));
    }
    Ok(Segment::Field {
        field: Field::parse(name),
        spec,
    })
}

fn parse_brace(source: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut literal_start = 0;

    while let Some((idx, c)) = chars.next() {
        match c {
            '{' => {
                push_literal(&mut segments, &source[literal_start..idx]);
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    push_literal(&mut segments, "{");
                    literal_start = idx + 2;
                    continue;
                }
                let close = source[idx + 1..].find('}').ok_or_else(|| {
                    LoggerError::formatter_config("format", format!("unclosed '{{' in '{}'", source))
                })?;
                let inner = &source[idx + 1..idx + 1 + close];
                let (name, spec) = match inner.split_once(':') {
                    Some((name, spec)) => (name, FieldSpec::parse_brace(spec)?),
                    None => (inner, FieldSpec::default()),
                };
                // `!r`/`!s` conversions are accepted and ignored
                let name = name.split('!').next().unwrap_or(name);
                segments.push(field_segment(name, spec, source)?);

                let end = idx + 1 + close;
                while matches!(chars.peek(), Some((i, _)) if *i <= end) {
                    chars.next();
                }
                literal_start = end + 1;
            }
            '}' => {
                push_literal(&mut segments, &source[literal_start..idx]);
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    push_literal(&mut segments, "}");
                    literal_start = idx + 2;
                } else {
                    return Err(LoggerError::formatter_config(
                        "format",
                        format!("single '}}' in '{}'", source),
                    ));
                }
            }
            _ => {}
        }
    }
    push_literal(&mut segments, &source[literal_start..]);
    Ok(segments)
}

fn parse_percent(source: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '%' {
            literal.push(c);
            i += 1;
            continue;
        }
        match chars.get(i + 1) {
            Some('%') => {
                literal.push('%');
                i += 2;
            }
            Some('(') => {
                let close = chars[i + 2..]
                    .iter()
                    .position(|c| *c == ')')
                    .map(|p| p + i + 2)
                    .ok_or_else(|| {
                        LoggerError::formatter_config(
                            "format",
                            format!("unclosed '%(' in '{}'", source),
                        )
                    })?;
                let name: String = chars[i + 2..close].iter().collect();

                let mut spec = FieldSpec::default();
                let mut j = close + 1;
                while let Some(flag) = chars.get(j) {
                    match flag {
                        '-' => spec.align = Some(Align::Left),
                        '0' => spec.zero = true,
                        ' ' | '+' | '#' => {}
                        _ => break,
                    }
                    j += 1;
                }
                let (width, next) = read_number(&chars, j);
                spec.width = width;
                j = next;
                if chars.get(j) == Some(&'.') {
                    let (precision, next) = read_number(&chars, j + 1);
                    spec.precision = Some(precision.unwrap_or(0));
                    j = next;
                }
                match chars.get(j) {
                    Some(conv @ ('s' | 'd' | 'i' | 'f' | 'r')) => {
                        spec.kind = Some(if *conv == 'i' { 'd' } else { *conv });
                        j += 1;
                    }
                    _ => {
                        return Err(LoggerError::formatter_config(
                            "format",
                            format!("missing conversion after '%({})' in '{}'", name, source),
                        ))
                    }
                }
                if spec.align == Some(Align::Left) {
                    spec.zero = false;
                }

                push_literal(&mut segments, &literal);
                literal.clear();
                segments.push(field_segment(&name, spec, source)?);
                i = j;
            }
            _ => {
                literal.push('%');
                i += 1;
            }
        }
    }
    push_literal(&mut segments, &literal);
    Ok(segments)
}

fn parse_dollar(source: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '$' {
            literal.push(c);
            i += 1;
            continue;
        }
        let (name, next) = match chars.get(i + 1) {
            Some('$') => {
                literal.push('$');
                i += 2;
                continue;
            }
            Some('{') => {
                let close = chars[i + 2..]
                    .iter()
                    .position(|c| *c == '}')
                    .map(|p| p + i + 2)
                    .ok_or_else(|| {
                        LoggerError::formatter_config(
                            "format",
                            format!("unclosed '${{' in '{}'", source),
                        )
                    })?;
                (chars[i + 2..close].iter().collect::<String>(), close + 1)
            }
            _ => {
                let mut end = i + 1;
                while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                (chars[i + 1..end].iter().collect::<String>(), end)
            }
        };
        push_literal(&mut segments, &literal);
        literal.clear();
        segments.push(field_segment(&name, FieldSpec::default(), source)?);
        i = next;
    }
    push_literal(&mut segments, &literal);
    Ok(segments)
}
