//! Data context handed to templates.
//!
//! A context is a JSON object whose keys become template variables. Before rendering,
//! ISO-8601 date strings can be pre-formatted for display (templates have no portable
//! date filter across dialects), and the generation time can be stamped in.

use crate::error::ContextError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::{Map, Value};
use std::fmt::{Display, Write};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Display format applied to dates, e.g. `Sep 18, 2025, 19:29 PM`.
pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y, %H:%M %p";

/// Key under which the generation timestamp is stored by default.
pub const DEFAULT_GENERATED_KEY: &str = "generated_date";

/// Prefix added to a date field's name to form its formatted sibling.
pub const FORMATTED_PREFIX: &str = "formatted_";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    root: Map<String, Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self, ContextError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ContextError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ContextError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContextError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ContextError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = text.len(), "loaded context");
        Self::from_json_str(&text)
    }

    /// Look up a value by dotted path (`policy_report.date`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.root.insert(key.into(), value.into());
    }

    /// For every dotted path that holds a string, store a display-formatted copy in a
    /// sibling key named `formatted_<leaf>`.
    ///
    /// Missing paths and non-string values are skipped. A string that is not a
    /// recognizable ISO-8601 date is copied through unchanged. Returns the number of
    /// sibling keys written.
    pub fn format_date_fields<S: AsRef<str>>(
        &mut self,
        fields: &[S],
        format: &str,
    ) -> Result<usize, ContextError> {
        validate_date_format(format)?;

        let mut written = 0;
        for field in fields {
            let field = field.as_ref();
            let segments: Vec<&str> = field.split('.').collect();
            let Some((leaf, parents)) = segments.split_last() else {
                continue;
            };
            let Some(parent) = object_at_mut(&mut self.root, parents) else {
                continue;
            };
            let Some(raw) = parent.get(*leaf).and_then(Value::as_str) else {
                continue;
            };

            let formatted = match format_iso_date(raw, format) {
                Some(formatted) => formatted,
                None => {
                    warn!(field, value = raw, "not an ISO-8601 date; keeping raw text");
                    raw.to_string()
                }
            };
            parent.insert(format!("{FORMATTED_PREFIX}{leaf}"), Value::String(formatted));
            written += 1;
        }
        Ok(written)
    }

    /// Store `now`, formatted for display, under `key`.
    pub fn stamp_generated<Tz>(
        &mut self,
        key: &str,
        now: &DateTime<Tz>,
        format: &str,
    ) -> Result<(), ContextError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        validate_date_format(format)?;
        let mut stamp = String::new();
        write!(stamp, "{}", now.format(format))
            .map_err(|_| ContextError::InvalidDateFormat(format.to_string()))?;
        self.insert(key, stamp);
        Ok(())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }
}

fn object_at_mut<'a>(
    root: &'a mut Map<String, Value>,
    segments: &[&str],
) -> Option<&'a mut Map<String, Value>> {
    let mut current = root;
    for segment in segments {
        current = current.get_mut(*segment)?.as_object_mut()?;
    }
    Some(current)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Reject strftime strings chrono cannot render.
pub fn validate_date_format(format: &str) -> Result<(), ContextError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ContextError::InvalidDateFormat(format.to_string()));
    }
    Ok(())
}

/// Parse an ISO-8601 date or datetime and render it with `format`.
///
/// Accepts RFC 3339 timestamps (a trailing `Z` means UTC), naive datetimes with a `T`
/// or space separator, and plain dates (treated as midnight). Offsets are kept as
/// given rather than converted to local time.
pub fn format_iso_date(raw: &str, format: &str) -> Option<String> {
    let raw = raw.trim();
    let mut out = String::new();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        write!(out, "{}", dt.format(format)).ok()?;
        return Some(out);
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for candidate in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, candidate) {
            write!(out, "{}", dt.format(format)).ok()?;
            return Some(out);
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    write!(out, "{}", date.and_hms_opt(0, 0, 0)?.format(format)).ok()?;
    Some(out)
}
