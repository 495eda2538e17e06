// ABOUTME: Export document model shared by the exporter and importer
// ABOUTME: Typed cell values, ordered records, and JSON read/validate/write

use crate::error::{CliError, CliResult};
use base64::Engine;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::fs;
use std::path::Path;

const TYPE_TAG: &str = "_type";
const VALUE_TAG: &str = "value";

/// Calendar date with time of day, as stored by DATE/DATETIME/TIMESTAMP columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub micros: u32,
}

/// Signed duration as stored by TIME columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub negative: bool,
    pub days: u32,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub micros: u32,
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.micros > 0 {
            write!(f, ".{:06}", self.micros)?;
        }
        Ok(())
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_hours = u64::from(self.days) * 24 + u64::from(self.hours);
        write!(
            f,
            "{}{:02}:{:02}:{:02}",
            if self.negative { "-" } else { "" },
            total_hours,
            self.minutes,
            self.seconds
        )?;
        if self.micros > 0 {
            write!(f, ".{:06}", self.micros)?;
        }
        Ok(())
    }
}

/// Splits "SS.ffffff" into seconds and microseconds, padding the fraction.
fn parse_seconds(text: &str) -> Option<(u8, u32)> {
    match text.split_once('.') {
        None => Some((text.parse().ok()?, 0)),
        Some((secs, frac)) => {
            if frac.is_empty() || frac.len() > 6 || !frac.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let padded = format!("{:0<6}", frac);
            Some((secs.parse().ok()?, padded.parse().ok()?))
        }
    }
}

impl DateTime {
    /// Parses `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[.ffffff]` or the same with a `T` separator.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_end_matches('Z');
        let (date, time) = match text.split_once(|c: char| c == ' ' || c == 'T') {
            Some((date, time)) => (date, Some(time)),
            None => (text, None),
        };

        let mut date_parts = date.splitn(3, '-');
        let year = date_parts.next()?.parse().ok()?;
        let month = date_parts.next()?.parse().ok()?;
        let day = date_parts.next()?.parse().ok()?;

        let (hour, minute, second, micros) = match time {
            None => (0, 0, 0, 0),
            Some(time) => {
                let mut time_parts = time.splitn(3, ':');
                let hour = time_parts.next()?.parse().ok()?;
                let minute = time_parts.next()?.parse().ok()?;
                let (second, micros) = parse_seconds(time_parts.next()?)?;
                (hour, minute, second, micros)
            }
        };

        if month > 12 || day > 31 || hour > 23 || minute > 59 || second > 59 {
            return None;
        }

        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            micros,
        })
    }
}

impl Time {
    /// Parses `[-]H+:MM:SS[.ffffff]`.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut parts = rest.splitn(3, ':');
        let total_hours: u64 = parts.next()?.parse().ok()?;
        let minutes: u8 = parts.next()?.parse().ok()?;
        let (seconds, micros) = parse_seconds(parts.next()?)?;

        if minutes > 59 || seconds > 59 {
            return None;
        }

        Some(Self {
            negative,
            days: u32::try_from(total_hours / 24).ok()?,
            hours: (total_hours % 24) as u8,
            minutes,
            seconds,
            micros,
        })
    }
}

/// One column value of a row.
///
/// Scalars map to their natural JSON form. Values JSON cannot carry
/// faithfully (binary, dates, times) are written as `{"_type": ..., "value": ...}`
/// objects so they bind back to the same driver type on import.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(DateTime),
    Time(Time),
    /// Untagged nested object or array, e.g. from a hand-written file.
    Json(JsonValue),
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_unit(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::UInt(u) => serializer.serialize_u64(*u),
            CellValue::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            // Non-finite floats as strings
            CellValue::Float(f) => serializer.serialize_str(&f.to_string()),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Bytes(b) => tagged(
                serializer,
                "binary",
                &base64::engine::general_purpose::STANDARD.encode(b),
            ),
            CellValue::DateTime(dt) => tagged(serializer, "datetime", &dt.to_string()),
            CellValue::Time(t) => tagged(serializer, "time", &t.to_string()),
            CellValue::Json(v) => v.serialize(serializer),
        }
    }
}

fn tagged<S: Serializer>(serializer: S, kind: &str, value: &str) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry(TYPE_TAG, kind)?;
    map.serialize_entry(VALUE_TAG, value)?;
    map.end()
}

impl TryFrom<JsonValue> for CellValue {
    type Error = String;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Ok(match value {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    CellValue::UInt(u)
                } else {
                    CellValue::Float(
                        n.as_f64()
                            .ok_or_else(|| format!("unsupported number {}", n))?,
                    )
                }
            }
            JsonValue::String(s) => CellValue::Text(s),
            JsonValue::Object(map) => match tag_of(&map) {
                Some((kind, text)) => decode_tagged(kind, text)?,
                None => CellValue::Json(JsonValue::Object(map)),
            },
            array @ JsonValue::Array(_) => CellValue::Json(array),
        })
    }
}

/// Returns `(kind, value)` when `map` is exactly a tagged value object.
fn tag_of(map: &Map<String, JsonValue>) -> Option<(&str, &str)> {
    if map.len() != 2 {
        return None;
    }
    let kind = map.get(TYPE_TAG)?.as_str()?;
    let text = map.get(VALUE_TAG)?.as_str()?;
    Some((kind, text))
}

fn decode_tagged(kind: &str, text: &str) -> Result<CellValue, String> {
    match kind {
        "binary" => base64::engine::general_purpose::STANDARD
            .decode(text)
            .map(CellValue::Bytes)
            .map_err(|e| format!("invalid base64 in binary value: {}", e)),
        "datetime" => DateTime::parse(text)
            .map(CellValue::DateTime)
            .ok_or_else(|| format!("invalid datetime '{}'", text)),
        "time" => Time::parse(text)
            .map(CellValue::Time)
            .ok_or_else(|| format!("invalid time '{}'", text)),
        other => Err(format!("unknown value type '{}'", other)),
    }
}

/// One row: column names paired with values, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: CellValue) {
        self.fields.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl TryFrom<Map<String, JsonValue>> for Record {
    type Error = String;

    fn try_from(map: Map<String, JsonValue>) -> Result<Self, Self::Error> {
        let mut record = Record::new();
        for (name, value) in map {
            let cell = CellValue::try_from(value)
                .map_err(|e| format!("column '{}': {}", name, e))?;
            record.push(name, cell);
        }
        Ok(record)
    }
}

/// A table's rows paired with the table name.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub table_name: String,
    pub data: Vec<Record>,
}

impl Serialize for ExportDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut doc = serializer.serialize_struct("ExportDocument", 2)?;
        doc.serialize_field("tableName", &self.table_name)?;
        doc.serialize_field("data", &self.data)?;
        doc.end()
    }
}

impl ExportDocument {
    /// Validate a parsed JSON value as an import document.
    ///
    /// `data` must be present, be an array, and hold at least one object.
    /// `tableName` is optional; when absent it reads back as an empty string.
    pub fn from_json(value: JsonValue) -> CliResult<Self> {
        let JsonValue::Object(mut root) = value else {
            return Err(CliError::InvalidFormat(
                "document must be a JSON object".to_string(),
            ));
        };

        let table_name = match root.remove("tableName") {
            None | Some(JsonValue::Null) => String::new(),
            Some(JsonValue::String(name)) => name,
            Some(_) => {
                return Err(CliError::InvalidFormat(
                    "`tableName` must be a string".to_string(),
                ))
            }
        };

        let rows = match root.remove("data") {
            None => {
                return Err(CliError::InvalidFormat(
                    "document has no `data` field".to_string(),
                ))
            }
            Some(JsonValue::Array(rows)) => rows,
            Some(_) => {
                return Err(CliError::InvalidFormat(
                    "`data` must be an array".to_string(),
                ))
            }
        };

        if rows.is_empty() {
            return Err(CliError::InvalidFormat("`data` is empty".to_string()));
        }

        let mut data = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            let JsonValue::Object(map) = row else {
                return Err(CliError::InvalidFormat(format!(
                    "record {} is not an object",
                    idx + 1
                )));
            };
            let record = Record::try_from(map)
                .map_err(|e| CliError::InvalidFormat(format!("record {}: {}", idx + 1, e)))?;
            data.push(record);
        }

        Ok(Self { table_name, data })
    }

    /// Read and validate an import document from disk.
    pub fn read(path: &Path) -> CliResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| CliError::filesystem(path, e))?;
        let value: JsonValue = serde_json::from_str(&raw).map_err(|e| {
            CliError::InvalidFormat(format!("{} is not valid JSON: {}", path.display(), e))
        })?;
        Self::from_json(value)
    }
}
