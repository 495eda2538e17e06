// ABOUTME: Conversion between MySQL driver values and document cell values
// ABOUTME: Keeps dates, times and binary data typed so re-imports bind the same values

use crate::document::{CellValue, DateTime, Record, Time};
use mysql_async::{Row, Value};

/// Convert a driver value read from a result set.
///
/// - Integers keep their signedness
/// - FLOAT is widened through its decimal text so `1.1` stays `1.1`
/// - Byte strings become text when valid UTF-8, binary otherwise
///   (DECIMAL arrives as text and keeps its precision)
/// - DATE/DATETIME/TIMESTAMP and TIME become typed values
pub fn value_to_cell(value: Value) -> CellValue {
    match value {
        Value::NULL => CellValue::Null,
        Value::Int(i) => CellValue::Int(i),
        Value::UInt(u) => CellValue::UInt(u),
        Value::Float(f) => CellValue::Float(f.to_string().parse().unwrap_or(f64::from(f))),
        Value::Double(d) => CellValue::Float(d),
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => CellValue::Text(text),
            Err(e) => CellValue::Bytes(e.into_bytes()),
        },
        Value::Date(year, month, day, hour, minute, second, micros) => {
            CellValue::DateTime(DateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
                micros,
            })
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => CellValue::Time(Time {
            negative,
            days,
            hours,
            minutes,
            seconds,
            micros,
        }),
    }
}

/// Convert a cell into a bind parameter.
pub fn cell_to_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Null => Value::NULL,
        CellValue::Bool(b) => Value::Int(i64::from(*b)),
        CellValue::Int(i) => Value::Int(*i),
        CellValue::UInt(u) => Value::UInt(*u),
        CellValue::Float(f) => Value::Double(*f),
        CellValue::Text(s) => Value::Bytes(s.clone().into_bytes()),
        CellValue::Bytes(b) => Value::Bytes(b.clone()),
        CellValue::DateTime(dt) => Value::Date(
            dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second, dt.micros,
        ),
        CellValue::Time(t) => {
            Value::Time(t.negative, t.days, t.hours, t.minutes, t.seconds, t.micros)
        }
        CellValue::Json(v) => Value::Bytes(v.to_string().into_bytes()),
    }
}

/// Convert a result row into a record keyed by the result set's column names.
pub fn row_to_record(mut row: Row) -> Record {
    let names: Vec<String> = row
        .columns_ref()
        .iter()
        .map(|column| column.name_str().into_owned())
        .collect();

    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let value = row.take::<Value, _>(idx).unwrap_or(Value::NULL);
            (name, value_to_cell(value))
        })
        .collect()
}
