use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Number, Value};
use tiberius::{numeric::Numeric, ColumnData, FromSql, Row};

use crate::models::Record;

pub(crate) fn row_to_record(row: Row) -> Record {
    let names: Vec<String> = row
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    names
        .into_iter()
        .zip(row.into_iter().map(|data| column_to_json(&data)))
        .collect()
}

pub(crate) fn column_to_json(data: &ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::F32(v) => float(v.map(f64::from)),
        ColumnData::F64(v) => float(*v),
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .as_ref()
            .map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Guid(v) => v
            .map(|g| Value::String(g.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => float(v.as_ref().map(numeric_to_f64)),
        ColumnData::Binary(v) => v
            .as_ref()
            .map(|b| Value::from(b.to_vec()))
            .unwrap_or(Value::Null),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            temporal::<NaiveDateTime>(data, |dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        }
        ColumnData::Date(_) => temporal::<NaiveDate>(data, |d| d.format("%Y-%m-%d").to_string()),
        ColumnData::Time(_) => temporal::<NaiveTime>(data, |t| t.format("%H:%M:%S%.3f").to_string()),
        ColumnData::DateTimeOffset(_) => {
            temporal::<DateTime<FixedOffset>>(data, |dt| dt.to_rfc3339())
        }
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|x| Value::String(x.clone().into_owned().into_string()))
            .unwrap_or(Value::Null),
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

fn float(v: Option<f64>) -> Value {
    v.and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn numeric_to_f64(n: &Numeric) -> f64 {
    n.value() as f64 / 10f64.powi(i32::from(n.scale()))
}

fn temporal<'a, T>(data: &'a ColumnData<'static>, render: impl Fn(T) -> String) -> Value
where
    T: FromSql<'a>,
{
    match T::from_sql(data) {
        Ok(Some(value)) => Value::String(render(value)),
        Ok(None) => Value::Null,
        Err(e) => {
            tracing::warn!(error = %e, "Could not decode temporal column");
            Value::Null
        }
    }
}
