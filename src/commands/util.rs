use nu_protocol::{PipelineData, Record, Span, Value};

use crate::algo::keyphrase::Keyphrase;

/// Normalize any PipelineData into a Vec<Value> of records.
///
/// Handles:
///   - Table (list of records) → pass through
///   - Single record → [record]
///   - List of strings → [{content: s1}, {content: s2}, ...]
///   - Single string → [{content: s}]
///   - List of non-records → [{value: v1}, {value: v2}, ...]
///   - Empty/Nothing → []
pub fn normalize_input(input: PipelineData, span: Span) -> Vec<Value> {
    match input {
        PipelineData::Value(value, _) => normalize_value(value, span),
        other => {
            let values: Vec<Value> = other.into_iter().collect();
            if matches!(values.first(), Some(Value::Record { .. })) {
                values
            } else {
                values.into_iter().map(|v| wrap_value(v, span)).collect()
            }
        }
    }
}

fn normalize_value(value: Value, span: Span) -> Vec<Value> {
    match value {
        Value::List { vals, .. } => {
            if matches!(vals.first(), Some(Value::Record { .. })) {
                vals
            } else {
                vals.into_iter().map(|v| wrap_value(v, span)).collect()
            }
        }
        Value::Record { .. } => vec![value],
        Value::Nothing { .. } => vec![],
        other => vec![wrap_value(other, span)],
    }
}

/// Wrap a non-record value into a record.
/// Strings get `{content: s}`, everything else gets `{value: v}`.
fn wrap_value(v: Value, span: Span) -> Value {
    let mut record = Record::new();
    match &v {
        Value::String { .. } => record.push("content", v),
        _ => record.push("value", v),
    }
    Value::record(record, span)
}

/// Text of a record field, "" when missing or not coercible.
pub fn row_text(row: &Value, field: &str) -> String {
    row.get_data_by_key(field)
        .and_then(|v| v.coerce_string().ok())
        .unwrap_or_default()
}

/// Append one column to a record Value. Non-records get wrapped first.
pub fn append_column(row: Value, col_name: &str, col_value: Value, span: Span) -> Value {
    match row {
        Value::Record { val, .. } => {
            let mut record = val.into_owned();
            record.push(col_name, col_value);
            Value::record(record, span)
        }
        other => {
            let mut record = Record::new();
            record.push("value", other);
            record.push(col_name, col_value);
            Value::record(record, span)
        }
    }
}

/// A list of `{value, weight}` records.
pub fn keyphrase_list(keyphrases: &[Keyphrase], span: Span) -> Value {
    let items = keyphrases
        .iter()
        .map(|k| {
            let mut record = Record::new();
            record.push("value", Value::string(&k.value, span));
            record.push("weight", Value::float(k.weight, span));
            Value::record(record, span)
        })
        .collect();
    Value::list(items, span)
}

/// Read an optional non-negative integer flag.
pub fn usize_flag(
    call: &nu_plugin::EvaluatedCall,
    name: &str,
) -> Result<Option<usize>, nu_protocol::LabeledError> {
    match call.get_flag::<i64>(name)? {
        Some(n) if n < 0 => Err(nu_protocol::LabeledError::new(format!(
            "--{name} must not be negative"
        ))
        .with_label("negative value", call.head)),
        Some(n) => Ok(Some(n as usize)),
        None => Ok(None),
    }
}
