//! Merge engine implementation

use serde_json::{Map, Value};

/// How arrays are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Arrays in `src` replace arrays in `dst`
    Config,
    /// Arrays merge element-wise; the longer side supplies the tail
    Data,
}

/// Merge `src` over `dst` with the configuration policy
pub fn merge_config(dst: &Value, src: &Value) -> Value {
    merge_value(dst, src, MergePolicy::Config)
}

/// Merge `src` over `dst` with the data policy
pub fn merge_data(dst: &Value, src: &Value) -> Value {
    merge_value(dst, src, MergePolicy::Data)
}

/// Fold any number of trees left to right with the configuration policy,
/// seeded with `{}`
pub fn merge_config_all<'a, I>(values: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    fold(values, MergePolicy::Config)
}

/// Fold any number of trees left to right with the data policy,
/// seeded with `{}`
pub fn merge_data_all<'a, I>(values: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    fold(values, MergePolicy::Data)
}

/// Collapse array elements into one representative value
pub fn merge_array(items: &[Value]) -> Value {
    merge_data_all(items)
}

fn fold<'a, I>(values: I, policy: MergePolicy) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .fold(Value::Object(Map::new()), |acc, v| merge_value(&acc, v, policy))
}

fn merge_value(dst: &Value, src: &Value, policy: MergePolicy) -> Value {
    match (dst, src) {
        (Value::Object(d), Value::Object(s)) => {
            let mut merged = d.clone();
            for (key, s_val) in s {
                let next = match merged.get(key) {
                    Some(d_val) => merge_value(d_val, s_val, policy),
                    None => s_val.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (Value::Array(d), Value::Array(s)) if policy == MergePolicy::Data => {
            let len = d.len().max(s.len());
            let merged = (0..len)
                .map(|i| match (d.get(i), s.get(i)) {
                    (Some(d_item), Some(s_item)) => merge_value(d_item, s_item, policy),
                    (Some(item), None) | (None, Some(item)) => item.clone(),
                    (None, None) => Value::Null,
                })
                .collect();
            Value::Array(merged)
        }
        // Scalars, shape changes and config arrays: src wins
        (_, s) => s.clone(),
    }
}

/// Deep structural equality
///
/// Arrays compare element-wise, objects by key set and recursively.
/// Numbers compare by value, so `1` equals `1.0`.
pub fn is_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => x == y || fx == fy,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(i, j)| is_equal(i, j))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| is_equal(v, w)))
        }
        _ => a == b,
    }
}
