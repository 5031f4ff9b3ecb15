//! Evaluation of `_find` selectors and sort specifications over JSON documents.
//!
//! Values compare in CouchDB collation order:
//! null < false < true < numbers < strings < arrays < objects.

use cloudant_core::SortDirection;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Look up a possibly dotted field path (`owner.name`)
pub fn field<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Total order over JSON values
pub fn collate(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = collate(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk).then_with(|| collate(lv, rv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn is_operator_object(criteria: &Map<String, Value>) -> bool {
    !criteria.is_empty() && criteria.keys().all(|k| k.starts_with('$'))
}

fn equal(a: &Value, b: &Value) -> bool {
    collate(a, b) == Ordering::Equal
}

/// Apply one operator to the (possibly missing) field value.
/// Unknown operators never match.
fn apply_operator(op: &str, operand: &Value, value: Option<&Value>) -> bool {
    match op {
        "$exists" => operand.as_bool().unwrap_or(false) == value.is_some(),
        "$ne" => value.map_or(true, |v| !equal(v, operand)),
        "$nin" => match (value, operand.as_array()) {
            (Some(v), Some(list)) => !list.iter().any(|item| equal(v, item)),
            (None, Some(_)) => true,
            _ => false,
        },
        _ => {
            let Some(v) = value else {
                return false;
            };
            match op {
                "$eq" => equal(v, operand),
                "$gt" => collate(v, operand) == Ordering::Greater,
                "$gte" => collate(v, operand) != Ordering::Less,
                "$lt" => collate(v, operand) == Ordering::Less,
                "$lte" => collate(v, operand) != Ordering::Greater,
                "$in" => operand
                    .as_array()
                    .is_some_and(|list| list.iter().any(|item| equal(v, item))),
                _ => false,
            }
        }
    }
}

fn matches_criteria(criteria: &Value, value: Option<&Value>) -> bool {
    match criteria {
        Value::Object(ops) if is_operator_object(ops) => ops
            .iter()
            .all(|(op, operand)| apply_operator(op, operand, value)),
        literal => value.is_some_and(|v| equal(v, literal)),
    }
}

/// True if `doc` satisfies every clause of `selector`
pub fn matches(selector: &Map<String, Value>, doc: &Map<String, Value>) -> bool {
    selector.iter().all(|(key, criteria)| match key.as_str() {
        "$and" => criteria.as_array().is_some_and(|clauses| {
            clauses
                .iter()
                .all(|c| c.as_object().is_some_and(|s| matches(s, doc)))
        }),
        "$or" => criteria.as_array().is_some_and(|clauses| {
            clauses
                .iter()
                .any(|c| c.as_object().is_some_and(|s| matches(s, doc)))
        }),
        path => matches_criteria(criteria, field(doc, path)),
    })
}

/// Order two documents by a sequence of `(field, direction)` pairs.
/// Missing fields sort first.
pub fn compare_by(
    sort: &[(&str, SortDirection)],
    a: &Map<String, Value>,
    b: &Map<String, Value>,
) -> Ordering {
    for (path, direction) in sort {
        let ord = match (field(a, path), field(b, path)) {
            (Some(x), Some(y)) => collate(x, y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ord = match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
