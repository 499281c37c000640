//! Query and update evaluation over BSON documents
//!
//! Implements the subset of MongoDB operator semantics the services rely on,
//! so the in-memory store behaves like the real one:
//!
//! - filters: equality (matching array members too), `$eq`, `$ne`, `$gt`,
//!   `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists`, `$and`, `$or`, dotted paths
//!   that descend through arrays of sub-documents
//! - updates: `$set` (with the positional `array.$.field` form), `$push`,
//!   `$addToSet`, `$pull` (by value or sub-document condition), `$inc`,
//!   `$unset`
//! - single or compound key sorting

use std::cmp::Ordering;

use bson::{Bson, Document};

use crate::types::{HubError, Result};

// =============================================================================
// Filters
// =============================================================================

/// Whether `doc` satisfies `filter`
pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, condition)| match key.as_str() {
        "$and" => clauses(condition).iter().all(|clause| matches(doc, clause)),
        "$or" => clauses(condition).iter().any(|clause| matches(doc, clause)),
        path => field_matches(doc, path, condition),
    })
}

fn clauses(condition: &Bson) -> Vec<&Document> {
    match condition {
        Bson::Array(items) => items.iter().filter_map(Bson::as_document).collect(),
        _ => Vec::new(),
    }
}

fn field_matches(doc: &Document, path: &str, condition: &Bson) -> bool {
    let values = resolve(doc, path);

    match condition {
        Bson::Document(ops) if is_operator_doc(ops) => ops
            .iter()
            .all(|(op, operand)| operator_matches(&values, op, operand)),
        _ => equals_any(&values, condition),
    }
}

fn is_operator_doc(doc: &Document) -> bool {
    doc.keys().next().is_some_and(|k| k.starts_with('$'))
}

fn operator_matches(values: &[&Bson], op: &str, operand: &Bson) -> bool {
    match op {
        "$eq" => equals_any(values, operand),
        "$ne" => !equals_any(values, operand),
        "$in" => match operand {
            Bson::Array(options) => options.iter().any(|o| equals_any(values, o)),
            _ => false,
        },
        "$nin" => match operand {
            Bson::Array(options) => !options.iter().any(|o| equals_any(values, o)),
            _ => false,
        },
        "$exists" => {
            let wanted = matches!(operand, Bson::Boolean(true));
            values.is_empty() != wanted
        }
        "$gt" => compares_any(values, operand, |o| o == Ordering::Greater),
        "$gte" => compares_any(values, operand, |o| o != Ordering::Less),
        "$lt" => compares_any(values, operand, |o| o == Ordering::Less),
        "$lte" => compares_any(values, operand, |o| o != Ordering::Greater),
        _ => false,
    }
}

/// Collect the values at a dotted path. Arrays met on the way are
/// traversed element-wise, so `plannerEntries._id` yields every entry id.
fn resolve<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    let mut current: Vec<&Bson> = Vec::new();
    let mut segments = path.split('.');

    let Some(first) = segments.next() else {
        return current;
    };
    if let Some(value) = doc.get(first) {
        current.push(value);
    }

    for segment in segments {
        let mut next = Vec::new();
        for value in current {
            match value {
                Bson::Document(sub) => {
                    if let Some(v) = sub.get(segment) {
                        next.push(v);
                    }
                }
                Bson::Array(items) => {
                    if let Ok(index) = segment.parse::<usize>() {
                        if let Some(v) = items.get(index) {
                            next.push(v);
                        }
                        continue;
                    }
                    for item in items {
                        if let Bson::Document(sub) = item {
                            if let Some(v) = sub.get(segment) {
                                next.push(v);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }

    current
}

fn equals_any(values: &[&Bson], target: &Bson) -> bool {
    if values.is_empty() {
        return matches!(target, Bson::Null);
    }
    values.iter().any(|value| {
        bson_eq(value, target)
            || matches!(value, Bson::Array(items) if items.iter().any(|i| bson_eq(i, target)))
    })
}

fn compares_any<F>(values: &[&Bson], target: &Bson, accept: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    values.iter().any(|value| match value {
        Bson::Array(items) => items
            .iter()
            .any(|i| compare(i, target).is_some_and(&accept)),
        other => compare(other, target).is_some_and(&accept),
    })
}

/// Equality with numeric types compared by value
pub fn bson_eq(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Ordering between two values of the same type class
fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Sort documents by a sort specification such as `{ "eventDate": 1 }`
pub fn sort_documents(docs: &mut [Document], order: &Document) {
    docs.sort_by(|a, b| {
        for (key, direction) in order {
            let descending = as_number(direction).is_some_and(|d| d < 0.0);
            let ordering = sort_key_cmp(resolve(a, key).first(), resolve(b, key).first());
            let ordering = if descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn sort_key_cmp(a: Option<&&Bson>, b: Option<&&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare(x, y).unwrap_or_else(|| type_rank(x).cmp(&type_rank(y))),
    }
}

/// Cross-type ordering, following MongoDB's comparison order
fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::Null => 0,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 1,
        Bson::String(_) => 2,
        Bson::Document(_) => 3,
        Bson::Array(_) => 4,
        Bson::ObjectId(_) => 6,
        Bson::Boolean(_) => 7,
        Bson::DateTime(_) => 8,
        _ => 9,
    }
}

// =============================================================================
// Updates
// =============================================================================

/// Apply an update document in place. `filter` is the query that selected
/// `doc`; it resolves the positional `$` operator.
pub fn apply_update(doc: &mut Document, filter: &Document, update: &Document) -> Result<()> {
    for (op, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(HubError::Internal(format!("{} expects a document", op)));
        };

        for (path, value) in fields {
            let path = resolve_positional(doc, filter, path)?;
            let segments: Vec<&str> = path.split('.').collect();

            match op.as_str() {
                "$set" => set_path(doc, &segments, value.clone())?,
                "$unset" => unset_path(doc, &segments),
                "$inc" => increment(doc, &segments, value)?,
                "$push" => with_array(doc, &segments, true, |items| {
                    items.push(value.clone());
                })?,
                "$addToSet" => with_array(doc, &segments, true, |items| {
                    if !items.iter().any(|i| bson_eq(i, value)) {
                        items.push(value.clone());
                    }
                })?,
                "$pull" => with_array(doc, &segments, false, |items| {
                    items.retain(|item| !pull_matches(item, value));
                })?,
                other => {
                    return Err(HubError::Internal(format!(
                        "Unsupported update operator {}",
                        other
                    )))
                }
            }
        }
    }
    Ok(())
}

/// Replace `array.$.field` with the index of the first array element the
/// filter matched on
fn resolve_positional(doc: &Document, filter: &Document, path: &str) -> Result<String> {
    let Some((array_path, rest)) = path.split_once(".$") else {
        return Ok(path.to_string());
    };

    let prefix = format!("{}.", array_path);
    let mut element_filter = Document::new();
    for (key, condition) in filter {
        if let Some(sub) = key.strip_prefix(&prefix) {
            element_filter.insert(sub, condition.clone());
        }
    }

    let index = resolve(doc, array_path)
        .first()
        .and_then(|value| match value {
            Bson::Array(items) => items.iter().position(|item| match item {
                Bson::Document(sub) => !element_filter.is_empty() && matches(sub, &element_filter),
                scalar => filter.get(array_path).is_some_and(|c| bson_eq(scalar, c)),
            }),
            _ => None,
        })
        .ok_or_else(|| {
            HubError::BadRequest(
                "The positional operator did not find the match needed from the query".into(),
            )
        })?;

    Ok(format!("{}.{}{}", array_path, index, rest))
}

fn pull_matches(item: &Bson, condition: &Bson) -> bool {
    match (item, condition) {
        (Bson::Document(sub), Bson::Document(cond)) if !is_operator_doc(cond) => {
            matches(sub, cond)
        }
        (_, Bson::Document(cond)) if is_operator_doc(cond) => cond
            .iter()
            .all(|(op, operand)| operator_matches(&[item], op, operand)),
        _ => bson_eq(item, condition),
    }
}

fn set_path(doc: &mut Document, segments: &[&str], value: Bson) -> Result<()> {
    let (head, tail) = segments
        .split_first()
        .ok_or_else(|| HubError::Internal("Empty update path".into()))?;

    if tail.is_empty() {
        doc.insert(*head, value);
        return Ok(());
    }

    let child = doc
        .entry(head.to_string())
        .or_insert_with(|| Bson::Document(Document::new()));
    set_in_value(child, tail, value)
}

fn set_in_value(target: &mut Bson, segments: &[&str], value: Bson) -> Result<()> {
    match target {
        Bson::Document(sub) => set_path(sub, segments, value),
        Bson::Array(items) => {
            let (head, tail) = segments
                .split_first()
                .ok_or_else(|| HubError::Internal("Empty update path".into()))?;
            let index: usize = head.parse().map_err(|_| {
                HubError::BadRequest(format!("Cannot address array with '{}'", head))
            })?;
            let element = items
                .get_mut(index)
                .ok_or_else(|| HubError::BadRequest(format!("Array index {} out of range", index)))?;
            if tail.is_empty() {
                *element = value;
                Ok(())
            } else {
                set_in_value(element, tail, value)
            }
        }
        _ => Err(HubError::BadRequest(format!(
            "Cannot create field '{}' in a scalar value",
            segments.join(".")
        ))),
    }
}

fn unset_path(doc: &mut Document, segments: &[&str]) {
    match segments {
        [] => {}
        [last] => {
            doc.remove(*last);
        }
        [head, rest @ ..] => {
            if let Ok(sub) = doc.get_document_mut(*head) {
                unset_path(sub, rest);
            }
        }
    }
}

fn value_at_mut<'a>(doc: &'a mut Document, segments: &[&str]) -> Option<&'a mut Bson> {
    let (head, tail) = segments.split_first()?;
    let mut current = doc.get_mut(*head)?;
    for segment in tail {
        current = match current {
            Bson::Document(sub) => sub.get_mut(*segment)?,
            Bson::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Run `mutate` on the array at `segments`. A missing field becomes an
/// empty array when `create` is set and is left alone otherwise.
fn with_array<F>(doc: &mut Document, segments: &[&str], create: bool, mutate: F) -> Result<()>
where
    F: FnOnce(&mut Vec<Bson>),
{
    if value_at_mut(doc, segments).is_none() {
        if !create {
            return Ok(());
        }
        set_path(doc, segments, Bson::Array(Vec::new()))?;
    }

    match value_at_mut(doc, segments) {
        Some(Bson::Array(items)) => {
            mutate(items);
            Ok(())
        }
        _ => Err(HubError::BadRequest(format!(
            "Field '{}' is not an array",
            segments.join(".")
        ))),
    }
}

fn increment(doc: &mut Document, segments: &[&str], by: &Bson) -> Result<()> {
    let current = value_at_mut(doc, segments).cloned();
    let next = match (current, by) {
        (None, by) => by.clone(),
        (Some(Bson::Int32(a)), Bson::Int32(b)) => Bson::Int32(a + b),
        (Some(Bson::Int64(a)), Bson::Int32(b)) => Bson::Int64(a + i64::from(*b)),
        (Some(Bson::Int32(a)), Bson::Int64(b)) => Bson::Int64(i64::from(a) + b),
        (Some(Bson::Int64(a)), Bson::Int64(b)) => Bson::Int64(a + b),
        (Some(a), b) => match (as_number(&a), as_number(b)) {
            (Some(x), Some(y)) => Bson::Double(x + y),
            _ => {
                return Err(HubError::BadRequest(format!(
                    "Cannot increment non-numeric field '{}'",
                    segments.join(".")
                )))
            }
        },
    };
    set_path(doc, segments, next)
}
