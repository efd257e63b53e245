//! # Query Descriptions
//!
//! Structured predicates, projections, sort specs and update maps passed
//! from the request translator to a store.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Field names a store recognizes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: BTreeSet<String>,
}

impl FieldSet {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

/// Field -> accepted literals predicate
///
/// Values within a field are OR-ed, fields are AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternFilter {
    fields: BTreeMap<String, Vec<String>>,
}

impl PatternFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append accepted literals for a field
    pub fn extend(&mut self, field: impl Into<String>, values: impl IntoIterator<Item = String>) {
        self.fields.entry(field.into()).or_default().extend(values);
    }

    /// Builder-style variant of [`PatternFilter::extend`]
    pub fn with<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extend(field, values.into_iter().map(Into::into));
        self
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Check if a document matches every field of this filter
    pub fn matches(&self, doc: &Value) -> bool {
        self.fields.iter().all(|(field, accepted)| {
            match doc.get(field) {
                Some(value) => accepted.iter().any(|literal| literal_matches(value, literal)),
                None => false,
            }
        })
    }
}

/// Numbers match numerically (`30` matches `30.0`), everything else by text
fn literal_matches(value: &Value, literal: &str) -> bool {
    if let Value::Number(n) = value {
        if let (Some(stored), Ok(wanted)) = (n.as_i64(), literal.parse::<i64>()) {
            return stored == wanted;
        }
        if let (Some(stored), Ok(wanted)) = (n.as_f64(), literal.parse::<f64>()) {
            return stored == wanted;
        }
    }
    literal_text(value).is_some_and(|text| text == literal)
}

/// Textual form of a scalar JSON value, as it would appear in a query string
fn literal_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null => Some(Cow::Borrowed("null")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Ordered list of fields to include in output
///
/// Empty means the full entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Keep only projected fields of an object document
    pub fn apply(&self, doc: Value) -> Value {
        if self.is_empty() {
            return doc;
        }
        match doc {
            Value::Object(mut obj) => {
                let mut projected = Map::new();
                for field in &self.fields {
                    if let Some(v) = obj.remove(field) {
                        projected.insert(field.clone(), v);
                    }
                }
                Value::Object(projected)
            }
            other => other,
        }
    }
}

/// One sort directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    pub field: String,
    pub descending: bool,
}

/// Per-field sort directions, in declared precedence order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    fields: Vec<SortField>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directive; a repeated field keeps its position and takes the new direction
    pub fn push(&mut self, field: impl Into<String>, descending: bool) {
        let field = field.into();
        match self.fields.iter_mut().find(|s| s.field == field) {
            Some(existing) => existing.descending = descending,
            None => self.fields.push(SortField { field, descending }),
        }
    }

    pub fn with(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.push(field, descending);
        self
    }

    /// Descending flag for a field, if it is sorted on
    pub fn is_descending(&self, field: &str) -> Option<bool> {
        self.fields
            .iter()
            .find(|s| s.field == field)
            .map(|s| s.descending)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortField> {
        self.fields.iter()
    }

    /// Compare two documents by every directive in order
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for sort in &self.fields {
            let cmp = compare_json_values(a.get(&sort.field), b.get(&sort.field));
            let cmp = if sort.descending { cmp.reverse() } else { cmp };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    }
}

/// Compare JSON values for sorting; missing values sort last
///
/// Values of different types order by type first:
/// null < bool < number < string < array < object.
fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| compare_same_type(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_same_type(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => a.len().cmp(&b.len()),
        (Value::Object(a), Value::Object(b)) => a.len().cmp(&b.len()),
        _ => Ordering::Equal,
    }
}

/// Exact numeric comparison across integer and float representations
fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (integer_value(a), integer_value(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(a), None) => compare_int_float(a, float_value(b)),
        (None, Some(b)) => compare_int_float(b, float_value(a)).reverse(),
        (None, None) => float_value(a)
            .partial_cmp(&float_value(b))
            .unwrap_or(Ordering::Equal),
    }
}

fn integer_value(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn float_value(n: &Number) -> f64 {
    n.as_f64().unwrap_or(0.0)
}

fn compare_int_float(int: i128, float: f64) -> Ordering {
    // Every JSON integer lies within +-2^64
    const BOUND: f64 = 18_446_744_073_709_551_616.0;
    if float >= BOUND {
        return Ordering::Less;
    }
    if float <= -BOUND {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)).unwrap_or(Ordering::Equal),
        unequal => unequal,
    }
}

/// Field -> raw literal assignments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateMap {
    fields: BTreeMap<String, String>,
}

impl UpdateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field; a repeated field keeps the last value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Pagination window; unset bounds are unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub max: Option<u64>,
    pub offset: Option<u64>,
}

impl Page {
    pub fn new(max: Option<u64>, offset: Option<u64>) -> Self {
        Self { max, offset }
    }

    /// Skip `offset` items, then take at most `max`
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = self.offset.map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX));
        let take = self.max.map_or(usize::MAX, |m| usize::try_from(m).unwrap_or(usize::MAX));
        items.into_iter().skip(skip).take(take).collect()
    }
}
