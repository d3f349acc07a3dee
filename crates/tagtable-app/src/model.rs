// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

pub const SORT_KEY_NAME: &str = "name";
pub const SORT_KEY_COUNT: &str = "count";
pub const DEFAULT_SORT_KEY: &str = SORT_KEY_COUNT;

/// One tag row. `name` is the identity key; fields the endpoint sends
/// beyond `name` and `count` ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub count: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tag {
    pub fn new(name: impl Into<String>, count: i64) -> Self {
        Self {
            name: name.into(),
            count,
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Looks up a sortable attribute by field name. Nulls, arrays and
    /// objects are not sortable and read as absent.
    pub fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            SORT_KEY_NAME => Some(FieldValue::Text(&self.name)),
            SORT_KEY_COUNT => Some(FieldValue::Integer(self.count)),
            _ => match self.extra.get(key)? {
                Value::String(value) => Some(FieldValue::Text(value)),
                Value::Bool(value) => Some(FieldValue::Bool(*value)),
                Value::Number(value) => Some(FieldValue::from_number(value)),
                Value::Null | Value::Array(_) | Value::Object(_) => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(&'a str),
}

impl FieldValue<'_> {
    fn from_number(value: &Number) -> Self {
        match value.as_i64() {
            Some(integer) => Self::Integer(integer),
            None => Self::Float(value.as_f64().unwrap_or(f64::NAN)),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) | Self::Float(_) => 0,
            Self::Bool(_) => 1,
            Self::Text(_) => 2,
        }
    }

    /// Total order: numbers, then booleans, then text. Values of the same
    /// kind compare naturally; integers and floats compare numerically.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(left), Self::Integer(right)) => left.cmp(right),
            (Self::Integer(left), Self::Float(right)) => (*left as f64).total_cmp(right),
            (Self::Float(left), Self::Integer(right)) => left.total_cmp(&(*right as f64)),
            (Self::Float(left), Self::Float(right)) => left.total_cmp(right),
            (Self::Bool(left), Self::Bool(right)) => left.cmp(right),
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Orients an ascending comparison. `Equal` stays `Equal` either way.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PageSize {
    #[default]
    Five,
    Ten,
    TwentyFive,
}

impl PageSize {
    pub const ALL: [Self; 3] = [Self::Five, Self::Ten, Self::TwentyFive];

    pub const fn rows(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::TwentyFive => 25,
        }
    }

    pub fn from_rows(rows: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.rows() == rows)
    }

    /// Closest allowed size; ties resolve to the smaller one.
    pub fn nearest(rows: usize) -> Self {
        let mut best = Self::Five;
        for size in Self::ALL {
            if size.rows().abs_diff(rows) < best.rows().abs_diff(rows) {
                best = size;
            }
        }
        best
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Five => Self::Ten,
            Self::Ten => Self::TwentyFive,
            Self::TwentyFive => Self::Five,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dataset {
    #[default]
    Pending,
    Loaded(Vec<Tag>),
}

impl Dataset {
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Rows of a loaded dataset; empty while pending.
    pub fn rows(&self) -> &[Tag] {
        match self {
            Self::Pending => &[],
            Self::Loaded(rows) => rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rows().iter().any(|row| row.name == name)
    }
}
