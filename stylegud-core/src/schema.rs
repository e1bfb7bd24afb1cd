//! Required-field schema every normalized record must satisfy before it may be accumulated.

use std::fmt;

use serde_json::Value;

use crate::entry::RawRecord;

/// JSON kind a required field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Array,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Array => value.is_array(),
        }
    }
}

/// Fields required on every entry, checked in this order.
pub const REQUIRED_FIELDS: &[(&str, FieldKind)] = &[
    ("header", FieldKind::String),
    ("description", FieldKind::String),
    ("reference", FieldKind::String),
    ("markup", FieldKind::String),
    ("modifiers", FieldKind::Array),
];

/// Why a field failed the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    Missing,
    WrongType(FieldKind),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing => f.write_str("Missing"),
            Problem::WrongType(FieldKind::String) => f.write_str("Expected a string for"),
            Problem::WrongType(FieldKind::Array) => f.write_str("Expected an array for"),
        }
    }
}

/// The first field of a batch that failed the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// Position of the offending record in the batch.
    pub index: usize,
    pub field: &'static str,
    pub problem: Problem,
}

/// Schema-conformance check over a fixed field table.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [(&'static str, FieldKind)],
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(REQUIRED_FIELDS)
    }
}

impl Schema {
    pub const fn new(fields: &'static [(&'static str, FieldKind)]) -> Self {
        Self { fields }
    }

    /// Checks a single record, returning the first offending field.
    pub fn check_record(&self, record: &RawRecord) -> Option<(&'static str, Problem)> {
        self.fields.iter().find_map(|&(name, kind)| match record.get(name) {
            None => Some((name, Problem::Missing)),
            Some(value) if !kind.accepts(value) => Some((name, Problem::WrongType(kind))),
            Some(_) => None,
        })
    }

    /// Checks a batch; stops at the first violation of the first offending record.
    pub fn check_batch(&self, batch: &[RawRecord]) -> Result<(), Violation> {
        for (index, record) in batch.iter().enumerate() {
            if let Some((field, problem)) = self.check_record(record) {
                return Err(Violation {
                    index,
                    field,
                    problem,
                });
            }
        }
        Ok(())
    }
}
