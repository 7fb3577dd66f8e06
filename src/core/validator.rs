//! Table-driven record validation.
//!
//! Each record type declares its rules once through [`Constrained::RULES`];
//! [`is_valid`] checks any such record the same way, whichever pipeline calls it.

use crate::domain::dto::EnumValue;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;

/// A field as seen by the validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Missing,
    Text(&'a str),
    Integer(i64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Variant(&'a EnumValue),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Present, and for text not blank.
    Required,
    /// Character count within `[min, max]`. Only applies to text.
    Length { min: usize, max: usize },
    /// Inclusive numeric range. Applies to integers and decimals.
    Range { min: Decimal, max: Decimal },
    /// Enumerated membership: a name from the list, or a numeric code
    /// equal to a position in it.
    OneOf(&'static [&'static str]),
}

impl Constraint {
    /// Constraints other than `Required` pass on a missing value.
    pub fn check(&self, value: &FieldValue<'_>) -> bool {
        match (self, value) {
            (Constraint::Required, FieldValue::Missing) => false,
            (Constraint::Required, FieldValue::Text(s)) => !s.trim().is_empty(),
            (Constraint::Required, _) => true,

            (Constraint::Length { min, max }, FieldValue::Text(s)) => {
                let len = s.chars().count();
                len >= *min && len <= *max
            }

            (Constraint::Range { min, max }, FieldValue::Integer(n)) => {
                let n = Decimal::from(*n);
                n >= *min && n <= *max
            }
            (Constraint::Range { min, max }, FieldValue::Decimal(d)) => d >= min && d <= max,

            (Constraint::OneOf(names), FieldValue::Text(s)) => names.iter().any(|n| n == s),
            (Constraint::OneOf(names), FieldValue::Variant(EnumValue::Name(s))) => {
                names.iter().any(|n| n == s)
            }
            (Constraint::OneOf(names), FieldValue::Variant(EnumValue::Code(code))) => {
                usize::try_from(*code).is_ok_and(|i| i < names.len())
            }
            (Constraint::OneOf(names), FieldValue::Integer(code)) => {
                usize::try_from(*code).is_ok_and(|i| i < names.len())
            }

            _ => true,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => write!(f, "required"),
            Constraint::Length { min, max } => write!(f, "length in [{}, {}]", min, max),
            Constraint::Range { min, max } => write!(f, "value in [{}, {}]", min, max),
            Constraint::OneOf(names) => write!(f, "one of {}", names.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub constraints: &'static [Constraint],
}

impl FieldRule {
    pub const fn new(field: &'static str, constraints: &'static [Constraint]) -> Self {
        Self { field, constraints }
    }
}

/// A record type with a declared constraint table.
pub trait Constrained {
    const RULES: &'static [FieldRule];

    fn field(&self, name: &str) -> FieldValue<'_>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: &'static str,
    pub constraint: Constraint,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

pub fn first_violation<T: Constrained>(record: &T) -> Option<Violation> {
    T::RULES.iter().find_map(|rule| {
        let value = record.field(rule.field);
        rule.constraints
            .iter()
            .find(|c| !c.check(&value))
            .map(|c| Violation {
                field: rule.field,
                constraint: *c,
            })
    })
}

pub fn is_valid<T: Constrained>(record: &T) -> bool {
    first_violation(record).is_none()
}
