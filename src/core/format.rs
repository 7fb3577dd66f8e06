//! Number and date rendering for exports. Every function takes its style
//! explicitly; nothing depends on process locale.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::error::EtlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// `MM/dd/yyyy`
    #[default]
    Invariant,
    /// `yyyy-MM-dd`
    Iso,
}

impl DateStyle {
    pub const NAMES: &'static [&'static str] = &["invariant", "iso"];

    fn pattern(self) -> &'static str {
        match self {
            DateStyle::Invariant => "%m/%d/%Y",
            DateStyle::Iso => "%Y-%m-%d",
        }
    }
}

impl FromStr for DateStyle {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invariant" => Ok(DateStyle::Invariant),
            "iso" => Ok(DateStyle::Iso),
            other => Err(EtlError::InvalidConfigValueError {
                field: "date_style".to_string(),
                value: other.to_string(),
                reason: format!("Allowed values: {}", DateStyle::NAMES.join(", ")),
            }),
        }
    }
}

pub fn format_short_date(value: &NaiveDateTime, style: DateStyle) -> String {
    value.format(style.pattern()).to_string()
}

/// Rounds half away from zero to at most `max_places` fractional digits and
/// drops trailing zeros: 850.555 -> 850.56, 12.50 -> 12.5, 15.00 -> 15.
pub fn round_at_most(value: Decimal, max_places: u32) -> Decimal {
    value
        .round_dp_with_strategy(max_places, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

pub fn format_amount(value: Decimal) -> String {
    round_at_most(value, 2).to_string()
}
