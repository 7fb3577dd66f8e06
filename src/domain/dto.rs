//! Transient shapes that carry records across the XML/JSON boundary.
//!
//! Import DTOs keep every field optional so that a missing value reaches the
//! validator as a rule violation instead of failing the whole document.

use crate::core::validator::{Constrained, Constraint, FieldRule, FieldValue};
use crate::domain::model::{Category, Currency};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// An enumeration as it appears in input: numeric code or variant name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Code(i64),
    Name(String),
}

impl EnumValue {
    pub fn to_currency(&self) -> Option<Currency> {
        match self {
            EnumValue::Code(code) => Currency::from_code(*code),
            EnumValue::Name(name) => Currency::from_name(name),
        }
    }

    pub fn to_category(&self) -> Option<Category> {
        match self {
            EnumValue::Code(code) => Category::from_code(*code),
            EnumValue::Name(name) => Category::from_name(name),
        }
    }
}

const INVOICE_NUMBER_MIN: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
const INVOICE_NUMBER_MAX: Decimal = Decimal::from_parts(1_500_000_000, 0, 0, false, 0);
const PRODUCT_PRICE_MIN: Decimal = Decimal::from_parts(500, 0, 0, false, 2);
const PRODUCT_PRICE_MAX: Decimal = Decimal::from_parts(100_000, 0, 0, false, 2);

fn text(value: &Option<String>) -> FieldValue<'_> {
    value.as_deref().map_or(FieldValue::Missing, FieldValue::Text)
}

// ---- clients (XML) ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportClientsDocument {
    #[serde(rename = "Client", default)]
    pub clients: Vec<ImportClientDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportClientDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number_vat: Option<String>,
    #[serde(default)]
    pub addresses: ImportAddressList,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportAddressList {
    #[serde(rename = "Address", default)]
    pub items: Vec<ImportAddressDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportAddressDto {
    #[serde(default)]
    pub street_name: Option<String>,
    #[serde(default)]
    pub street_number: Option<i32>,
    #[serde(default)]
    pub post_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl Constrained for ImportClientDto {
    const RULES: &'static [FieldRule] = &[
        FieldRule::new("Name", &[Constraint::Required, Constraint::Length { min: 0, max: 25 }]),
        FieldRule::new("NumberVat", &[Constraint::Required, Constraint::Length { min: 0, max: 15 }]),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "Name" => text(&self.name),
            "NumberVat" => text(&self.number_vat),
            _ => FieldValue::Missing,
        }
    }
}

impl Constrained for ImportAddressDto {
    const RULES: &'static [FieldRule] = &[
        FieldRule::new("StreetName", &[Constraint::Required, Constraint::Length { min: 0, max: 20 }]),
        FieldRule::new("StreetNumber", &[Constraint::Required]),
        FieldRule::new("PostCode", &[Constraint::Required]),
        FieldRule::new("City", &[Constraint::Required, Constraint::Length { min: 0, max: 15 }]),
        FieldRule::new("Country", &[Constraint::Required, Constraint::Length { min: 0, max: 15 }]),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "StreetName" => text(&self.street_name),
            "StreetNumber" => self
                .street_number
                .map_or(FieldValue::Missing, |n| FieldValue::Integer(n.into())),
            "PostCode" => text(&self.post_code),
            "City" => text(&self.city),
            "Country" => text(&self.country),
            _ => FieldValue::Missing,
        }
    }
}

// ---- invoices (JSON) ----
// JSON 欄位接受 PascalCase 與 camelCase 兩種寫法

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportInvoiceDto {
    #[serde(default, alias = "number")]
    pub number: Option<i64>,
    #[serde(default, alias = "issueDate", deserialize_with = "flexible_datetime")]
    pub issue_date: Option<NaiveDateTime>,
    #[serde(default, alias = "dueDate", deserialize_with = "flexible_datetime")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default, alias = "amount")]
    pub amount: Option<Decimal>,
    #[serde(default, alias = "currencyType")]
    pub currency_type: Option<EnumValue>,
    #[serde(default, alias = "clientId")]
    pub client_id: Option<i32>,
}

impl Constrained for ImportInvoiceDto {
    const RULES: &'static [FieldRule] = &[
        FieldRule::new(
            "Number",
            &[
                Constraint::Required,
                Constraint::Range { min: INVOICE_NUMBER_MIN, max: INVOICE_NUMBER_MAX },
            ],
        ),
        FieldRule::new("IssueDate", &[Constraint::Required]),
        FieldRule::new("DueDate", &[Constraint::Required]),
        FieldRule::new("Amount", &[Constraint::Required]),
        FieldRule::new("CurrencyType", &[Constraint::Required, Constraint::OneOf(Currency::NAMES)]),
        FieldRule::new("ClientId", &[Constraint::Required]),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "Number" => self.number.map_or(FieldValue::Missing, FieldValue::Integer),
            "IssueDate" => self.issue_date.map_or(FieldValue::Missing, FieldValue::DateTime),
            "DueDate" => self.due_date.map_or(FieldValue::Missing, FieldValue::DateTime),
            "Amount" => self.amount.map_or(FieldValue::Missing, FieldValue::Decimal),
            "CurrencyType" => self
                .currency_type
                .as_ref()
                .map_or(FieldValue::Missing, FieldValue::Variant),
            "ClientId" => self
                .client_id
                .map_or(FieldValue::Missing, |id| FieldValue::Integer(id.into())),
            _ => FieldValue::Missing,
        }
    }
}

// ---- products (JSON) ----

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportProductDto {
    #[serde(default, alias = "name")]
    pub name: Option<String>,
    #[serde(default, alias = "price")]
    pub price: Option<Decimal>,
    #[serde(default, alias = "categoryType")]
    pub category_type: Option<EnumValue>,
    #[serde(default, alias = "clients")]
    pub clients: Option<Vec<i32>>,
}

impl Constrained for ImportProductDto {
    const RULES: &'static [FieldRule] = &[
        FieldRule::new("Name", &[Constraint::Required, Constraint::Length { min: 9, max: 30 }]),
        FieldRule::new(
            "Price",
            &[
                Constraint::Required,
                Constraint::Range { min: PRODUCT_PRICE_MIN, max: PRODUCT_PRICE_MAX },
            ],
        ),
        FieldRule::new("CategoryType", &[Constraint::Required, Constraint::OneOf(Category::NAMES)]),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "Name" => text(&self.name),
            "Price" => self.price.map_or(FieldValue::Missing, FieldValue::Decimal),
            "CategoryType" => self
                .category_type
                .as_ref()
                .map_or(FieldValue::Missing, FieldValue::Variant),
            _ => FieldValue::Missing,
        }
    }
}

/// Accepts `YYYY-MM-DDTHH:MM:SS[.fff]` or a bare `YYYY-MM-DD`.
fn flexible_datetime<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(value) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(value));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map(|date| Some(date.and_time(chrono::NaiveTime::MIN)))
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

// ---- exports ----

#[derive(Debug, Clone, Serialize)]
pub struct ExportClientsDocument {
    #[serde(rename = "Client")]
    pub clients: Vec<ExportClientDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportClientDto {
    #[serde(rename = "@InvoicesCount")]
    pub invoices_count: usize,
    #[serde(rename = "ClientName")]
    pub client_name: String,
    #[serde(rename = "VatNumber")]
    pub vat_number: String,
    #[serde(rename = "Invoices")]
    pub invoices: ExportInvoiceList,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportInvoiceList {
    #[serde(rename = "Invoice")]
    pub items: Vec<ExportInvoiceDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportInvoiceDto {
    #[serde(rename = "InvoiceNumber")]
    pub invoice_number: i32,
    #[serde(rename = "InvoiceAmount")]
    pub invoice_amount: String,
    #[serde(rename = "DueDate")]
    pub due_date: String,
    #[serde(rename = "Currency")]
    pub currency: String,
}

impl Constrained for ExportClientDto {
    const RULES: &'static [FieldRule] = &[
        FieldRule::new("ClientName", &[Constraint::Required, Constraint::Length { min: 10, max: 25 }]),
        FieldRule::new("VatNumber", &[Constraint::Required, Constraint::Length { min: 10, max: 15 }]),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "ClientName" => FieldValue::Text(&self.client_name),
            "VatNumber" => FieldValue::Text(&self.vat_number),
            _ => FieldValue::Missing,
        }
    }
}

impl Constrained for ExportInvoiceDto {
    const RULES: &'static [FieldRule] = &[
        FieldRule::new(
            "InvoiceNumber",
            &[
                Constraint::Required,
                Constraint::Range { min: INVOICE_NUMBER_MIN, max: INVOICE_NUMBER_MAX },
            ],
        ),
        FieldRule::new("InvoiceAmount", &[Constraint::Required]),
        FieldRule::new("DueDate", &[Constraint::Required]),
        FieldRule::new("Currency", &[Constraint::Required, Constraint::OneOf(Currency::NAMES)]),
    ];

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "InvoiceNumber" => FieldValue::Integer(self.invoice_number.into()),
            "InvoiceAmount" => FieldValue::Text(&self.invoice_amount),
            "DueDate" => FieldValue::Text(&self.due_date),
            "Currency" => FieldValue::Text(&self.currency),
            _ => FieldValue::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProductDto {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    pub clients: Vec<ExportProductClientDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProductClientDto {
    pub name: String,
    pub number_vat: String,
}
