use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ClientId = i32;
pub type ProductId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    BGN,
    EUR,
    USD,
}

impl Currency {
    /// Names in code order; the numeric code of a variant is its index.
    pub const NAMES: &'static [&'static str] = &["BGN", "EUR", "USD"];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Currency::BGN),
            1 => Some(Currency::EUR),
            2 => Some(Currency::USD),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| Self::from_code(i as i64))
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    ADR,
    Filters,
    Lights,
    Others,
    Tyres,
}

impl Category {
    pub const NAMES: &'static [&'static str] = &["ADR", "Filters", "Lights", "Others", "Tyres"];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Category::ADR),
            1 => Some(Category::Filters),
            2 => Some(Category::Lights),
            3 => Some(Category::Others),
            4 => Some(Category::Tyres),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| Self::from_code(i as i64))
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub number_vat: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i32,
    pub street_name: String,
    pub street_number: i32,
    pub post_code: String,
    pub city: String,
    pub country: String,
    pub client_id: ClientId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i32,
    pub number: i32,
    pub issue_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub amount: Decimal,
    pub currency: Currency,
    pub client_id: ClientId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category: Category,
}

/// Association row; identity is the (product_id, client_id) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductClient {
    pub product_id: ProductId,
    pub client_id: ClientId,
}

// 尚未寫入儲存層的實體，id 由儲存層在提交時分配

#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub street_name: String,
    pub street_number: i32,
    pub post_code: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub name: String,
    pub number_vat: String,
    pub addresses: Vec<NewAddress>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub number: i32,
    pub issue_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub amount: Decimal,
    pub currency: Currency,
    pub client_id: ClientId,
}

/// Link from a product that is not stored yet to an existing client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewProductClient {
    pub client_id: ClientId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub category: Category,
    pub clients: Vec<NewProductClient>,
}
