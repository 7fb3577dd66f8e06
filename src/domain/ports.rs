use crate::core::format::DateStyle;
use crate::domain::model::{
    Client, ClientId, Invoice, NewClient, NewInvoice, NewProduct, Product, ProductClient,
};
use crate::utils::error::Result;
use std::collections::HashSet;
use std::future::Future;

/// Where serialized input is read from and exports are written to.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(&self, path: &str, data: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

/// Relational store holding the persisted entities.
///
/// Each `add_*` call is one batch: either every entity in it is committed or
/// none is, and the store reports the constraint that failed.
pub trait Store: Send + Sync {
    fn client_ids(&self) -> impl Future<Output = Result<HashSet<ClientId>>> + Send;
    fn clients(&self) -> impl Future<Output = Result<Vec<Client>>> + Send;
    fn invoices_of(&self, client_id: ClientId) -> impl Future<Output = Result<Vec<Invoice>>> + Send;
    fn products(&self) -> impl Future<Output = Result<Vec<Product>>> + Send;
    fn product_clients(&self) -> impl Future<Output = Result<Vec<ProductClient>>> + Send;

    fn add_clients(&self, clients: Vec<NewClient>) -> impl Future<Output = Result<()>> + Send;
    fn add_invoices(&self, invoices: Vec<NewInvoice>) -> impl Future<Output = Result<()>> + Send;
    fn add_products(&self, products: Vec<NewProduct>) -> impl Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn database_path(&self) -> Option<&str>;
    fn date_style(&self) -> DateStyle;
}
