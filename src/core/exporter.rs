//! Export pipelines: query, filter and order persisted entities into export
//! projections, then serialize them.

use crate::core::format::{format_amount, format_short_date, round_at_most, DateStyle};
use crate::core::validator::first_violation;
use crate::core::Store;
use crate::domain::dto::{
    ExportClientDto, ExportClientsDocument, ExportInvoiceDto, ExportInvoiceList,
    ExportProductClientDto, ExportProductDto,
};
use crate::domain::model::{Client, ClientId, ProductId};
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
pub const TOP_PRODUCTS: usize = 5;

/// Clients with at least one invoice issued strictly after `cutoff`, each
/// with all of its invoices.
pub async fn clients_with_invoices<S: Store>(
    store: &S,
    cutoff: NaiveDateTime,
    date_style: DateStyle,
) -> Result<Vec<ExportClientDto>> {
    let mut projected = Vec::new();

    for client in store.clients().await? {
        let mut invoices = store.invoices_of(client.id).await?;
        if !invoices.iter().any(|i| i.issue_date > cutoff) {
            continue;
        }

        invoices.sort_by(|a, b| {
            a.issue_date
                .cmp(&b.issue_date)
                .then_with(|| b.due_date.cmp(&a.due_date))
        });

        let items: Vec<ExportInvoiceDto> = invoices
            .iter()
            .map(|invoice| ExportInvoiceDto {
                invoice_number: invoice.number,
                invoice_amount: format_amount(invoice.amount),
                due_date: format_short_date(&invoice.due_date, date_style),
                currency: invoice.currency.to_string(),
            })
            .collect();

        let dto = ExportClientDto {
            invoices_count: items.len(),
            client_name: client.name,
            vat_number: client.number_vat,
            invoices: ExportInvoiceList { items },
        };
        warn_on_violations(&dto);
        projected.push(dto);
    }

    projected.sort_by(|a, b| {
        b.invoices_count
            .cmp(&a.invoices_count)
            .then_with(|| a.client_name.cmp(&b.client_name))
    });

    tracing::info!("Exporting {} clients issued after {}", projected.len(), cutoff);
    Ok(projected)
}

// 匯出資料只記錄警告，不過濾
fn warn_on_violations(dto: &ExportClientDto) {
    if let Some(violation) = first_violation(dto) {
        tracing::warn!("Exported client '{}' violates {}", dto.client_name, violation);
    }
    for invoice in &dto.invoices.items {
        if let Some(violation) = first_violation(invoice) {
            tracing::warn!("Exported invoice {} violates {}", invoice.invoice_number, violation);
        }
    }
}

pub async fn export_clients_with_invoices<S: Store>(
    store: &S,
    cutoff: NaiveDateTime,
    date_style: DateStyle,
) -> Result<String> {
    let clients = clients_with_invoices(store, cutoff, date_style).await?;
    to_clients_xml(&ExportClientsDocument { clients })
}

pub fn to_clients_xml(document: &ExportClientsDocument) -> Result<String> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut body, Some("Clients"))
        .map_err(|e| EtlError::XmlWriteError {
            message: e.to_string(),
        })?;
    serializer.indent(' ', 2);
    document
        .serialize(serializer)
        .map_err(|e| EtlError::XmlWriteError {
            message: e.to_string(),
        })?;

    Ok(format!("{}\n{}", XML_DECLARATION, body))
}

/// Top products by number of associated clients whose name has at least
/// `min_name_length` characters.
pub async fn products_with_most_clients<S: Store>(
    store: &S,
    min_name_length: usize,
) -> Result<Vec<ExportProductDto>> {
    let clients: HashMap<ClientId, Client> =
        store.clients().await?.into_iter().map(|c| (c.id, c)).collect();

    let mut links: HashMap<ProductId, Vec<&Client>> = HashMap::new();
    for link in store.product_clients().await? {
        if let Some(client) = clients.get(&link.client_id) {
            if client.name.chars().count() >= min_name_length {
                links.entry(link.product_id).or_default().push(client);
            }
        }
    }

    let mut projected: Vec<ExportProductDto> = store
        .products()
        .await?
        .into_iter()
        .filter_map(|product| {
            let qualifying = links.get(&product.id)?;
            let mut clients: Vec<ExportProductClientDto> = qualifying
                .iter()
                .map(|c| ExportProductClientDto {
                    name: c.name.clone(),
                    number_vat: c.number_vat.clone(),
                })
                .collect();
            clients.sort_by(|a, b| a.name.cmp(&b.name));

            Some(ExportProductDto {
                name: product.name,
                price: round_at_most(product.price, 2),
                category: product.category.to_string(),
                clients,
            })
        })
        .collect();

    projected.sort_by(|a, b| {
        b.clients
            .len()
            .cmp(&a.clients.len())
            .then_with(|| a.name.cmp(&b.name))
    });
    projected.truncate(TOP_PRODUCTS);

    tracing::info!(
        "Exporting {} products with clients named at least {} characters",
        projected.len(),
        min_name_length
    );
    Ok(projected)
}

pub async fn export_products_with_most_clients<S: Store>(
    store: &S,
    min_name_length: usize,
) -> Result<String> {
    let products = products_with_most_clients(store, min_name_length).await?;
    Ok(serde_json::to_string_pretty(&products)?)
}
