//! Import pipelines: parse, validate and map each record, then commit all
//! accepted entities in a single batch.

use crate::core::report::Report;
use crate::core::validator::{first_violation, Constrained};
use crate::core::Store;
use crate::domain::dto::{
    ImportAddressDto, ImportClientDto, ImportClientsDocument, ImportInvoiceDto, ImportProductDto,
};
use crate::domain::model::{NewAddress, NewClient, NewInvoice, NewProduct, NewProductClient};
use crate::utils::error::Result;
use quick_xml::events::Event;
use quick_xml::DeError;
use std::collections::HashSet;

const CLIENTS_ROOT: &str = "Clients";

fn accept<T: Constrained>(kind: &str, record: &T) -> bool {
    match first_violation(record) {
        Some(violation) => {
            tracing::debug!("Rejected {}: {}", kind, violation);
            false
        }
        None => true,
    }
}

/// Fails unless the first element of the document is `<root>`.
fn expect_root(xml: &str, root: &str) -> Result<()> {
    let mut reader = quick_xml::Reader::from_str(xml);
    loop {
        match reader.read_event().map_err(DeError::from)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() == root.as_bytes() {
                    return Ok(());
                }
                let found = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                return Err(DeError::Custom(format!(
                    "expected root element <{}>, found <{}>",
                    root, found
                ))
                .into());
            }
            Event::Eof => {
                return Err(DeError::Custom(format!("missing root element <{}>", root)).into());
            }
            _ => {}
        }
    }
}

fn to_address(dto: ImportAddressDto) -> Option<NewAddress> {
    Some(NewAddress {
        street_name: dto.street_name?,
        street_number: dto.street_number?,
        post_code: dto.post_code?,
        city: dto.city?,
        country: dto.country?,
    })
}

/// Imports a `<Clients>` document. An invalid address is dropped on its own
/// and never costs its client the import.
pub async fn import_clients<S: Store>(store: &S, xml: &str) -> Result<String> {
    expect_root(xml, CLIENTS_ROOT)?;
    let document: ImportClientsDocument = quick_xml::de::from_str(xml)?;
    tracing::debug!("Parsed {} client records", document.clients.len());

    let mut report = Report::new();
    let mut accepted = Vec::new();

    for candidate in document.clients {
        if !accept("client", &candidate) {
            report.failure();
            continue;
        }
        let ImportClientDto {
            name,
            number_vat,
            addresses,
        } = candidate;
        let (Some(name), Some(number_vat)) = (name, number_vat) else {
            report.failure();
            continue;
        };

        let mut client = NewClient {
            name,
            number_vat,
            addresses: Vec::new(),
        };

        for address in addresses.items {
            if !accept("address", &address) {
                report.failure();
                continue;
            }
            match to_address(address) {
                Some(address) => client.addresses.push(address),
                None => report.failure(),
            }
        }

        report.client_imported(&client.name);
        accepted.push(client);
    }

    let count = accepted.len();
    store.add_clients(accepted).await?;
    tracing::info!(
        "Imported {} clients ({} report lines failed)",
        count,
        report.failures()
    );

    Ok(report.finish())
}

/// Imports a JSON array of invoices. Client ids are taken as given; the
/// store's referential integrity is the only check against unknown clients.
pub async fn import_invoices<S: Store>(store: &S, json: &str) -> Result<String> {
    let candidates: Vec<ImportInvoiceDto> = serde_json::from_str(json)?;
    tracing::debug!("Parsed {} invoice records", candidates.len());

    let mut report = Report::new();
    let mut accepted = Vec::new();

    for candidate in candidates {
        if !accept("invoice", &candidate) {
            report.failure();
            continue;
        }
        let Some(invoice) = to_invoice(&candidate) else {
            report.failure();
            continue;
        };
        if invoice.issue_date > invoice.due_date {
            tracing::debug!(
                "Rejected invoice {}: issued {} after due {}",
                invoice.number,
                invoice.issue_date,
                invoice.due_date
            );
            report.failure();
            continue;
        }

        report.invoice_imported(invoice.number);
        accepted.push(invoice);
    }

    let count = accepted.len();
    store.add_invoices(accepted).await?;
    tracing::info!(
        "Imported {} invoices ({} rejected)",
        count,
        report.failures()
    );

    Ok(report.finish())
}

fn to_invoice(dto: &ImportInvoiceDto) -> Option<NewInvoice> {
    Some(NewInvoice {
        number: i32::try_from(dto.number?).ok()?,
        issue_date: dto.issue_date?,
        due_date: dto.due_date?,
        amount: dto.amount?,
        currency: dto.currency_type.as_ref()?.to_currency()?,
        client_id: dto.client_id?,
    })
}

/// Imports a JSON array of products with their client ids. Unknown client
/// ids cost only their own association; the product is still kept.
pub async fn import_products<S: Store>(store: &S, json: &str) -> Result<String> {
    let candidates: Vec<ImportProductDto> = serde_json::from_str(json)?;
    tracing::debug!("Parsed {} product records", candidates.len());

    // 只查詢一次，整個批次使用同一份有效客戶清單
    let known_clients = store.client_ids().await?;

    let mut report = Report::new();
    let mut accepted = Vec::new();

    for candidate in candidates {
        if !accept("product", &candidate) {
            report.failure();
            continue;
        }
        let (Some(name), Some(price), Some(category)) = (
            candidate.name,
            candidate.price,
            candidate.category_type.as_ref().and_then(|c| c.to_category()),
        ) else {
            report.failure();
            continue;
        };

        let mut product = NewProduct {
            name,
            price,
            category,
            clients: Vec::new(),
        };

        let mut seen = HashSet::new();
        for client_id in candidate.clients.unwrap_or_default() {
            if !seen.insert(client_id) {
                continue;
            }
            if !known_clients.contains(&client_id) {
                tracing::debug!("Product '{}' references unknown client {}", product.name, client_id);
                report.failure();
                continue;
            }
            product.clients.push(NewProductClient { client_id });
        }

        report.product_imported(&product.name, product.clients.len());
        accepted.push(product);
    }

    let count = accepted.len();
    store.add_products(accepted).await?;
    tracing::info!(
        "Imported {} products ({} report lines failed)",
        count,
        report.failures()
    );

    Ok(report.finish())
}
