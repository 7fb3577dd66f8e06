//! SQLite-backed store. Column limits, foreign keys and the product/client
//! pair key are declared in `migrations/`; every `add_*` batch runs in one
//! transaction and is rolled back on the first failing row.

use crate::domain::model::{
    Address, Category, Client, ClientId, Currency, Invoice, NewClient, NewInvoice, NewProduct,
    Product, ProductClient,
};
use crate::domain::ports::Store;
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: i32,
    street_name: String,
    street_number: i32,
    post_code: String,
    city: String,
    country: String,
    client_id: i32,
}

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: i32,
    number: i32,
    issue_date: NaiveDateTime,
    due_date: NaiveDateTime,
    amount: String,
    currency_type: i64,
    client_id: i32,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: String,
    category_type: i64,
}

fn corrupt(column: &str, value: impl std::fmt::Display) -> EtlError {
    EtlError::ProcessingError {
        message: format!("unreadable {} '{}' in database", column, value),
    }
}

fn decimal(column: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|_| corrupt(column, raw))
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = EtlError;

    fn try_from(row: InvoiceRow) -> Result<Self> {
        Ok(Invoice {
            id: row.id,
            number: row.number,
            issue_date: row.issue_date,
            due_date: row.due_date,
            amount: decimal("invoices.amount", &row.amount)?,
            currency: Currency::from_code(row.currency_type)
                .ok_or_else(|| corrupt("invoices.currency_type", row.currency_type))?,
            client_id: row.client_id,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = EtlError;

    fn try_from(row: ProductRow) -> Result<Self> {
        Ok(Product {
            id: row.id,
            price: decimal("products.price", &row.price)?,
            category: Category::from_code(row.category_type)
                .ok_or_else(|| corrupt("products.category_type", row.category_type))?,
            name: row.name,
        })
    }
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            id: row.id,
            street_name: row.street_name,
            street_number: row.street_number,
            post_code: row.post_code,
            city: row.city,
            country: row.country,
            client_id: row.client_id,
        }
    }
}

impl SqliteStore {
    /// Opens (or creates) the database file and applies pending migrations.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tracing::debug!("Opening database at {}", path.display());
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        Self::connect(options).await
    }

    /// A private database that lives as long as the store.
    pub async fn in_memory() -> Result<Self> {
        Self::connect(SqliteConnectOptions::from_str("sqlite::memory:")?).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let options = options
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        // 單一連線：寫入依序進行，記憶體資料庫也不會因換連線而遺失
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn addresses_of(&self, client_id: ClientId) -> Result<Vec<Address>> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r#"
            select id, street_name, street_number, post_code, city, country, client_id
            from addresses
            where client_id = $1
            order by id
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }
}

impl Store for SqliteStore {
    async fn client_ids(&self) -> Result<HashSet<ClientId>> {
        let ids = sqlx::query_scalar::<_, ClientId>("select id from clients")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn clients(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query_as::<_, (ClientId, String, String)>(
            "select id, name, number_vat from clients order by id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, number_vat)| Client {
                id,
                name,
                number_vat,
            })
            .collect())
    }

    async fn invoices_of(&self, client_id: ClientId) -> Result<Vec<Invoice>> {
        sqlx::query_as::<_, InvoiceRow>(
            r#"
            select id, number, issue_date, due_date, amount, currency_type, client_id
            from invoices
            where client_id = $1
            order by id
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Invoice::try_from)
        .collect()
    }

    async fn products(&self) -> Result<Vec<Product>> {
        sqlx::query_as::<_, ProductRow>(
            "select id, name, price, category_type from products order by id",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Product::try_from)
        .collect()
    }

    async fn product_clients(&self) -> Result<Vec<ProductClient>> {
        let rows = sqlx::query_as::<_, (i32, ClientId)>(
            "select product_id, client_id from products_clients order by product_id, client_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, client_id)| ProductClient {
                product_id,
                client_id,
            })
            .collect())
    }

    async fn add_clients(&self, clients: Vec<NewClient>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for client in &clients {
            let client_id = sqlx::query("insert into clients (name, number_vat) values ($1, $2)")
                .bind(client.name.as_str())
                .bind(client.number_vat.as_str())
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();

            for address in &client.addresses {
                sqlx::query(
                    r#"
                    insert into addresses
                        (street_name, street_number, post_code, city, country, client_id)
                    values
                        ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(address.street_name.as_str())
                .bind(address.street_number)
                .bind(address.post_code.as_str())
                .bind(address.city.as_str())
                .bind(address.country.as_str())
                .bind(client_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        tracing::debug!("Committed {} clients", clients.len());
        Ok(())
    }

    async fn add_invoices(&self, invoices: Vec<NewInvoice>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for invoice in &invoices {
            sqlx::query(
                r#"
                insert into invoices
                    (number, issue_date, due_date, amount, currency_type, client_id)
                values
                    ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(invoice.number)
            .bind(invoice.issue_date)
            .bind(invoice.due_date)
            .bind(invoice.amount.to_string())
            .bind(invoice.currency as i64)
            .bind(invoice.client_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!("Committed {} invoices", invoices.len());
        Ok(())
    }

    async fn add_products(&self, products: Vec<NewProduct>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for product in &products {
            let product_id = sqlx::query(
                "insert into products (name, price, category_type) values ($1, $2, $3)",
            )
            .bind(product.name.as_str())
            .bind(product.price.to_string())
            .bind(product.category as i64)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            for link in &product.clients {
                sqlx::query("insert into products_clients (product_id, client_id) values ($1, $2)")
                    .bind(product_id)
                    .bind(link.client_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        tracing::debug!("Committed {} products", products.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{NewAddress, NewProductClient};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn client(name: &str) -> NewClient {
        NewClient {
            name: name.to_string(),
            number_vat: "BG1234567890".to_string(),
            addresses: vec![NewAddress {
                street_name: "Tsarigradsko".to_string(),
                street_number: 115,
                post_code: "1784".to_string(),
                city: "Sofia".to_string(),
                country: "Bulgaria".to_string(),
            }],
        }
    }

    fn invoice(number: i32, client_id: ClientId) -> NewInvoice {
        let day = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap().and_hms_opt(0, 0, 0).unwrap();
        NewInvoice {
            number,
            issue_date: day,
            due_date: day,
            amount: Decimal::new(10_055, 3),
            currency: Currency::EUR,
            client_id,
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .add_clients(vec![client("Alpha Trading"), client("Beta Logistics")])
            .await
            .unwrap();
        store.add_clients(vec![client("Gamma Parts Ltd")]).await.unwrap();

        let ids: Vec<ClientId> = store.clients().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let addresses = store.addresses_of(3).await.unwrap();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].id, 3);
        assert_eq!(addresses[0].city, "Sofia");
    }

    #[tokio::test]
    async fn test_invoice_batch_with_unknown_client_is_rejected_whole() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.add_clients(vec![client("Alpha Trading")]).await.unwrap();

        let result = store
            .add_invoices(vec![invoice(1_100_000_000, 1), invoice(1_100_000_001, 9)])
            .await;
        assert!(matches!(result, Err(EtlError::ConstraintViolation { .. })));
        assert!(store.invoices_of(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invoice_issued_after_due_date_is_rejected() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.add_clients(vec![client("Alpha Trading")]).await.unwrap();

        let mut late = invoice(1_100_000_000, 1);
        late.issue_date = late.due_date + chrono::Duration::days(1);
        let result = store.add_invoices(vec![late]).await;
        assert!(matches!(result, Err(EtlError::ConstraintViolation { .. })));
    }

    #[tokio::test]
    async fn test_invoice_amount_keeps_its_precision() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.add_clients(vec![client("Alpha Trading")]).await.unwrap();
        store.add_invoices(vec![invoice(1_100_000_000, 1)]).await.unwrap();

        let stored = store.invoices_of(1).await.unwrap();
        assert_eq!(stored[0].amount, Decimal::new(10_055, 3));
        assert_eq!(stored[0].currency, Currency::EUR);
    }

    #[tokio::test]
    async fn test_duplicate_product_link_rolls_back_the_batch() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.add_clients(vec![client("Alpha Trading")]).await.unwrap();

        let product = NewProduct {
            name: "Brake lights".to_string(),
            price: Decimal::new(2_000, 2),
            category: Category::Lights,
            clients: vec![NewProductClient { client_id: 1 }, NewProductClient { client_id: 1 }],
        };
        let result = store.add_products(vec![product]).await;
        assert!(matches!(result, Err(EtlError::ConstraintViolation { .. })));
        assert!(store.products().await.unwrap().is_empty());
        assert!(store.product_clients().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_column_limits_enforced() {
        let store = SqliteStore::in_memory().await.unwrap();
        let result = store
            .add_clients(vec![client("Alpha Trading"), client("A client name that is far too long")])
            .await;
        assert!(matches!(result, Err(EtlError::ConstraintViolation { .. })));
        assert!(store.clients().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_database_file_keeps_state_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.db");

        let store = SqliteStore::open(&path).await.unwrap();
        store.add_clients(vec![client("Alpha Trading")]).await.unwrap();
        store.add_invoices(vec![invoice(1_200_000_000, 1)]).await.unwrap();
        let clients = store.clients().await.unwrap();
        let invoices = store.invoices_of(1).await.unwrap();
        store.close().await;

        let reopened = SqliteStore::open(&path).await.unwrap();
        assert_eq!(reopened.clients().await.unwrap(), clients);
        assert_eq!(reopened.invoices_of(1).await.unwrap(), invoices);
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_database_file_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");

        let store = SqliteStore::open(&path).await.unwrap();
        store.add_clients(vec![client("Alpha Trading")]).await.unwrap();
        assert!(store.add_invoices(vec![invoice(1_200_000_000, 42)]).await.is_err());
        store.close().await;

        let reopened = SqliteStore::open(&path).await.unwrap();
        assert_eq!(reopened.client_ids().await.unwrap().len(), 1);
        assert!(reopened.invoices_of(1).await.unwrap().is_empty());
    }
}
