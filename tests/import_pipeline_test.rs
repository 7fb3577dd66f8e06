use invoices_etl::core::Store;
use invoices_etl::domain::model::{Category, Currency, NewClient};
use invoices_etl::{import_clients, import_invoices, import_products, EtlError, SqliteStore};

async fn store_with_clients(names: &[&str]) -> SqliteStore {
    let store = SqliteStore::in_memory().await.unwrap();
    store
        .add_clients(
            names
                .iter()
                .map(|name| NewClient {
                    name: name.to_string(),
                    number_vat: "BG1234567890".to_string(),
                    addresses: vec![],
                })
                .collect(),
        )
        .await
        .unwrap();
    store
}

const CLIENTS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Clients>
  <Client>
    <Name>LiCB GmbH</Name>
    <NumberVat>DE902931281</NumberVat>
    <Addresses>
      <Address>
        <StreetName>Gewerbestrasse</StreetName>
        <StreetNumber>3</StreetNumber>
        <PostCode>81828</PostCode>
        <City>Munich</City>
        <Country>Germany</Country>
      </Address>
      <Address>
        <StreetName>A street name that is much too long</StreetName>
        <StreetNumber>7</StreetNumber>
        <PostCode>81828</PostCode>
        <City>Munich</City>
        <Country>Germany</Country>
      </Address>
    </Addresses>
  </Client>
  <Client>
    <Name>A client whose name is far beyond the limit</Name>
    <NumberVat>BG1234567890</NumberVat>
    <Addresses>
      <Address>
        <StreetName>Bad address</StreetName>
        <StreetNumber>1</StreetNumber>
        <PostCode>1000</PostCode>
        <City>Sofia</City>
        <Country>Bulgaria</Country>
      </Address>
    </Addresses>
  </Client>
  <Client>
    <Name>Tyres Distribution</Name>
    <NumberVat></NumberVat>
  </Client>
  <Client>
    <Name>Auto Parts Plovdiv</Name>
    <NumberVat>BG204568321</NumberVat>
    <Addresses>
      <Address>
        <StreetName>Maritsa</StreetName>
        <StreetNumber>12</StreetNumber>
        <City>Plovdiv</City>
        <Country>Bulgaria</Country>
      </Address>
    </Addresses>
  </Client>
</Clients>"#;

#[tokio::test]
async fn test_import_clients_report_and_persistence() {
    let store = SqliteStore::in_memory().await.unwrap();
    let report = import_clients(&store, CLIENTS_XML).await.unwrap();

    assert_eq!(
        report,
        "Invalid data!\n\
         Successfully imported client LiCB GmbH.\n\
         Invalid data!\n\
         Invalid data!\n\
         Invalid data!\n\
         Successfully imported client Auto Parts Plovdiv."
    );

    let clients = store.clients().await.unwrap();
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].name, "LiCB GmbH");
    assert_eq!(clients[1].name, "Auto Parts Plovdiv");
}

#[tokio::test]
async fn test_invalid_address_does_not_reject_client() {
    let store = SqliteStore::in_memory().await.unwrap();
    import_clients(&store, CLIENTS_XML).await.unwrap();

    let addresses = store.addresses_of(1).await.unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].street_name, "Gewerbestrasse");
    assert_eq!(addresses[0].street_number, 3);

    // 地址缺少郵遞區號，客戶仍然匯入
    assert!(store.addresses_of(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_xml_aborts_without_writing() {
    let store = SqliteStore::in_memory().await.unwrap();
    let result = import_clients(
        &store,
        "<Clients><Client><Name>Broken</Name><Addresses><Address><StreetNumber>abc</StreetNumber></Address></Addresses></Client></Clients>",
    )
    .await;
    assert!(matches!(result, Err(EtlError::XmlError(_))));
    assert!(store.clients().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_root_element_aborts_without_writing() {
    let store = SqliteStore::in_memory().await.unwrap();
    let result = import_clients(
        &store,
        "<Customers><Client><Name>Alpha Trading</Name><NumberVat>BG1234567890</NumberVat></Client></Customers>",
    )
    .await;
    assert!(matches!(result, Err(EtlError::XmlError(_))));
    assert!(store.clients().await.unwrap().is_empty());

    let result = import_clients(&store, "").await;
    assert!(matches!(result, Err(EtlError::XmlError(_))));
}

#[tokio::test]
async fn test_declaration_and_comments_before_root_are_skipped() {
    let store = SqliteStore::in_memory().await.unwrap();
    let xml = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!-- export -->\n<Clients>\
               <Client><Name>Alpha Trading</Name><NumberVat>BG1234567890</NumberVat></Client>\
               </Clients>";
    let report = import_clients(&store, xml).await.unwrap();
    assert_eq!(report, "Successfully imported client Alpha Trading.");
}

#[tokio::test]
async fn test_camel_case_invoice_fields() {
    let store = store_with_clients(&["Alpha Trading"]).await;
    let json = r#"[{"number":1100000000,"issueDate":"2023-01-01","dueDate":"2023-02-01","amount":10,"currencyType":"BGN","clientId":1}]"#;

    let report = import_invoices(&store, json).await.unwrap();
    assert_eq!(report, "Successfully imported invoice with number 1100000000.");
    assert_eq!(store.invoices_of(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_import_invoices_validation_and_dates() {
    let store = store_with_clients(&["Alpha Trading", "Beta Logistics"]).await;
    let json = r#"[
        {"Number":1427940691,"IssueDate":"2022-08-29T00:00:00","DueDate":"2022-10-28T00:00:00","Amount":913.13,"CurrencyType":1,"ClientId":1},
        {"Number":1427940692,"IssueDate":"2022-11-29T00:00:00","DueDate":"2022-10-28T00:00:00","Amount":100.00,"CurrencyType":0,"ClientId":1},
        {"Number":999,"IssueDate":"2022-08-29T00:00:00","DueDate":"2022-10-28T00:00:00","Amount":10.5,"CurrencyType":2,"ClientId":2},
        {"Number":1063259096,"IssueDate":"2023-01-22T00:00:00","DueDate":"2023-01-22T00:00:00","Amount":-167.54,"CurrencyType":"USD","ClientId":2},
        {"Number":1063259097,"IssueDate":"2023-01-22T00:00:00","DueDate":"2023-02-22T00:00:00","Amount":50,"CurrencyType":3,"ClientId":2},
        {"Number":1063259098,"DueDate":"2023-02-22T00:00:00","Amount":50,"CurrencyType":0,"ClientId":2}
    ]"#;

    let report = import_invoices(&store, json).await.unwrap();
    assert_eq!(
        report,
        "Successfully imported invoice with number 1427940691.\n\
         Invalid data!\n\
         Invalid data!\n\
         Successfully imported invoice with number 1063259096.\n\
         Invalid data!\n\
         Invalid data!"
    );

    let first = store.invoices_of(1).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].currency, Currency::EUR);

    let second = store.invoices_of(2).await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].currency, Currency::USD);
    assert_eq!(second[0].issue_date, second[0].due_date);
}

#[tokio::test]
async fn test_invoice_pipeline_does_not_check_client_ids() {
    let store = store_with_clients(&["Alpha Trading"]).await;
    let json = r#"[
        {"Number":1100000000,"IssueDate":"2023-01-01","DueDate":"2023-02-01","Amount":10,"CurrencyType":0,"ClientId":1},
        {"Number":1100000001,"IssueDate":"2023-01-01","DueDate":"2023-02-01","Amount":10,"CurrencyType":0,"ClientId":42}
    ]"#;

    // 管線本身不檢查客戶，提交時由儲存層拒絕整個批次
    let result = import_invoices(&store, json).await;
    assert!(matches!(result, Err(EtlError::ConstraintViolation { .. })));
    assert!(store.invoices_of(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_import_invoices_rejects_non_array() {
    let store = store_with_clients(&["Alpha Trading"]).await;
    let result = import_invoices(&store, r#"{"Number":1100000000}"#).await;
    assert!(matches!(result, Err(EtlError::SerializationError(_))));
}

#[tokio::test]
async fn test_import_products_dedupes_and_skips_unknown_clients() {
    let store = store_with_clients(&["Alpha Trading", "Beta Logistics", "Gamma Parts Ltd"]).await;
    let json = r#"[
        {"Name":"ADR plates","Price":14.97,"CategoryType":0,"Clients":[1,2,2,1,9]},
        {"Name":"Cheap","Price":14.97,"CategoryType":0,"Clients":[1]},
        {"Name":"Winter tyres","Price":1000.01,"CategoryType":4,"Clients":[1]},
        {"Name":"Fog lights set","Price":89.5,"CategoryType":"Lights","Clients":[7,7]},
        {"Name":"Oil filter kit","Price":25,"CategoryType":1}
    ]"#;

    let report = import_products(&store, json).await.unwrap();
    assert_eq!(
        report,
        "Invalid data!\n\
         Successfully imported product - ADR plates with 2 clients.\n\
         Invalid data!\n\
         Invalid data!\n\
         Invalid data!\n\
         Successfully imported product - Fog lights set with 0 clients.\n\
         Successfully imported product - Oil filter kit with 0 clients."
    );

    let products = store.products().await.unwrap();
    assert_eq!(products.len(), 3);
    assert_eq!(products[0].category, Category::ADR);
    assert_eq!(products[1].category, Category::Lights);

    let links = store.product_clients().await.unwrap();
    assert_eq!(links.len(), 2);
    assert!(links.iter().all(|l| l.product_id == products[0].id));
}

#[tokio::test]
async fn test_duplicate_client_ids_never_add_extra_links() {
    let store = store_with_clients(&["Alpha Trading", "Beta Logistics"]).await;
    let json = r#"[{"Name":"Brake lights","Price":20,"CategoryType":2,"Clients":[2,2,2,1,1,2]}]"#;

    let report = import_products(&store, json).await.unwrap();
    assert_eq!(report, "Successfully imported product - Brake lights with 2 clients.");
    assert_eq!(store.product_clients().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_inputs_give_empty_reports() {
    let store = SqliteStore::in_memory().await.unwrap();
    assert_eq!(import_clients(&store, "<Clients></Clients>").await.unwrap(), "");
    assert_eq!(import_invoices(&store, "[]").await.unwrap(), "");
    assert_eq!(import_products(&store, "[]").await.unwrap(), "");
}
