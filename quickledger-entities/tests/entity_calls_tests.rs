//! Integration tests for entity operations against a mock API.

use std::sync::Arc;

use quickledger_core::Credentials;
use quickledger_entities::{AccountingApi, CallOptions};
use quickledger_fetch::{Connector, ConnectorSettings, QueryParams};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> AccountingApi {
    let connector = Connector::builder(
        ConnectorSettings::new("client", "secret", "https://app.example.com/callback")
            .with_base_url(server.uri())
            .with_minor_version(75),
    )
    .credentials(Credentials::new("A", "B", "4620"))
    .build()
    .unwrap();
    AccountingApi::new(Arc::new(connector))
}

#[tokio::test]
async fn test_create_invoice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/company/4620/invoice"))
        .and(query_param("minorversion", "75"))
        .and(query_param("requestid", "req-1"))
        .and(query_param_is_missing("operation"))
        .and(body_json(json!({"CustomerRef": {"value": "1"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Invoice": {"Id": "130"}})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let result = api
        .accounting("Invoice")
        .unwrap()
        .creator()
        .unwrap()
        .call(
            &json!({"CustomerRef": {"value": "1"}}),
            &CallOptions::default().with_reqid("req-1"),
        )
        .await
        .unwrap();

    assert_eq!(result["Invoice"]["Id"], "130");
}

#[tokio::test]
async fn test_sparse_update_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/company/4620/customer"))
        .and(query_param("operation", "update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Customer": {"SyncToken": "1"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/company/4620/bill"))
        .and(query_param("operation", "delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Bill": {"status": "Deleted"}})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let payload = json!({"Id": "7", "SyncToken": "0", "sparse": true});

    let updated = api.accounting("Customer").unwrap().updater().unwrap();
    assert_eq!(
        updated.call(&payload, &CallOptions::default()).await.unwrap()["Customer"]["SyncToken"],
        "1"
    );

    let deleted = api.accounting("Bill").unwrap().deleter().unwrap();
    assert_eq!(
        deleted.call(&payload, &CallOptions::default()).await.unwrap()["Bill"]["status"],
        "Deleted"
    );
}

#[tokio::test]
async fn test_read_and_default_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/company/4620/vendor/56"))
        .and(query_param("minorversion", "70"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Vendor": {"Id": "56"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/company/4620/query"))
        .and(query_param("query", "select * from Vendor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"QueryResponse": {"Vendor": []}})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let vendor = api.accounting("vendor").unwrap();

    let read = vendor
        .reader()
        .unwrap()
        .call("56", &CallOptions::default().with_minor_version(70))
        .await
        .unwrap();
    assert_eq!(read["Vendor"]["Id"], "56");

    let listed = vendor.querier().unwrap().call(None, &CallOptions::default()).await.unwrap();
    assert!(listed["QueryResponse"]["Vendor"].is_array());
}

#[tokio::test]
async fn test_report_params_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/company/4620/reports/BalanceSheet"))
        .and(query_param("start_date", "2024-01-01"))
        .and(query_param("end_date", "2024-03-31"))
        .and(query_param("minorversion", "75"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Header": {"ReportName": "BalanceSheet"}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = QueryParams::new();
    params.insert("start_date".into(), "2024-01-01".into());
    params.insert("end_date".into(), "2024-03-31".into());

    let api = api(&server);
    let result = api
        .report("BalanceSheetReport")
        .unwrap()
        .query
        .call(&params, &CallOptions::default())
        .await
        .unwrap();

    assert_eq!(result["Header"]["ReportName"], "BalanceSheet");
}

#[tokio::test]
async fn test_batch_posts_verbatim() {
    let server = MockServer::start().await;
    let payload = json!({
        "BatchItemRequest": [
            {"bId": "bid1", "operation": "create", "Vendor": {"DisplayName": "V"}},
            {"bId": "bid2", "Query": "select * from SalesReceipt"}
        ]
    });
    Mock::given(method("POST"))
        .and(path("/v3/company/4620/batch"))
        .and(query_param_is_missing("minorversion"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"BatchItemResponse": []})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let result = api.batch(&payload).await.unwrap();

    assert!(result["BatchItemResponse"].is_array());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}
