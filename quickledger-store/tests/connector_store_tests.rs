//! Integration tests wiring a credential file into a connector.

use quickledger_core::Credentials;
use quickledger_fetch::{Connector, ConnectorSettings, QueryParams, RequestOptions};
use quickledger_store::{ConnectorConfig, CredentialFile};

#[tokio::test]
async fn test_file_seeds_connector_without_network() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = CredentialFile::new(temp_dir.path().join("credentials.json"));
    file.save(&Credentials::default().with_access_token("A")).await.unwrap();

    // Unroutable base URL: the call must fail before any request is sent.
    let connector = Connector::builder(
        ConnectorSettings::new("id", "secret", "https://app/cb").with_base_url("http://127.0.0.1:9"),
    )
    .initializer(file.clone())
    .build()
    .unwrap();

    let err = connector
        .execute(
            quickledger_fetch::Method::GET,
            "/query",
            &QueryParams::new(),
            None,
            &RequestOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(err.is_credentials());
    assert_eq!(err.to_string(), "Missing credentials after initializer.");
    assert_eq!(connector.credentials().await.access_token.as_deref(), Some("A"));
}

#[tokio::test]
async fn test_config_file_to_connector() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("config.json");
    tokio::fs::write(
        &path,
        r#"{"client_id": "id", "client_secret": "secret", "redirect_uri": "https://app/cb", "minor_version": 75}"#,
    )
    .await
    .unwrap();

    let config = ConnectorConfig::load_from(&path).await.unwrap();
    let connector = Connector::builder(config.to_settings().unwrap()).build().unwrap();

    assert_eq!(connector.settings().minor_version, Some(75));
    assert!(!connector.settings().sandbox);
}
