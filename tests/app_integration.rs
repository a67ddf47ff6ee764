use std::fs;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_stock(server: &MockServer, id: u32, body: &str) {
        let url_path = format!("/_api/market-guide/stock/{id}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let stock_response = r#"{
        "orderbookId": 5431,
        "name": "Telia Company",
        "quote": { "last": 38.5, "change": 0.5, "changePercent": 1.32 },
        "historicalClosingPrices": {
            "oneWeek": 38.0,
            "oneMonth": 36.0,
            "oneYear": 30.0,
            "startOfYear": 35.0
        },
        "listing": { "currency": "SEK" },
        "dividends": {
            "events": [{
                "amount": 2.0,
                "exDate": "2099-03-25",
                "exDateStatus": "CONFIRMED",
                "paymentDate": "2099-04-01"
            }]
        }
    }"#;

    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_stock(&mock_server, 5431, stock_response).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        instruments:
          - id: 5431
            shares: 10.0
            purchase_price: 30.0
            monitored: [change, changePercent, name, dividends]
        provider:
          base_url: {}
        "#,
        mock_server.uri()
    );

    fs::write(config_path, &config_content).expect("Failed to write config file");

    let result = kursvakt::run_command(
        kursvakt::AppCommand::Show { json: true },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Show command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_conversion() {
    let stock_response = r#"{
        "orderbookId": 238449,
        "name": "Apple Inc",
        "quote": { "last": 6.0, "change": 0.5 },
        "historicalClosingPrices": { "oneWeek": 5.0 },
        "listing": { "currency": "USD" }
    }"#;
    let pair_response = r#"{
        "orderbookId": 19000,
        "name": "USD/SEK",
        "quote": { "last": 10.0 }
    }"#;

    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_stock(&mock_server, 238449, stock_response).await;
    test_utils::mount_stock(&mock_server, 19000, pair_response).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        instruments:
          - id: 238449
            conversion_id: 19000
        provider:
          base_url: {}
        "#,
        mock_server.uri()
    );

    fs::write(config_path, &config_content).expect("Failed to write config file");

    let result = kursvakt::run_command(
        kursvakt::AppCommand::Show { json: false },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Show command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_invalid_config_is_rejected_before_any_fetch() {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = r#"
        instruments:
          - id: 5431
            monitored: [change, definitelyNotACondition]
    "#;

    fs::write(config_path, config_content).expect("Failed to write config file");

    let result = kursvakt::run_command(
        kursvakt::AppCommand::Show { json: false },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("definitelyNotACondition")
    );
}

#[test_log::test(tokio::test)]
async fn test_failed_fetch_does_not_fail_the_cycle() {
    // Server knows nothing about the instrument: the refresh is abandoned
    // but the command itself still succeeds
    let mock_server = wiremock::MockServer::start().await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        instruments:
          - id: 999999
        provider:
          base_url: {}
        "#,
        mock_server.uri()
    );

    fs::write(config_path, &config_content).expect("Failed to write config file");

    let result = kursvakt::run_command(
        kursvakt::AppCommand::Show { json: true },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok());
}
