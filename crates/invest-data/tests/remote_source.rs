//! 원격 분석 API 클라이언트 계약 테스트.

use std::time::Duration;

use invest_data::{
    DataSource, EntityCodes, MetricsParams, PriceParams, RemoteSource, ReturnsParams,
};
use mockito::Matcher;
use serde_json::json;

fn client(url: String, key: Option<&str>) -> RemoteSource {
    RemoteSource::new(url, key.map(str::to_string), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn prices_posts_params_with_api_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/analytics/prices")
        .match_header("x-api-key", "test-key")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"security_codes": ["AAPL", "MSFT"]})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"date":"2024-01-01","AAPL":100.0,"MSFT":50.0}]"#)
        .create_async()
        .await;

    let source = client(server.url(), Some("test-key"));
    let resp = source
        .prices(&PriceParams::new(EntityCodes::securities(["AAPL", "MSFT"])))
        .await;

    mock.assert_async().await;
    assert!(resp.success);
    assert_eq!(
        resp.data.unwrap(),
        json!([{"date": "2024-01-01", "AAPL": 100.0, "MSFT": 50.0}])
    );
}

#[tokio::test]
async fn returns_sends_defaults() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/analytics/returns")
        .match_body(Matcher::PartialJson(json!({
            "portfolio_codes": ["PF001"],
            "use_ln_ret": false,
            "win_size": 30
        })))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let source = client(server.url(), None);
    let resp = source
        .returns(&ReturnsParams::new(EntityCodes::portfolios(["PF001"])))
        .await;

    mock.assert_async().await;
    assert!(resp.success);
}

#[tokio::test]
async fn non_success_status_becomes_failure_envelope() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/analytics/metrics")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let source = client(server.url(), None);
    let resp = source
        .metrics(&MetricsParams::new(EntityCodes::securities(["AAPL"])))
        .await;

    assert!(!resp.success);
    assert!(resp.data.is_none());
    assert_eq!(resp.error.as_deref(), Some("HTTP 500: internal error"));
}

#[tokio::test]
async fn portfolio_lookup_uses_get_path() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/core/portfolio/PF001")
        .with_status(200)
        .with_body(r#"{"code":"PF001","name":"Global Equity Fund"}"#)
        .create_async()
        .await;

    let source = client(server.url(), None);
    let resp = source.portfolio("PF001").await;

    mock.assert_async().await;
    assert_eq!(resp.data.unwrap()["name"], json!("Global Equity Fund"));
}

#[tokio::test]
async fn batch_security_lookup_posts_code_list() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/core/security")
        .match_body(Matcher::Json(json!(["AAPL", "V"])))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let source = client(server.url(), None);
    let resp = source
        .securities(&["AAPL".to_string(), "V".to_string()])
        .await;

    mock.assert_async().await;
    assert_eq!(resp.data.unwrap(), json!([]));
}

#[tokio::test]
async fn invalid_json_body_becomes_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/analytics/prices")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let source = client(server.url(), None);
    let resp = source.prices(&PriceParams::default()).await;

    assert!(!resp.success);
    assert!(resp.error.is_some());
}

#[tokio::test]
async fn unreachable_server_becomes_failure() {
    // 예약된 포트(사용되지 않음)로 연결 실패 유도
    let source = client("http://127.0.0.1:9".to_string(), None);
    let resp = source.prices(&PriceParams::default()).await;

    assert!(!resp.success);
    assert!(resp.error.is_some());
}
