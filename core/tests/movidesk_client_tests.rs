// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

use access_request_core::domain::directory::{DirectoryError, DirectoryService};
use access_request_core::infrastructure::relay::Relay;
use access_request_core::infrastructure::MovideskDirectoryClient;
use mockito::Matcher;

const TOKEN: &str = "test-token";

fn person_query(email: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("token".into(), TOKEN.into()),
        Matcher::UrlEncoded(
            "$filter".into(),
            format!("emails/any(d:d/email eq '{email}')"),
        ),
        Matcher::UrlEncoded("$select".into(), "id,businessName,role".into()),
        Matcher::UrlEncoded("$expand".into(), "contacts".into()),
    ])
}

fn units_query() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("token".into(), TOKEN.into()),
        Matcher::UrlEncoded("$filter".into(), "personType eq 2 and isActive eq true".into()),
        Matcher::UrlEncoded("$select".into(), "id,businessName".into()),
    ])
}

#[tokio::test]
async fn test_resolve_franchisee_with_primary_phone() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/persons")
        .match_query(person_query("joao@unidade.com.br"))
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{
                "id": "42",
                "businessName": "Unidade Centro",
                "role": "FRANQUEADO",
                "contacts": [
                    {"contactType": 2, "contact": "joao@unidade.com.br", "isMain": true},
                    {"contactType": 1, "contact": "(11) 99999-8888", "isMain": false}
                ]
            }]"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = MovideskDirectoryClient::new(server.url(), TOKEN);
    let result = client.resolve_person("joao@unidade.com.br").await.unwrap();

    mock.assert_async().await;
    assert!(result.is_franchisee);
    assert_eq!(result.phone.as_deref(), Some("(11) 99999-8888"));
    assert_eq!(result.id.as_deref(), Some("42"));
    assert_eq!(result.business_name.as_deref(), Some("Unidade Centro"));
}

#[tokio::test]
async fn test_resolve_unknown_email_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/persons")
        .match_query(person_query("ninguem@unidade.com.br"))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = MovideskDirectoryClient::new(server.url(), TOKEN);
    let result = client.resolve_person("ninguem@unidade.com.br").await.unwrap();

    assert!(!result.is_franchisee);
    assert!(result.phone.is_none());
    assert!(result.id.is_none());
}

#[tokio::test]
async fn test_resolve_null_body_and_numeric_id() {
    let mut server = mockito::Server::new_async().await;
    let _empty = server
        .mock("GET", "/persons")
        .match_query(person_query("vazio@unidade.com.br"))
        .with_status(200)
        .with_body("null")
        .create_async()
        .await;
    let _numeric = server
        .mock("GET", "/persons")
        .match_query(person_query("maria@unidade.com.br"))
        .with_status(200)
        .with_body(
            r#"[{"id": 77, "businessName": "Unidade Sul", "role": "FRANQUEADO", "contacts": null}]"#,
        )
        .create_async()
        .await;

    let client = MovideskDirectoryClient::new(server.url(), TOKEN);

    let empty = client.resolve_person("vazio@unidade.com.br").await.unwrap();
    assert!(!empty.is_franchisee);

    let maria = client.resolve_person("maria@unidade.com.br").await.unwrap();
    assert!(maria.is_franchisee);
    assert_eq!(maria.id.as_deref(), Some("77"));
    assert!(maria.phone.is_none());
}

#[tokio::test]
async fn test_resolve_server_error_is_distinguishable() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/persons")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = MovideskDirectoryClient::new(server.url(), TOKEN);
    let err = client.resolve_person("joao@unidade.com.br").await.unwrap_err();

    match err {
        DirectoryError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_resolve_malformed_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/persons")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = MovideskDirectoryClient::new(server.url(), TOKEN);
    let err = client.resolve_person("joao@unidade.com.br").await.unwrap_err();
    assert!(matches!(err, DirectoryError::Decode(_)));
}

#[tokio::test]
async fn test_list_units_deduplicates_by_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/persons")
        .match_query(units_query())
        .with_status(200)
        .with_body(
            r#"[
                {"id": "7", "businessName": "Unidade Norte"},
                {"id": "3", "businessName": "Unidade Centro"},
                {"id": "7", "businessName": "Unidade Norte (duplicada)"}
            ]"#,
        )
        .create_async()
        .await;

    let client = MovideskDirectoryClient::new(server.url(), TOKEN);
    let units = client.list_units().await;

    mock.assert_async().await;
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].id, "7");
    assert_eq!(units[0].business_name, "Unidade Norte");
    assert_eq!(units[1].id, "3");
}

#[tokio::test]
async fn test_list_units_failure_yields_empty_list() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/persons")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let client = MovideskDirectoryClient::new(server.url(), TOKEN);
    assert!(client.list_units().await.is_empty());
}

#[tokio::test]
async fn test_requests_go_through_relay_when_configured() {
    let mut server = mockito::Server::new_async().await;
    let target = format!(
        "https://dir.example/public/v1/persons?token={TOKEN}\
         &$filter=personType%20eq%202%20and%20isActive%20eq%20true\
         &$select=id%2CbusinessName"
    );
    let mock = server
        .mock("GET", "/relay")
        .match_query(Matcher::UrlEncoded("url".into(), target))
        .with_status(200)
        .with_body(r#"[{"id": "3", "businessName": "Unidade Centro"}]"#)
        .expect(1)
        .create_async()
        .await;

    let client = MovideskDirectoryClient::new("https://dir.example/public/v1", TOKEN)
        .with_relay(Relay::new(Some(format!("{}/relay?url=", server.url()))));
    let units = client.list_units().await;

    mock.assert_async().await;
    assert_eq!(units.len(), 1);
}

#[tokio::test]
async fn test_transport_error_does_not_expose_token() {
    // Port 1 on loopback refuses connections
    let client = MovideskDirectoryClient::new("http://127.0.0.1:1/public/v1", "SECRET-TOKEN-123");
    let err = client.resolve_person("joao@unidade.com.br").await.unwrap_err();

    assert!(matches!(err, DirectoryError::Network(_)));
    assert!(!err.to_string().contains("SECRET-TOKEN-123"));
}

#[tokio::test]
async fn test_relayed_transport_error_does_not_expose_token() {
    let client = MovideskDirectoryClient::new("https://dir.example/public/v1", "SECRET-TOKEN-123")
        .with_relay(Relay::new(Some("http://127.0.0.1:1/relay?url=".to_string())));
    let err = client.resolve_person("joao@unidade.com.br").await.unwrap_err();

    let message = err.to_string();
    assert!(!message.contains("SECRET-TOKEN-123"));
    assert!(!message.contains("dir.example"));
}
