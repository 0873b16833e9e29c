//! Contract tests for the identity-photo lookup.
//!
//! ## Behaviors Tested
//!
//! | Response | Expected |
//! |----------|----------|
//! | 200 with base64 `Imagem` | decoded bytes |
//! | 404 | `LookupError::NotFound` (never `Upstream`) |
//! | 500 / 401 | `LookupError::Upstream` with status |
//! | 200 without `Imagem` | `LookupError::MalformedResponse` |
//! | 200 with invalid base64 | `LookupError::MalformedResponse` |
//! | slow service | `LookupError::Timeout` |

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use facematch_core::validate_identity_number;
use facematch_identity_client::config::{MOCK_LOOKUP_PATH, MOCK_TOKEN_PATH};
use facematch_identity_client::{IdentityApiConfig, IdentityServiceClient, LookupError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PHOTO: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg-bytes";

async fn client_with_token(server: &MockServer) -> IdentityServiceClient {
    Mock::given(method("POST"))
        .and(path(MOCK_TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "tok-abc"})),
        )
        .mount(server)
        .await;
    let config = IdentityApiConfig::local_mock(&server.uri()).unwrap();
    IdentityServiceClient::new(config).unwrap()
}

async fn lookup(client: &IdentityServiceClient) -> Result<Vec<u8>, LookupError> {
    let id = validate_identity_number("123.456.789-09").unwrap();
    let credential = client.credentials().acquire().await.unwrap();
    client.photos().fetch_identity_photo(&id, &credential).await
}

#[tokio::test]
async fn returns_decoded_photo() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MOCK_LOOKUP_PATH))
        .and(header("authorization", "Bearer tok-abc"))
        .and(body_json(serde_json::json!({"CPF": "12345678909", "TipoImagem": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Imagem": STANDARD.encode(PHOTO),
            "Formato": "jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_token(&server).await;
    assert_eq!(lookup(&client).await.unwrap(), PHOTO);
}

#[tokio::test]
async fn not_found_is_first_class() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MOCK_LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("registro nao encontrado"))
        .mount(&server)
        .await;

    let client = client_with_token(&server).await;
    match lookup(&client).await.unwrap_err() {
        LookupError::NotFound { identity } => {
            assert_eq!(identity, "123***09");
        }
        other => panic!("expected NotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MOCK_LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_with_token(&server).await;
    match lookup(&client).await.unwrap_err() {
        err @ LookupError::Upstream { .. } => {
            assert!(err.is_transient());
            if let LookupError::Upstream { status, .. } = err {
                assert_eq!(status, Some(500));
            }
        }
        other => panic!("expected Upstream, got: {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_is_upstream_not_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MOCK_LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_with_token(&server).await;
    let err = lookup(&client).await.unwrap_err();
    assert!(
        matches!(err, LookupError::Upstream { status: Some(401), .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn missing_image_field_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MOCK_LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Mensagem": "ok"})))
        .mount(&server)
        .await;

    let client = client_with_token(&server).await;
    let err = lookup(&client).await.unwrap_err();
    assert!(matches!(err, LookupError::MalformedResponse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn empty_image_field_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MOCK_LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Imagem": ""})))
        .mount(&server)
        .await;

    let client = client_with_token(&server).await;
    let err = lookup(&client).await.unwrap_err();
    assert!(matches!(err, LookupError::MalformedResponse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn invalid_base64_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MOCK_LOOKUP_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"Imagem": "%%%not-base64%%%"})),
        )
        .mount(&server)
        .await;

    let client = client_with_token(&server).await;
    match lookup(&client).await.unwrap_err() {
        LookupError::MalformedResponse { reason, .. } => {
            assert!(reason.contains("base64"), "got: {reason}");
        }
        other => panic!("expected MalformedResponse, got: {other:?}"),
    }
}

#[tokio::test]
async fn slow_lookup_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MOCK_TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "tok-abc"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(MOCK_LOOKUP_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"Imagem": STANDARD.encode(PHOTO)}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = IdentityApiConfig::local_mock(&server.uri()).unwrap();
    config.timeout_secs = 1;
    let client = IdentityServiceClient::new(config).unwrap();

    let err = lookup(&client).await.unwrap_err();
    assert!(matches!(err, LookupError::Timeout { timeout_secs: 1, .. }), "got: {err:?}");
    assert!(err.is_transient());
}
