#![cfg(feature = "client")]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use ethys402::config::ClientConfig;
use ethys402::signing::{build_telemetry_message, verify_signature};
use ethys402::{
    crypto, BlockingEthysClient, ConnectRequest, DiscoveryQuery, Error, EthysClient,
    TelemetryEvent, TelemetryOptions, TrustAttestRequest,
};
use tokio::net::TcpListener;

/// A request as the test server saw it.
#[derive(Debug)]
struct Captured {
    method: Method,
    target: String,
    headers: HeaderMap,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Local axum server answering every request with one canned response.
struct Srv {
    kill: Option<tokio::sync::oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<std::io::Result<()>>,
    seen: Arc<Mutex<Vec<Captured>>>,
    config: ClientConfig,
}

impl Drop for Srv {
    fn drop(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
        self.task.abort();
    }
}

impl Srv {
    async fn new(status: u16, body: &'static str) -> Self {
        let (kill, kill_r) = tokio::sync::oneshot::channel();
        let kill_r = async move {
            let _ = kill_r.await;
        };

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();

        let status = StatusCode::from_u16(status).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();

        let app: Router = Router::new().fallback(
            move |method: Method, uri: Uri, headers: HeaderMap, req_body: String| async move {
                record.lock().unwrap().push(Captured {
                    method,
                    target: uri.to_string(),
                    headers,
                    body: req_body,
                });
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            },
        );

        let task = tokio::task::spawn(std::future::IntoFuture::into_future(
            axum::serve(listener, app).with_graceful_shutdown(kill_r),
        ));

        Self {
            kill: Some(kill),
            task,
            seen,
            config: ClientConfig::new(&format!("http://{addr}")).unwrap(),
        }
    }

    fn config(&self) -> ClientConfig {
        self.config.clone()
    }

    /// The most recent request received.
    fn request(&self) -> Captured {
        self.seen.lock().unwrap().pop().expect("no request received")
    }
}

const INFO_BODY: &str = r#"{
    "protocol": "x402",
    "name": "ETHYS x402 Protocol",
    "description": "Test",
    "version": "1.0.0",
    "onboarding": {"steps": []},
    "pricing": {"token": {}},
    "network": {"chainId": 8453},
    "endpoints": {},
    "features": []
}"#;

#[tokio::test]
async fn test_get_info() {
    let srv = Srv::new(200, INFO_BODY).await;
    let client = EthysClient::new(srv.config()).unwrap();

    let info = client.get_info().await.unwrap();
    assert_eq!(info.protocol, "x402");
    assert_eq!(info.name, "ETHYS x402 Protocol");
    assert_eq!(info.network["chainId"], 8453);

    let req = srv.request();
    assert_eq!(req.method, "GET");
    assert_eq!(req.target, "/api/v1/402/info");
    assert_eq!(req.header("accept"), Some("application/json"));
    assert!(req.header("authorization").is_none());
}

#[tokio::test]
async fn test_connect() {
    let srv = Srv::new(
        200,
        r#"{"success": true, "agentId": "agent_test123", "onboarding": {}, "agentIdKey": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}"#,
    )
    .await;
    let client = EthysClient::new(srv.config()).unwrap();

    let resp = client
        .connect(&ConnectRequest {
            address: format!("0x{}", "1".repeat(40)),
            signature: format!("0x{}", "a".repeat(130)),
            message: "Test message".into(),
            token_contract: None,
            token_id: None,
        })
        .await
        .unwrap();
    assert!(resp.success);
    assert_eq!(resp.agent_id, "agent_test123");
    assert_eq!(resp.agent_id_key.unwrap().len(), 66);

    let req = srv.request();
    assert_eq!(req.method, "POST");
    assert_eq!(req.target, "/api/v1/402/connect");
    let body = req.json();
    assert_eq!(body["message"], "Test message");
    assert!(body.get("tokenContract").is_none());
}

#[tokio::test]
async fn test_connect_with_key_signs_default_message() {
    let srv = Srv::new(200, r#"{"success": true, "agentId": "agent_1"}"#).await;
    let client = EthysClient::new(srv.config()).unwrap();
    let (key, address) = crypto::generate_keypair();

    let resp = client.connect_with_key(&key, None).await.unwrap();
    assert_eq!(resp.agent_id, "agent_1");

    let body = srv.request().json();
    assert_eq!(body["address"], address.as_str());
    assert_eq!(body["message"], "Connect to ETHYS");
    let signature = body["signature"].as_str().unwrap();
    assert!(verify_signature(&address, "Connect to ETHYS", signature));
}

#[tokio::test]
async fn test_verify_payment() {
    let srv = Srv::new(
        200,
        r#"{"success": true, "agentId": "agent_test123", "activated": true, "apiKey": "test_api_key"}"#,
    )
    .await;
    let client = EthysClient::new(srv.config()).unwrap();

    let tx_hash = format!("0x{}", "1".repeat(64));
    let resp = client.verify_payment("agent_test123", &tx_hash).await.unwrap();
    assert!(resp.success);
    assert!(resp.activated);
    assert_eq!(resp.api_key.as_deref(), Some("test_api_key"));

    let body = srv.request().json();
    assert_eq!(body["agentId"], "agent_test123");
    assert_eq!(body["txHash"], tx_hash.as_str());
}

#[tokio::test]
async fn test_telemetry_signed_with_key() {
    let srv = Srv::new(
        200,
        r#"{"success": true, "recorded": 1, "agentId": "agent_test123"}"#,
    )
    .await;
    let client = EthysClient::new(srv.config()).unwrap();
    let (key, address) = crypto::generate_keypair();

    let events = vec![TelemetryEvent::new("test", 1234567890)];
    let resp = client
        .telemetry("agent_test123", &address, events, TelemetryOptions::with_private_key(key))
        .await
        .unwrap();
    assert!(resp.success);
    assert_eq!(resp.recorded, 1);

    let body = srv.request().json();
    assert_eq!(body["events"][0]["type"], "test");
    let ts = body["ts"].as_u64().unwrap();
    let nonce = body["nonce"].as_str().unwrap();
    assert_eq!(nonce.len(), 66);
    let message = build_telemetry_message(
        "agent_test123",
        &address,
        ts,
        nonce,
        body["events"].as_array().unwrap().as_slice(),
    );
    assert!(verify_signature(&address, &message, body["signature"].as_str().unwrap()));
}

#[tokio::test]
async fn test_telemetry_without_credentials_sends_nothing() {
    let client = EthysClient::new(ClientConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
    let err = client
        .telemetry("agent", &format!("0x{}", "1".repeat(40)), vec![], TelemetryOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_discovery_search_query() {
    let srv = Srv::new(
        200,
        r#"{"success": true, "agents": [{"agentId": "agent_test123", "tags": ["nlp"], "minTrust": 600}], "total": 1}"#,
    )
    .await;
    let client = EthysClient::new(srv.config()).unwrap();

    let resp = client
        .discovery_search(&DiscoveryQuery {
            tags: Some("nlp".into()),
            min_trust: Some(600),
            service_types: None,
        })
        .await
        .unwrap();
    assert!(resp.success);
    assert_eq!(resp.agents.len(), 1);
    assert_eq!(resp.total, Some(1));

    let req = srv.request();
    assert_eq!(req.target, "/api/v1/402/discovery/search?tags=nlp&minTrust=600");
}

#[tokio::test]
async fn test_trust_score_sends_bearer() {
    let srv = Srv::new(
        200,
        r#"{"success": true, "agentId": "agent_test123", "trustScore": {"rs": 750, "ci": 0.85}, "updatedAt": 1234567890}"#,
    )
    .await;
    let client = EthysClient::new(srv.config().with_api_key("test_key")).unwrap();

    let resp = client.trust_score(Some("agent_test123")).await.unwrap();
    assert_eq!(resp.trust_score["rs"], 750);
    assert_eq!(resp.updated_at, Some(1234567890));

    let req = srv.request();
    assert_eq!(req.target, "/api/v1/402/trust/score?agentId=agent_test123");
    assert_eq!(req.header("authorization"), Some("Bearer test_key"));
}

#[tokio::test]
async fn test_trust_attest() {
    let srv = Srv::new(200, r#"{"success": true, "attestationId": "att_1"}"#).await;
    let client = EthysClient::new(srv.config().with_api_key("test_key")).unwrap();

    let resp = client
        .trust_attest(&TrustAttestRequest {
            target_agent_id: "agent_2".into(),
            interaction_type: "task".into(),
            rating: Some(5),
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(resp["attestationId"], "att_1");

    let req = srv.request();
    assert_eq!(req.header("authorization"), Some("Bearer test_key"));
    let body = req.json();
    assert_eq!(body["targetAgentId"], "agent_2");
    assert_eq!(body["rating"], 5);
    assert!(body.get("notes").is_none());
}

#[tokio::test]
async fn test_error_401_is_auth() {
    let srv = Srv::new(401, r#"{"error": "Unauthorized"}"#).await;
    let client = EthysClient::new(srv.config()).unwrap();
    let err = client.trust_score(None).await.unwrap_err();
    assert!(matches!(err, Error::Auth(ref m) if m == "Unauthorized"));
}

#[tokio::test]
async fn test_error_400_is_validation() {
    let srv = Srv::new(400, r#"{"error": "Invalid request"}"#).await;
    let client = EthysClient::new(srv.config()).unwrap();
    let err = client
        .connect(&ConnectRequest {
            address: "invalid".into(),
            signature: format!("0x{}", "a".repeat(130)),
            message: "Test".into(),
            token_contract: None,
            token_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_error_500_is_api_error() {
    let srv = Srv::new(500, r#"{"error": "Internal server error"}"#).await;
    let client = EthysClient::new(srv.config()).unwrap();
    let err = client.get_info().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_invalid_json_is_validation() {
    let srv = Srv::new(200, "not json").await;
    let client = EthysClient::new(srv.config()).unwrap();
    let err = client.get_info().await.unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m.contains("invalid JSON")));
}

#[tokio::test]
async fn test_connection_refused_is_network() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(&format!("http://{addr}"))
        .unwrap()
        .with_timeout(Duration::from_secs(5));
    let client = EthysClient::new(config).unwrap();
    let err = client.get_info().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn test_slow_server_is_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app: Router = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "{}"
    });
    let _server = tokio::spawn(std::future::IntoFuture::into_future(axum::serve(listener, app)));

    let config = ClientConfig::new(&format!("http://{addr}"))
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let client = EthysClient::new(config).unwrap();
    let err = client.get_info().await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
}

#[test]
fn test_blocking_get_info() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let srv = rt.block_on(Srv::new(200, INFO_BODY));

    let client = BlockingEthysClient::new(srv.config()).unwrap();
    let info = client.get_info().unwrap();
    assert_eq!(info.version, "1.0.0");

    assert_eq!(srv.request().target, "/api/v1/402/info");
}
