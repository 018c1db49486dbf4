use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use rest_client::{
    CallOptions, ClientConfig, ClientError, HeaderMap, Method, OAuthCredentials, ProgressRelay,
    ProgressSnapshot, RequestDescriptor, RequestDispatcher, RequestSigner, StatusCode, Transport,
    TransportError, TransportRequest, TransportResponse,
};
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};

/// In-memory transport: records every request and replays a canned outcome
struct ScriptedTransport {
    outcome: Box<dyn Fn() -> Result<TransportResponse, TransportError> + Send + Sync>,
    progress: Vec<ProgressSnapshot>,
    seen: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    fn respond(status: u16, body: Option<Value>) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        Self {
            outcome: Box::new(move || {
                Ok(TransportResponse {
                    status,
                    headers: HeaderMap::new(),
                    body: body.clone(),
                })
            }),
            progress: Vec::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn fail(message: &'static str) -> Self {
        Self {
            outcome: Box::new(move || Err(TransportError::Other(message.to_owned()))),
            progress: Vec::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn with_progress(mut self, progress: Vec<ProgressSnapshot>) -> Self {
        self.progress = progress;
        self
    }

    fn requests(&self) -> Vec<TransportRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: TransportRequest,
        progress: &ProgressRelay,
    ) -> Result<TransportResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        for snapshot in &self.progress {
            tokio::task::yield_now().await;
            progress.emit(snapshot);
        }
        (self.outcome)()
    }
}

/// Signer with a constant header that remembers what it was asked to sign
#[derive(Default)]
struct FixedSigner {
    calls: Mutex<Vec<(Method, String, Option<Value>, String)>>,
}

impl RequestSigner for FixedSigner {
    fn sign(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        credentials: &OAuthCredentials<'_>,
    ) -> Result<String, ClientError> {
        self.calls.lock().unwrap().push((
            method.clone(),
            url.to_owned(),
            body.cloned(),
            credentials.consumer_key.to_owned(),
        ));
        Ok("OAuth oauth_signature=\"fixed\"".to_owned())
    }
}

fn config() -> ClientConfig {
    ClientConfig::new("https://shop.example.com/rest", "V1", "ck", "cs", "at", "ats")
}

fn dispatcher(transport: &Arc<ScriptedTransport>) -> RequestDispatcher {
    RequestDispatcher::with_transport(config(), transport.clone())
}

fn authorization(request: &TransportRequest) -> String {
    request.headers["authorization"].to_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_get_with_bearer_token_resolves_body() {
    let transport = Arc::new(ScriptedTransport::respond(200, Some(json!({"id": 42}))));
    let client = dispatcher(&transport);

    let body = client
        .get("/users/42", CallOptions::new().bearer("tok123"))
        .await
        .unwrap();
    assert_eq!(body, json!({"id": 42}));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].url, "https://shop.example.com/rest/V1/users/42");
    assert_eq!(authorization(&requests[0]), "Bearer tok123");
    assert!(requests[0].body.is_none());
}

#[tokio::test]
async fn test_missing_or_empty_token_signs_with_oauth() {
    let transport = Arc::new(ScriptedTransport::respond(200, Some(json!([]))));
    let client = dispatcher(&transport);

    assert_ok!(client.get("/products", CallOptions::new()).await);
    assert_ok!(client.get("/products", CallOptions::new().bearer("")).await);

    for request in transport.requests() {
        let header = authorization(&request);
        assert!(header.starts_with("OAuth oauth_consumer_key=\"ck\", "), "{header}");
        assert!(header.contains("oauth_token=\"at\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(!header.contains("Bearer"));
    }
}

#[tokio::test]
async fn test_injected_signer_sets_authorization() {
    let transport = Arc::new(ScriptedTransport::respond(200, Some(json!("abc123token"))));
    let signer = Arc::new(FixedSigner::default());
    let client = dispatcher(&transport).signer(signer.clone());

    assert_ok!(client.consumer_token(&json!({"username": "jane@example.com"})).await);
    assert_ok!(client.get("/me", CallOptions::new().bearer("tok123")).await);

    let requests = transport.requests();
    assert_eq!(authorization(&requests[0]), "OAuth oauth_signature=\"fixed\"");
    assert_eq!(authorization(&requests[1]), "Bearer tok123");

    // The bearer call never reaches the signer
    let calls = signer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Method::POST);
    assert_eq!(
        calls[0].1,
        "https://shop.example.com/rest/V1/integration/customer/token"
    );
    assert_eq!(calls[0].2, Some(json!({"username": "jane@example.com"})));
    assert_eq!(calls[0].3, "ck");
}

#[tokio::test]
async fn test_verbs_and_bodies() {
    let transport = Arc::new(ScriptedTransport::respond(200, Some(json!(true))));
    let client = dispatcher(&transport);
    let opts = || CallOptions::new().bearer("t");

    assert_ok!(client.post("/carts/mine/items", &json!({"sku": "24-MB01"}), opts()).await);
    assert_ok!(client.put("/carts/mine/items/7", &json!({"qty": 2}), opts()).await);
    assert_ok!(client.delete("/carts/mine/items/7", opts()).await);

    let requests = transport.requests();
    let verbs: Vec<&Method> = requests.iter().map(|r| &r.method).collect();
    assert_eq!(verbs, vec![&Method::POST, &Method::PUT, &Method::DELETE]);
    assert_eq!(requests[0].body, Some(json!({"sku": "24-MB01"})));
    assert_eq!(requests[1].body, Some(json!({"qty": 2})));
    assert_eq!(requests[2].body, None);
    assert_eq!(
        requests[2].url,
        "https://shop.example.com/rest/V1/carts/mine/items/7"
    );
}

#[tokio::test]
async fn test_consumer_token_always_signs() {
    let transport = Arc::new(ScriptedTransport::respond(200, Some(json!("abc123token"))));
    let client = dispatcher(&transport);

    let token = client
        .consumer_token(&json!({"username": "jane@example.com", "password": "pw"}))
        .await
        .unwrap();
    assert_eq!(token, json!("abc123token"));

    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(
        requests[0].url,
        "https://shop.example.com/rest/V1/integration/customer/token"
    );
    assert_eq!(
        requests[0].body,
        Some(json!({"username": "jane@example.com", "password": "pw"}))
    );
    assert!(authorization(&requests[0]).starts_with("OAuth "));
}

#[tokio::test]
async fn test_every_2xx_resolves() {
    for status in [200, 201, 202, 204, 250, 299] {
        let transport = Arc::new(ScriptedTransport::respond(status, Some(json!({"ok": status}))));
        let body = dispatcher(&transport)
            .get("/x", CallOptions::new())
            .await
            .unwrap();
        assert_eq!(body, json!({"ok": status}));
    }
}

#[tokio::test]
async fn test_non_2xx_rejects_with_status() {
    for status in [100, 199, 300, 302, 399, 400, 401, 404, 500, 503, 599] {
        let transport = Arc::new(ScriptedTransport::respond(status, None));
        let err = dispatcher(&transport)
            .get("/x", CallOptions::new())
            .await
            .unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!(api.status().as_u16(), status);
        assert_eq!(api.message(), format!("HTTP ERROR {status}"));
    }
}

#[tokio::test]
async fn test_success_with_empty_body_resolves_null() {
    let transport = Arc::new(ScriptedTransport::respond(204, None));
    let body = dispatcher(&transport)
        .delete("/x", CallOptions::new())
        .await
        .unwrap();
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_error_template_is_interpolated() {
    let transport = Arc::new(ScriptedTransport::respond(
        400,
        Some(json!({"message": "Invalid %1", "parameters": ["email"]})),
    ));
    let err = dispatcher(&transport)
        .post("/customers", &json!({}), CallOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid email");
    let api = err.as_api().unwrap();
    assert_eq!(api.status(), StatusCode::BAD_REQUEST);
    assert_eq!(api.body().unwrap()["parameters"], json!(["email"]));
}

#[tokio::test]
async fn test_error_without_message_is_generic() {
    let transport = Arc::new(ScriptedTransport::respond(500, None));
    let err = dispatcher(&transport)
        .get("/x", CallOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.as_api().unwrap().message(), "HTTP ERROR 500");
}

/// A failed status settles the call once, as an error. The response body is
/// only reachable through the error, never also returned as a value.
#[tokio::test]
async fn test_error_status_only_rejects() {
    let transport = Arc::new(ScriptedTransport::respond(
        404,
        Some(json!({"message": "Not here"})),
    ));
    let result = dispatcher(&transport).get("/x", CallOptions::new()).await;
    let err = assert_err!(result);
    assert!(err.is_api());
    assert_eq!(err.as_api().unwrap().body(), Some(&json!({"message": "Not here"})));
}

#[tokio::test]
async fn test_transport_failure_is_not_api_error() {
    let transport = Arc::new(ScriptedTransport::fail("connection reset by peer"));
    let err = dispatcher(&transport)
        .get("/users/42", CallOptions::new().bearer("tok123"))
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.as_api().is_none());
    assert!(matches!(
        err,
        ClientError::Transport(TransportError::Other(ref m)) if m == "connection reset by peer"
    ));
}

#[tokio::test]
async fn test_progress_forwarded_in_order() {
    let snapshots: Vec<ProgressSnapshot> = [100, 400, 1000]
        .into_iter()
        .enumerate()
        .map(|(i, n)| {
            ProgressSnapshot::measure(n, Some(1000), Duration::from_millis(100 * (i as u64 + 1)))
        })
        .collect();
    let transport = Arc::new(
        ScriptedTransport::respond(200, Some(json!({"done": true}))).with_progress(snapshots.clone()),
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let options = CallOptions::new().on_progress(move |s| sink.lock().unwrap().push(s.clone()));

    assert_ok!(dispatcher(&transport).get("/export", options).await);
    assert_eq!(*seen.lock().unwrap(), snapshots);
}

#[tokio::test]
async fn test_progress_without_callback_is_ignored() {
    let transport = Arc::new(
        ScriptedTransport::respond(200, Some(json!(1)))
            .with_progress(vec![ProgressSnapshot::measure(1, Some(1), Duration::ZERO)]),
    );
    assert_ok!(dispatcher(&transport).get("/x", CallOptions::new()).await);
}

#[tokio::test]
async fn test_concurrent_calls_share_dispatcher() {
    let transport = Arc::new(ScriptedTransport::respond(200, Some(json!({"ok": true}))));
    let client = Arc::new(dispatcher(&transport));

    let calls = (0..8).map(|i| {
        let client = client.clone();
        async move { client.get(&format!("/items/{i}"), CallOptions::new()).await }
    });
    for result in join_all(calls).await {
        assert_eq!(result.unwrap(), json!({"ok": true}));
    }

    let mut urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    urls.sort();
    assert_eq!(urls.len(), 8);
    assert_eq!(urls[0], "https://shop.example.com/rest/V1/items/0");

    // Each signed call carries its own nonce
    let headers: std::collections::HashSet<String> =
        transport.requests().iter().map(authorization).collect();
    assert_eq!(headers.len(), 8);
}

#[tokio::test]
async fn test_api_call_with_prebuilt_descriptor() {
    let transport = Arc::new(ScriptedTransport::respond(200, Some(json!({"id": 7}))));
    let client = dispatcher(&transport);
    let request = RequestDescriptor::new(Method::PUT, client.build_url("/products/7"))
        .with_body(json!({"product": {"price": 10}}));

    let body = client.api_call(request, CallOptions::new().bearer("t")).await.unwrap();
    assert_eq!(body, json!({"id": 7}));
    assert_eq!(
        transport.requests()[0].body,
        Some(json!({"product": {"price": 10}}))
    );
}
