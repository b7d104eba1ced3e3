use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use stake_pool_query::{
    proxy::{QueryProxy, QueryProxyMock},
    query::QueryRequest,
};
use tokio::sync::{oneshot, Mutex};

pub const QUERY_PATH: &str = "/v1/query";

/// What the proxy saw of one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

struct ProxyState {
    api_key: String,
    mock: QueryProxyMock,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// HTTP query proxy on a local port. Requests carrying `api_key` are answered by a
/// [`QueryProxyMock`]; any other key gets a 403.
pub struct FakeQueryProxy {
    addr: SocketAddr,
    state: Arc<ProxyState>,
    ct: Option<oneshot::Sender<()>>,
}

impl FakeQueryProxy {
    pub fn serve(api_key: &str, mock: QueryProxyMock) -> Self {
        let (ct, ctrx) = oneshot::channel::<()>();
        let state = Arc::new(ProxyState {
            api_key: api_key.to_string(),
            mock,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route(QUERY_PATH, post(handle_query))
            .with_state(state.clone());

        let tcp = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = tcp.local_addr().unwrap();
        let server = axum::Server::from_tcp(tcp)
            .unwrap()
            .serve(app.into_make_service());
        tokio::spawn(async move {
            let graceful = server.with_graceful_shutdown(async {
                ctrx.await.ok();
            });
            let _ = graceful.await;
        });

        Self {
            addr,
            state,
            ct: Some(ct),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, QUERY_PATH)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }
}

impl Drop for FakeQueryProxy {
    fn drop(&mut self) {
        let _ = self.ct.take().map(|ct| ct.send(()));
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn handle_query(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let api_key = header(&headers, "x-api-key");
    state.requests.lock().await.push(RecordedRequest {
        api_key: api_key.clone(),
        content_type: header(&headers, "content-type"),
        body: body.clone(),
    });
    if api_key.as_deref() != Some(state.api_key.as_str()) {
        return (StatusCode::FORBIDDEN, "invalid api key").into_response();
    }

    let request = body
        .get("bytes")
        .and_then(Value::as_str)
        .and_then(|bytes| hex::decode(bytes).ok())
        .and_then(|bytes| QueryRequest::from_bytes(&bytes).ok());
    let Some(request) = request else {
        return (StatusCode::BAD_REQUEST, "invalid query request").into_response();
    };
    match state.mock.query(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
