//! Throwaway inference service on an ephemeral port
//!
//! Serves `GET /api/health` and `POST /api/identify` with scripted bodies,
//! recording call counts and the multipart fields it received.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Scripted service behavior
#[derive(Debug, Clone)]
pub struct FakeServiceConfig {
    /// `None` answers the health check with HTTP 500
    pub health_status: Option<&'static str>,
    pub health_delay: Duration,
    pub identify_status: u16,
    pub identify_body: Value,
    pub identify_delay: Duration,
}

impl Default for FakeServiceConfig {
    fn default() -> Self {
        Self {
            health_status: Some("healthy"),
            health_delay: Duration::ZERO,
            identify_status: 200,
            identify_body: default_identify_body(),
            identify_delay: Duration::ZERO,
        }
    }
}

/// Neem at 91% with Moringa as alternative
pub fn default_identify_body() -> Value {
    json!({
        "plant": {
            "id": "2",
            "scientific_name": "Azadirachta indica",
            "common_names": {"fr": "Neem", "local": ["Margousier"]},
            "family": "Meliaceae",
            "genus": "Azadirachta",
            "species": "Azadirachta indica",
            "description": "Arbre à croissance rapide",
            "plant_type": "arbre",
            "parts_used": ["feuilles", "écorce"]
        },
        "confidence": 91.0,
        "alternatives": [
            {"plant": {"id": "3", "scientific_name": "Moringa oleifera"}, "confidence": 41.5}
        ],
        "medicinal_info": {
            "summary": "Utilisé contre le paludisme",
            "diseases_treated": ["paludisme"],
            "formatted_response": "Neem: antipaludique"
        },
        "user_intent": "medecine"
    })
}

/// Multipart field as received by the service
#[derive(Debug, Clone)]
pub struct ReceivedField {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

struct ServiceState {
    config: FakeServiceConfig,
    health_calls: AtomicUsize,
    identify_calls: AtomicUsize,
    last_fields: Mutex<HashMap<String, ReceivedField>>,
}

/// Running fake service
pub struct FakeService {
    pub base_url: String,
    state: Arc<ServiceState>,
}

impl FakeService {
    pub async fn start(config: FakeServiceConfig) -> Self {
        let state = Arc::new(ServiceState {
            config,
            health_calls: AtomicUsize::new(0),
            identify_calls: AtomicUsize::new(0),
            last_fields: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/api/health", get(health))
            .route("/api/identify", post(identify))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn health_calls(&self) -> usize {
        self.state.health_calls.load(Ordering::SeqCst)
    }

    pub fn identify_calls(&self) -> usize {
        self.state.identify_calls.load(Ordering::SeqCst)
    }

    /// Field from the most recent identify request
    pub fn field(&self, name: &str) -> Option<ReceivedField> {
        self.state.last_fields.lock().unwrap().get(name).cloned()
    }

    pub fn text_field(&self, name: &str) -> Option<String> {
        self.field(name)
            .map(|f| String::from_utf8_lossy(&f.data).into_owned())
    }
}

async fn health(State(state): State<Arc<ServiceState>>) -> Response {
    state.health_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(state.config.health_delay).await;

    match state.config.health_status {
        Some(status) => Json(json!({"status": status, "services": {}})).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn identify(State(state): State<Arc<ServiceState>>, mut multipart: Multipart) -> Response {
    state.identify_calls.fetch_add(1, Ordering::SeqCst);

    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.insert(name, ReceivedField { content_type, data });
    }
    *state.last_fields.lock().unwrap() = fields;

    tokio::time::sleep(state.config.identify_delay).await;

    let status = StatusCode::from_u16(state.config.identify_status).unwrap();
    (status, Json(state.config.identify_body.clone())).into_response()
}

/// Base URL of a port with nothing listening
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
