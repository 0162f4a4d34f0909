use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Models served even when no custom model is configured.
pub const SUPPORTED_MODELS: [&str; 3] = ["gpt-4", "gpt-4.1", "gpt-4o"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Yongshen {
    pub text: String,
    pub yiju: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: u32,
    pub record_id: Uuid,
    pub question: String,
    pub model: String,
    pub timestamp: String,
    pub yongshen: Option<Yongshen>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomModel {
    pub id: u32,
    pub name: String,
    pub api_url: String,
    pub api_key: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub hexagram_info: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub user_yongshen: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchModelsRequest {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct AddModelRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub description: String,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

pub struct AppState {
    records: RwLock<Vec<HistoryRecord>>,
    custom_models: RwLock<Vec<CustomModel>>,
    next_record_id: AtomicU32,
    next_model_id: AtomicU32,
}

impl AppState {
    fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            custom_models: RwLock::new(Vec::new()),
            next_record_id: AtomicU32::new(1),
            next_model_id: AtomicU32::new(1),
        }
    }
}

pub type Db = Arc<AppState>;

pub fn app() -> Router {
    let db: Db = Arc::new(AppState::new());
    let api = Router::new()
        .route("/analyze", post(analyze))
        .route("/chat", post(chat))
        .route("/history", get(history))
        .route("/history/{record_id}", delete(delete_history))
        .route("/health", get(health))
        .route("/models", get(models))
        .route("/settings/fetch-models", post(fetch_models))
        .route("/settings/models", get(custom_models).post(add_model))
        .route("/settings/models/{id}", delete(delete_model));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

async fn analyze(
    State(db): State<Db>,
    Json(input): Json<AnalyzeRequest>,
) -> (StatusCode, Json<Value>) {
    if input.question.is_empty() || input.hexagram_info.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "question and hexagram_info are required"})),
        );
    }

    let record = HistoryRecord {
        id: db.next_record_id.fetch_add(1, Ordering::Relaxed),
        record_id: Uuid::new_v4(),
        question: input.question,
        model: input.model,
        timestamp: now(),
        yongshen: input.user_yongshen.map(|text| Yongshen {
            text,
            yiju: "user specified".to_string(),
        }),
    };
    let record_id = record.record_id;
    db.records.write().await.push(record);

    (
        StatusCode::OK,
        Json(json!({"success": true, "record_id": record_id})),
    )
}

async fn chat(Json(input): Json<ChatRequest>) -> (StatusCode, Json<Value>) {
    if input.messages.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "messages must not be empty"})),
        );
    }

    let content = input
        .messages
        .last()
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let reply = format!("mock reply from {}: {content}", input.model);

    (
        StatusCode::OK,
        Json(json!({"success": true, "response": reply})),
    )
}

async fn history(State(db): State<Db>) -> Json<Value> {
    let records = db.records.read().await;
    let newest_first: Vec<&HistoryRecord> = records.iter().rev().collect();
    Json(json!({"records": newest_first}))
}

async fn delete_history(
    State(db): State<Db>,
    Path(record_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut records = db.records.write().await;
    let before = records.len();
    records.retain(|record| record.record_id.to_string() != record_id);
    if records.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "record not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "record deleted"})),
    )
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn models(State(db): State<Db>) -> Json<Value> {
    let mut names: Vec<String> = SUPPORTED_MODELS.iter().map(|name| name.to_string()).collect();
    let custom = db.custom_models.read().await;
    names.extend(custom.iter().map(|model| model.name.clone()));
    Json(json!({"models": names}))
}

async fn fetch_models(Json(input): Json<FetchModelsRequest>) -> (StatusCode, Json<Value>) {
    if input.api_url.is_empty() || input.api_key.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "apiUrl and apiKey are required"})),
        );
    }
    // A real backend would query the remote provider here; the double
    // reports an empty catalogue.
    (
        StatusCode::OK,
        Json(json!({"success": true, "models": []})),
    )
}

async fn custom_models(State(db): State<Db>) -> Json<Value> {
    let models = db.custom_models.read().await;
    Json(json!({"models": &*models}))
}

async fn add_model(
    State(db): State<Db>,
    Json(input): Json<AddModelRequest>,
) -> (StatusCode, Json<Value>) {
    if input.name.is_empty() || input.api_url.is_empty() || input.api_key.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "name, api_url and api_key are required"})),
        );
    }

    let model = CustomModel {
        id: db.next_model_id.fetch_add(1, Ordering::Relaxed),
        name: input.name,
        api_url: input.api_url,
        api_key: input.api_key,
        description: input.description,
        created_at: now(),
    };
    db.custom_models.write().await.push(model);

    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "model added"})),
    )
}

async fn delete_model(State(db): State<Db>, Path(id): Path<u32>) -> (StatusCode, Json<Value>) {
    let mut models = db.custom_models.write().await;
    let before = models.len();
    models.retain(|model| model.id != id);
    if models.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "model not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "model deleted"})),
    )
}
