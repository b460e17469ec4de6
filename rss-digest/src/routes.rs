use crate::service::DigestService;
use crate::store::ArticleStore;
use crate::types::{AggregatorError, Article, Preferences, Source};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Debug, Serialize, Deserialize)]
pub struct Summaries {
    pub summaries: Vec<Article>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomePage {
    /// Saved source selection, by name
    pub sources: Vec<String>,
    pub keywords: Vec<String>,
    pub summaries: Vec<Article>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub sources: Vec<Source>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleRef {
    pub id: String,
}

fn message(text: &str) -> Json<serde_json::Value> {
    Json(json!({ "message": text }))
}

impl IntoResponse for AggregatorError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

type AppState<S> = State<Arc<DigestService<S>>>;

pub fn create_router<S>(service: Arc<DigestService<S>>) -> Router
where
    S: ArticleStore + 'static,
{
    Router::new()
        .route("/", get(home::<S>))
        .route("/index", get(index_page::<S>))
        .route("/config", get(catalog::<S>))
        .route("/all_articles", get(all_articles::<S>))
        .route("/save_preferences", post(save_preferences::<S>))
        .route("/read_later", get(read_later::<S>))
        .route("/add_to_read_later", post(add_to_read_later::<S>))
        .route("/remove_from_read_later", post(remove_from_read_later::<S>))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn home<S: ArticleStore>(State(service): AppState<S>) -> Result<Json<HomePage>, AggregatorError> {
    let (preferences, summaries) = service.filtered_view().await?;
    Ok(Json(HomePage {
        sources: preferences.sources,
        keywords: preferences.keywords,
        summaries,
    }))
}

async fn index_page<S: ArticleStore>(State(service): AppState<S>) -> Response {
    let path = &service.config().index_html;
    match tokio::fs::read_to_string(path).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!("Cannot serve {}: {}", path.display(), e);
            (StatusCode::NOT_FOUND, Json(json!({ "error": "Index page not found" }))).into_response()
        }
    }
}

async fn catalog<S: ArticleStore>(State(service): AppState<S>) -> Json<Catalog> {
    let config = service.config();
    Json(Catalog {
        sources: config.sources.clone(),
        keywords: config.keywords.clone(),
    })
}

async fn all_articles<S: ArticleStore>(
    State(service): AppState<S>,
) -> Result<Json<Summaries>, AggregatorError> {
    Ok(Json(Summaries {
        summaries: service.filtered_articles().await?,
    }))
}

async fn save_preferences<S: ArticleStore>(
    State(service): AppState<S>,
    Json(preferences): Json<Preferences>,
) -> Result<impl IntoResponse, AggregatorError> {
    let added = service.save_preferences(preferences).await?;
    info!("Preferences saved, {} new articles", added);
    Ok(message("Preferences saved"))
}

async fn read_later<S: ArticleStore>(
    State(service): AppState<S>,
) -> Result<Json<Summaries>, AggregatorError> {
    Ok(Json(Summaries {
        summaries: service.read_later_articles().await?,
    }))
}

async fn add_to_read_later<S: ArticleStore>(
    State(service): AppState<S>,
    Json(article): Json<ArticleRef>,
) -> Result<impl IntoResponse, AggregatorError> {
    service.add_to_read_later(article.id).await?;
    Ok(message("Added to Read Later list"))
}

async fn remove_from_read_later<S: ArticleStore>(
    State(service): AppState<S>,
    Json(article): Json<ArticleRef>,
) -> Result<impl IntoResponse, AggregatorError> {
    service.remove_from_read_later(article.id).await?;
    Ok(message("Removed from Read Later list"))
}
