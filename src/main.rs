use std::{
    path::{Path as FsPath, PathBuf},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{Response, StatusCode},
    routing::{get, post},
    Router,
};
use boosters::{ingest::load_feed, BoosterGenerator};
use cards::CardDatabase;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

mod boosters;
mod cards;
mod error;
mod sets;

#[derive(serde::Serialize)]
struct Resp {
    message: String,
    success: bool,
}

impl Resp {
    fn axum<S: ToString>(message: S, status: StatusCode) -> Response<String> {
        match serde_json::ser::to_string(&Self {
            message: message.to_string(),
            success: status == StatusCode::OK,
        }) {
            Ok(body) => {
                let mut resp = Response::new(body);
                *resp.status_mut() = status;
                resp
            }
            Err(e) => {
                let mut resp = Response::new(format!("Failed to JSON encode response: {e}"));
                *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                resp
            }
        }
    }

    fn ok<S: ToString>(message: S) -> Response<String> {
        Self::axum(message, StatusCode::OK)
    }

    fn e422<S: ToString>(message: S) -> Response<String> {
        Self::axum(message, StatusCode::UNPROCESSABLE_ENTITY)
    }

    fn e500<S: ToString>(message: S) -> Response<String> {
        Self::axum(message, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub struct AppState {
    generator: BoosterGenerator,

    /// Directory holding the card, set and booster rule data.
    data: PathBuf,
}

async fn booster_handler(
    State(state): State<Arc<AppState>>,
    Path(set): Path<String>,
) -> Response<String> {
    boosters::handlers::handle_booster_request(state, set).await
}

async fn reload_handler(State(state): State<Arc<AppState>>) -> Response<String> {
    boosters::handlers::handle_reload_request(state).await
}

async fn version_handler(State(state): State<Arc<AppState>>) -> Response<String> {
    boosters::handlers::handle_version_request(state).await
}

async fn load_card_database(data: &FsPath) -> Result<CardDatabase, String> {
    let cards = cards::mtgjson::load_cards(&data.join("cards.json")).await?;
    tracing::debug!("Inserting card data to card database.");
    let mut database = CardDatabase::new();
    for card in cards {
        database.add(card);
    }
    tracing::debug!(
        "Succesfully populated card database with {} cards.",
        database.size()
    );
    Ok(database)
}

async fn load_generator(data: &FsPath) -> Result<BoosterGenerator, String> {
    let catalog = load_card_database(data).await?;
    let sets = sets::load_sets(&data.join("sets.json"), &catalog).await?;
    tracing::debug!("Loaded {} sets.", sets.size());

    let generator = BoosterGenerator::new(catalog, sets);
    if let Some(document) = load_feed(data).await? {
        generator.refresh_rules(&document);
    }
    Ok(generator)
}

#[tokio::main]
async fn main() {
    const USAGE: &str = "Usage: server <data path> <port>";

    let data = std::env::args().nth(1).expect(USAGE);
    let port = std::env::args()
        .nth(2)
        .map(|s| {
            s.parse::<u16>()
                .unwrap_or_else(|_| panic!("Invalid port number: {s}"))
        })
        .expect(USAGE);

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let data = PathBuf::from(data);
    let generator = match load_generator(&data).await {
        Ok(generator) => generator,
        Err(e) => panic!("Failed to load card data: {e}"),
    };

    let app = Router::new()
        .route("/api/booster/:set", get(booster_handler))
        .route("/api/rules/reload", post(reload_handler))
        .route("/api/rules/version", get(version_handler))
        .with_state(Arc::new(AppState { generator, data }))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap_or_else(|_| panic!("Failed to open port {port}"));

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Closed due to error: {e}");
    }
}
