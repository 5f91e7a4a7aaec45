use std::sync::Arc;

use axum::http::Response;

use crate::{
    error::{BoosterError, Res},
    AppState, Resp,
};

use super::{ingest::load_feed, Pack};

fn json<T: serde::Serialize>(value: &T) -> Response<String> {
    match serde_json::ser::to_string(value) {
        Ok(body) => Response::new(body),
        Err(e) => Resp::e500(format!("Failed to JSON encode response: {e}")),
    }
}

pub async fn handle_booster_request(state: Arc<AppState>, set: String) -> Response<String> {
    let result = state
        .generator
        .generate_booster(&set, &mut rand::thread_rng());
    booster_response(result)
}

fn booster_response(result: Res<Pack>) -> Response<String> {
    match result {
        Ok(pack) => json(&pack),
        Err(e @ BoosterError::UnknownSet(_)) => Resp::e422(e),
        Err(e) => Resp::e500(e),
    }
}

pub async fn handle_reload_request(state: Arc<AppState>) -> Response<String> {
    let document = match load_feed(&state.data).await {
        Ok(Some(document)) => document,
        Ok(None) => return Resp::e422("No booster rules feed in data directory."),
        Err(e) => return Resp::e500(format!("Failed to load booster rules: {e}")),
    };

    let sha = document.sha.clone();
    let generator = Arc::clone(&state);
    let refreshed =
        match tokio::task::spawn_blocking(move || generator.generator.refresh_rules(&document)).await {
            Ok(refreshed) => refreshed,
            Err(e) => return Resp::e500(format!("Booster rules ingestion failed: {e}")),
        };

    if refreshed {
        Resp::ok(format!("Booster rules updated to {sha}."))
    } else {
        Resp::ok(format!("Booster rules already at {sha}."))
    }
}

pub async fn handle_version_request(state: Arc<AppState>) -> Response<String> {
    json(&state.generator.rules().version())
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_unknown_set_response() {
        let resp = booster_response(Err(BoosterError::UnknownSet("NOPE".to_string())));
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(resp.body().contains("NOPE does not exist"));
        assert!(resp.body().contains("\"success\":false"));
    }

    #[test]
    fn test_booster_response() {
        let resp = booster_response(Ok(Vec::new()));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body(), "[]");
    }
}
