use axum::{
    Router,
    routing::{get, post},
};
use axum_extra::headers::{Error as AxumError, Header};

use std::sync::Arc;

use crate::{transactions, transfers};
use engine::Engine;

static ACTING_USER_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("acting-user");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the acting principal.
///
/// Transfer requests must carry an "acting-user" entry in the header; the
/// value is the initiating username the engine resolves and authorizes.
#[derive(Debug)]
pub struct ActingUser(pub String);

impl Header for ActingUser {
    fn name() -> &'static axum::http::HeaderName {
        &ACTING_USER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(ActingUser(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode acting-user header"),
        }
    }
}

/// Builds the application router around an engine.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/transfers", post(transfers::create))
        .route("/transactions/{id}", get(transactions::get_by_id))
        .route("/transactions/query", post(transactions::query))
        .route(
            "/users/{user_id}/transactions/query",
            post(transactions::query_by_user),
        )
        .route(
            "/accounts/{number}/transactions/query",
            post(transactions::query_by_account),
        )
        .with_state(state)
}

/// Binds `addr` and serves until the listener fails.
pub async fn run(engine: Engine, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(engine)).await
}
