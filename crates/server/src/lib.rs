use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ActingUser, router, run, run_with_listener};

mod server;
mod transactions;
mod transfers;

pub mod types {
    pub use api_types::ErrorResponse;
    pub use api_types::page::PageResponse;
    pub use api_types::transaction::{TransactionQuery, TransactionView};
    pub use api_types::transfer::TransferNew;
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::UserNotFound(_)
        | EngineError::AccountNotFound(_)
        | EngineError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::TransactionAlreadyExists(_) => StatusCode::CONFLICT,
        EngineError::NotAuthorized(_) => StatusCode::FORBIDDEN,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidTransaction(_)
        | EngineError::ExternalTransferNotSupported
        | EngineError::SameAccount
        | EngineError::SavingsTransferRestricted
        | EngineError::AbsoluteLimitExceeded
        | EngineError::DailyLimitExceeded
        | EngineError::TransactionLimitExceeded => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: &EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                types::ErrorResponse {
                    error: message_for_engine_error(&err),
                    code: err.code().to_string(),
                },
            ),
            ServerError::Generic(err) => (
                StatusCode::BAD_REQUEST,
                types::ErrorResponse {
                    error: err,
                    code: "bad_request".to_string(),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res =
            ServerError::from(EngineError::UserNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::TransactionAlreadyExists("x".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_not_authorized_maps_to_403() {
        let res =
            ServerError::from(EngineError::NotAuthorized("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_rule_rejections_map_to_422() {
        for err in [
            EngineError::InvalidTransaction("x".to_string()),
            EngineError::ExternalTransferNotSupported,
            EngineError::SameAccount,
            EngineError::SavingsTransferRestricted,
            EngineError::AbsoluteLimitExceeded,
            EngineError::DailyLimitExceeded,
            EngineError::TransactionLimitExceeded,
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }
}
