//! HTTP submit/query endpoints.

use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sms_gateway_core::{GatewayError, QueryRequest, QueryResult, SubmitRequest, SubmitResult};

use crate::router::AppState;

/// HTTP rendering of [`GatewayError`]: mapped status plus a JSON error body.
pub struct ApiError(pub GatewayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Upstream { transient: true, .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Upstream { transient: false, .. } => StatusCode::BAD_GATEWAY,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

/// `POST`/`PUT {prefix}/send` - submit a message from a multipart form.
///
/// Recognized fields: `to`, `from`, `text`, `enc` (`latin1`/`ucs2`),
/// `register` (request a delivery receipt). Unknown fields are ignored.
pub async fn send(
    State(state): State<AppState>,
    mut form: Multipart,
) -> Result<Json<SubmitResult>, ApiError> {
    let mut req = SubmitRequest {
        to: String::new(),
        from: String::new(),
        text: String::new(),
        encoding: None,
        register: false,
    };

    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| GatewayError::Validation(format!("malformed form: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| GatewayError::Validation(format!("unreadable field {name}: {e}")))?;
        match name.as_str() {
            "to" => req.to = value,
            "from" => req.from = value,
            "text" => req.text = value,
            "enc" => {
                req.encoding = Some(value.parse().map_err(GatewayError::Validation)?);
            }
            "register" => req.register = matches!(value.as_str(), "1" | "true" | "final"),
            _ => {}
        }
    }

    let result = state.bridge.submit(&req).await?;
    Ok(Json(result))
}

/// Query-string form of [`QueryRequest`]; a missing id falls through to the
/// bridge's own validation so the error body stays uniform.
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    message_id: String,
}

/// `GET`/`HEAD {prefix}/query` - delivery-status lookup.
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<QueryResult>, ApiError> {
    let req = QueryRequest {
        message_id: params.message_id,
    };
    let result = state.bridge.query(&req).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        let cases = [
            (GatewayError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (GatewayError::NotFound("m1".into()), StatusCode::NOT_FOUND),
            (
                GatewayError::Upstream { detail: "t".into(), transient: true },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                GatewayError::Upstream { detail: "p".into(), transient: false },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
