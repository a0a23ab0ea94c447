use super::*;

pub(super) fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"ok": false, "error": "unauthorized"})),
    )
        .into_response()
}

fn failure(status: StatusCode, error: String) -> Response {
    (
        status,
        Json(MutationResponse {
            ok: false,
            error: Some(error),
            ..MutationResponse::default()
        }),
    )
        .into_response()
}

pub(super) fn bad_request(err: anyhow::Error) -> Response {
    failure(StatusCode::BAD_REQUEST, err.to_string())
}

pub(super) fn internal_error(err: anyhow::Error) -> Response {
    failure(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err))
}

pub(super) fn refused(refusal: Refusal) -> Response {
    let status = match &refusal {
        Refusal::BadRequest(_) => StatusCode::BAD_REQUEST,
        Refusal::NotInPrivateGroup => StatusCode::FORBIDDEN,
        Refusal::NotFound => StatusCode::NOT_FOUND,
        Refusal::Conflict(_) => StatusCode::CONFLICT,
    };
    failure(status, refusal.message())
}

pub(super) fn ok_message(message: String) -> Json<MutationResponse> {
    Json(MutationResponse {
        ok: true,
        message: Some(message),
        ..MutationResponse::default()
    })
}

/// Malformed or incomplete request bodies are a 400, like every other
/// validation failure.
pub(super) fn rejected_body(rejection: axum::extract::rejection::JsonRejection) -> Response {
    failure(StatusCode::BAD_REQUEST, rejection.body_text())
}
