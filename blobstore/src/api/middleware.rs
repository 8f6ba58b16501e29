use std::sync::Arc;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use crate::error::AppError;
use crate::utils::jwt::{decode, Claims};
use crate::utils::state::AppState;

/// Attach the caller's [`Claims`] to the request.
///
/// Reads are open to anonymous callers; every other method needs a valid
/// bearer token.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let claims = extract_claims(&req, &state.config.jwt_secret);
    match *req.method() {
        Method::GET | Method::HEAD => {
            if let Ok(claims) = claims {
                req.extensions_mut().insert(claims);
            }
        }
        _ => {
            req.extensions_mut().insert(claims?);
        }
    }
    Ok(next.run(req).await)
}

fn extract_claims(req: &Request, secret: &str) -> Result<Claims, AppError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Unauthorized("Missing or malformed Bearer token".to_string()))?;
    decode(secret, bearer.token())
}
