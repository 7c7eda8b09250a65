//! Bearer token 検証 → permission gate → Claims を extensions に入れる
//!
//! Flow per request:
//! - matched route template + method を permission table で引く
//! - Public なら何もしない (Authorization header も見ない)
//! - Requires(p) なら `Authorization: Bearer <jwt>` を検証し、claims に p があるかを確認
//! - 成功時のみ handler が走る。失敗は AppError::Auth として即座に返す

use axum::{
    Router,
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::permissions::{self, Access};
use crate::error::AppError;
use crate::services::auth::{gate, token};
use crate::state::AppState;

/// Apply the authorization middleware to every route registered on `router`.
///
/// `route_layer` (not `layer`) so that the matched route template is known and
/// unknown paths still fall through to the 404 fallback.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let access = req
        .extensions()
        .get::<MatchedPath>()
        .and_then(|path| permissions::lookup(req.method(), path.as_str()));

    let required = match access {
        Some(Access::Requires(permission)) => permission,
        Some(Access::Public) => return Ok(next.run(req).await),
        None => {
            // Not in the table: the router answers (405 for an unserved method).
            tracing::debug!(
                method = %req.method(),
                uri = %req.uri(),
                "route not in permission table"
            );
            return Ok(next.run(req).await);
        }
    };

    let bearer = token::bearer_token(req.headers().get(header::AUTHORIZATION))?.to_owned();
    let claims = state.auth.verify(&bearer).await?;
    gate::check_permission(Some(required), &claims)?;

    tracing::debug!(sub = claims.subject(), permission = required, "request authorized");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
