//! Caller identity middleware.
//!
//! The engine itself owns authorization; the REST layer only needs to know
//! who is calling so OPTIONS discovery links can be filtered. Identity comes
//! from the `X-Authenticated-User` header (set by whatever auth fronts the
//! server); absence means anonymous.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";

#[derive(Debug, Clone, Default)]
pub struct Principal {
    pub user_id: Option<String>,
}

impl Principal {
    pub fn user(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

pub async fn principal(mut req: Request, next: Next) -> Response {
    let user_id = req
        .headers()
        .get(AUTHENTICATED_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    req.extensions_mut().insert(Principal { user_id });
    next.run(req).await
}
