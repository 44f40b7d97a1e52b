use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use rstatus_core::domain::accounts::Account;
use tracing::warn;

use crate::infra::app_state::AppState;

/// The account making the request, if it presented a live session.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<Account>);

impl Viewer {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn account(&self) -> Option<&Account> {
        self.0.as_ref()
    }

    pub fn owns(&self, account: &Account) -> bool {
        self.0.as_ref().is_some_and(|viewer| viewer.id == account.id)
    }
}

/// Resolve the bearer session, if any, into a [`Viewer`] extension. Missing,
/// malformed, unknown or expired tokens all yield an anonymous viewer.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let viewer = match extract_bearer_token(request.headers()) {
        Some(token) => match state.sessions.authenticate(token).await {
            Ok(account) => Viewer(account),
            Err(err) => {
                warn!(error = %err, "session lookup failed; treating request as anonymous");
                Viewer::anonymous()
            }
        },
        None => Viewer::anonymous(),
    };

    request.extensions_mut().insert(viewer);
    next.run(request).await
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_only_bearer_tokens() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer opaque-token"),
        );
        assert_eq!(extract_bearer_token(&headers), Some("opaque-token"));
    }
}
