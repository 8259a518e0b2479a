//! Resolving the calling user of a request.
//!
//! The token is looked up, in order, in the `Authorization: Bearer` header,
//! the `auth` cookie and the `token` query parameter.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use serde::Deserialize;

use crate::{domain::User, ui::state::AppState};

use super::error::ApiError;

/// Name of the cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth";

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .or_else(|| {
                Query::<TokenQuery>::try_from_uri(&parts.uri)
                    .ok()
                    .and_then(|Query(query)| query.token)
            })
            .ok_or_else(ApiError::unauthenticated)?;
        let user = state.authenticate_usecase.execute(&token).await?;
        Ok(Self(user))
    }
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    if let Some(token) = bearer {
        return Some(token.to_string());
    }
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, token)| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        // テスト項目: Authorization ヘッダーが Cookie より優先される
        // given (前提条件):
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(COOKIE, HeaderValue::from_static("auth=def"));

        // when (操作):
        let token = token_from_headers(&headers);

        // then (期待する結果):
        assert_eq!(token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_auth_cookie_among_others() {
        // テスト項目: 複数の Cookie から auth を取り出せる
        // given (前提条件):
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; auth=xyz; lang=ja"));

        // when (操作):
        let token = token_from_headers(&headers);

        // then (期待する結果):
        assert_eq!(token.as_deref(), Some("xyz"));
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }
}
