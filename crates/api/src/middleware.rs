use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

/// Primary header carrying the access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Access token as presented by the client, before any verification.
///
/// `None` means nothing usable was presented; the gate reports that as
/// `TokenMissing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentedToken(pub Option<String>);

impl PresentedToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for PresentedToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(extract_token(&parts.headers)))
    }
}

/// `x-access-token` wins; `Authorization: Bearer` is the fallback.
///
/// A non-Bearer `Authorization` value is passed through untouched so that it
/// fails verification instead of reading as absent.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = header_text(headers, ACCESS_TOKEN_HEADER) {
        return Some(token);
    }

    let header = header_text(headers, axum::http::header::AUTHORIZATION.as_str())?;
    match header.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => {
            Some(rest.trim().to_string()).filter(|t| !t.is_empty())
        }
        _ => Some(header),
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?;
    let text = String::from_utf8_lossy(value.as_bytes()).trim().to_string();
    (!text.is_empty()).then_some(text)
}
