//! Request caller extractor

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::error::AppError;
use crate::state::AppState;

/// Who is making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Authenticated user id, if the request carries a valid session
    pub user_id: Option<String>,
    /// Client IP as reported by the proxy headers
    pub ip: String,
}

impl Caller {
    pub fn user(user_id: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ip: ip.into(),
        }
    }

    pub fn guest(ip: impl Into<String>) -> Self {
        Self {
            user_id: None,
            ip: ip.into(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }

    /// Blob key prefix for this caller's uploads
    pub fn storage_prefix(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.ip)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ip = client_ip(&parts.headers);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let user_id = match (token, state.jwt()) {
            (Some(token), Some(verifier)) => match verifier.verify(token) {
                Ok(claims) => Some(claims.sub),
                Err(e) => {
                    tracing::debug!(ip = %ip, "Treating caller as guest: {}", e);
                    None
                }
            },
            _ => None,
        };

        Ok(Self { user_id, ip })
    }
}

/// Resolve the client IP from proxy headers
///
/// First entry of `X-Forwarded-For`, then `X-Real-IP`, else `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next().map(str::trim).filter(|ip| !ip.is_empty()) {
            return first.to_string();
        }
    }

    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return real_ip.to_string();
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(client_ip(&headers), "198.51.100.1");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_storage_prefix() {
        assert_eq!(Caller::user("user-1", "203.0.113.7").storage_prefix(), "user-1");
        assert_eq!(Caller::guest("203.0.113.7").storage_prefix(), "203.0.113.7");
        assert!(Caller::guest("203.0.113.7").is_guest());
    }
}
