//! Cross-origin resource sharing headers.
//!
//! # Responsibilities
//! - Stamp the configured CORS headers onto every outgoing response
//! - Answer `OPTIONS` preflight requests without consulting the router
//!
//! # Design Decisions
//! - One policy for the whole server, taken from configuration
//! - Values are sent verbatim; no per-origin negotiation

use crate::config::CorsConfig;
use crate::http::response::HttpResponse;
use crate::http::StatusCode;

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";

/// Server-wide CORS policy.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origin: String,
    headers: String,
    methods: String,
}

impl CorsPolicy {
    pub fn new(
        origin: impl Into<String>,
        headers: impl Into<String>,
        methods: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            headers: headers.into(),
            methods: methods.into(),
        }
    }

    /// Set the three CORS headers, replacing any values already present.
    pub fn apply(&self, response: &mut HttpResponse) {
        response.set_header(ALLOW_ORIGIN, &self.origin);
        response.set_header(ALLOW_HEADERS, &self.headers);
        response.set_header(ALLOW_METHODS, &self.methods);
    }

    /// 200 with an empty body and the CORS headers.
    pub fn preflight(&self) -> HttpResponse {
        let mut response = HttpResponse::new(StatusCode::OK);
        self.apply(&mut response);
        response
    }
}

impl From<&CorsConfig> for CorsPolicy {
    fn from(config: &CorsConfig) -> Self {
        Self::new(
            config.allow_origin.clone(),
            config.allow_headers.clone(),
            config.allow_methods.clone(),
        )
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::from(&CorsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflight_is_empty_ok_with_headers() {
        let policy = CorsPolicy::new("https://app.example", "Authorization", "GET, POST");
        let resp = policy.preflight();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body_bytes(), Some(&b""[..]));
        assert_eq!(resp.header(ALLOW_ORIGIN), Some("https://app.example"));
        assert_eq!(resp.header(ALLOW_HEADERS), Some("Authorization"));
        assert_eq!(resp.header(ALLOW_METHODS), Some("GET, POST"));
        assert_eq!(resp.headers().len(), 3);
    }

    #[test]
    fn apply_overrides_handler_values() {
        let policy = CorsPolicy::default();
        let mut resp = HttpResponse::text("x").with_header(ALLOW_ORIGIN, "https://evil.example");
        policy.apply(&mut resp);

        assert_eq!(resp.header(ALLOW_ORIGIN), Some("*"));
        assert_eq!(
            resp.header(ALLOW_METHODS),
            Some("GET, PUT, POST, DELETE, HEAD, PATCH")
        );
    }
}
