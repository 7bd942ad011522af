//! Per-call header sets for outbound requests.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::http_client::ApiError;

/// A parsed `Authorization` value: `<scheme> <credentials>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub scheme: String,
    pub credentials: String,
}

impl Authorization {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            scheme: "Bearer".to_string(),
            credentials: token.into(),
        }
    }

    /// Parses `"<scheme> <credentials>"`. The scheme must be a single token;
    /// the credentials may be empty.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let raw = raw.trim();
        let (scheme, credentials) = match raw.split_once(' ') {
            Some((scheme, rest)) => (scheme, rest.trim()),
            None => (raw, ""),
        };

        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ApiError::InvalidHeader(format!(
                "invalid authorization scheme in '{raw}'"
            )));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            credentials: credentials.to_string(),
        })
    }

    fn to_header_value(&self) -> Result<HeaderValue, ApiError> {
        let rendered = if self.credentials.is_empty() {
            self.scheme.clone()
        } else {
            format!("{} {}", self.scheme, self.credentials)
        };
        let mut value = HeaderValue::from_str(&rendered)
            .map_err(|e| ApiError::InvalidHeader(format!("authorization: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Immutable-by-convention header set passed alongside each request.
///
/// Every header except `Authorization` is overwrite-or-add by name.
/// `Authorization` is held as a structured [`Authorization`] and rendered
/// once, so setting it twice never produces a duplicate entry.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    authorization: Option<Authorization>,
    others: HeaderMap,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a header set carrying only a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new().with_authorization(Authorization::bearer(token))
    }

    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Sets `name` to `value`, replacing any earlier value for that name.
    pub fn with(mut self, name: &str, value: &str) -> Result<Self, ApiError> {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;

        if header == AUTHORIZATION {
            self.authorization = Some(Authorization::parse(value)?);
            return Ok(self);
        }

        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
        self.others.insert(header, value);
        Ok(self)
    }

    /// Returns a new set with `overrides` applied on top of `self`.
    pub fn merged(&self, overrides: &RequestHeaders) -> RequestHeaders {
        let mut merged = self.clone();
        for (name, value) in overrides.others.iter() {
            merged.others.insert(name.clone(), value.clone());
        }
        if let Some(auth) = &overrides.authorization {
            merged.authorization = Some(auth.clone());
        }
        merged
    }

    pub fn to_header_map(&self) -> Result<HeaderMap, ApiError> {
        let mut map = self.others.clone();
        if let Some(auth) = &self.authorization {
            map.insert(AUTHORIZATION, auth.to_header_value()?);
        }
        Ok(map)
    }
}
