//! Session seam: resolves an opaque session token to the signed-in user.
//! Issuing sessions belongs to the external identity provider.

use std::collections::HashMap;

use axum::http::{header, HeaderMap};
use axum_extra::extract::CookieJar;

use crate::pages::OwnerId;

pub const SESSION_COOKIE: &str = "session_token";

pub trait SessionResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<OwnerId>;
}

/// Fixed token table, seeded from configuration for development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSessions {
    tokens: HashMap<String, OwnerId>,
}

impl StaticSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, owner: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), OwnerId(owner.into()));
        self
    }

    /// Parses comma-separated `token=user_id` pairs. Malformed pairs are skipped.
    pub fn parse(raw: &str) -> Self {
        raw.split(',')
            .filter_map(|pair| pair.split_once('='))
            .map(|(token, owner)| (token.trim(), owner.trim()))
            .filter(|(token, owner)| !token.is_empty() && !owner.is_empty())
            .fold(Self::new(), |sessions, (token, owner)| {
                sessions.with_token(token, owner)
            })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl SessionResolver for StaticSessions {
    fn resolve(&self, token: &str) -> Option<OwnerId> {
        self.tokens.get(token).cloned()
    }
}

/// Reads the session token from the `session_token` cookie, falling back to an
/// `Authorization: Bearer` header.
pub fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
