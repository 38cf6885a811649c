//! Authentication profiles and credential injection
//!
//! Profiles arrive as an open `kind` plus string fields (the wire shape a
//! config file or protocol caller supplies) and are resolved into a
//! shape-checked [`ResolvedAuth`] when a tool is built. Resolution is the
//! only place profile fields are read; after that the tool carries the
//! resolved form.

use crate::error::{BridgeError, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Supported authentication kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    #[default]
    None,
    ApiKey,
    BearerToken,
    BasicAuth,
    Oauth2,
}

impl AuthKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::None => "none",
            AuthKind::ApiKey => "api_key",
            AuthKind::BearerToken => "bearer_token",
            AuthKind::BasicAuth => "basic_auth",
            AuthKind::Oauth2 => "oauth2",
        }
    }
}

/// Wire-shape authentication profile: a kind plus the fields it needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthProfile {
    #[serde(default)]
    pub kind: AuthKind,
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

impl AuthProfile {
    pub fn none() -> Self {
        Self {
            kind: AuthKind::None,
            fields: HashMap::new(),
        }
    }

    /// API key sent in the named header
    pub fn api_key<S: Into<String>>(value: S, header_name: S) -> Self {
        let mut fields = HashMap::new();
        fields.insert("value".to_string(), value.into());
        fields.insert("header_name".to_string(), header_name.into());
        Self {
            kind: AuthKind::ApiKey,
            fields,
        }
    }

    /// API key sent as the named query parameter
    pub fn api_key_query<S: Into<String>>(value: S, query_name: S) -> Self {
        let mut fields = HashMap::new();
        fields.insert("value".to_string(), value.into());
        fields.insert("query_name".to_string(), query_name.into());
        Self {
            kind: AuthKind::ApiKey,
            fields,
        }
    }

    pub fn bearer<S: Into<String>>(token: S) -> Self {
        let mut fields = HashMap::new();
        fields.insert("token".to_string(), token.into());
        Self {
            kind: AuthKind::BearerToken,
            fields,
        }
    }

    pub fn basic<S: Into<String>>(username: S, password: S) -> Self {
        let mut fields = HashMap::new();
        fields.insert("username".to_string(), username.into());
        fields.insert("password".to_string(), password.into());
        Self {
            kind: AuthKind::BasicAuth,
            fields,
        }
    }

    /// OAuth 2.0 with a pre-obtained access token; token acquisition is the
    /// caller's concern
    pub fn oauth2<S: Into<String>>(access_token: S) -> Self {
        let mut fields = HashMap::new();
        fields.insert("access_token".to_string(), access_token.into());
        Self {
            kind: AuthKind::Oauth2,
            fields,
        }
    }

    fn field(&self, name: &str) -> Result<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                BridgeError::auth_mismatch(format!(
                    "profile of kind '{}' is missing required field '{}'",
                    self.kind.as_str(),
                    name
                ))
            })
    }
}

/// Shape-checked credentials, derived from an [`AuthProfile`] at tool
/// construction time
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedAuth {
    None,
    ApiKeyHeader { header: String, value: String },
    ApiKeyQuery { name: String, value: String },
    Bearer { token: String },
    Basic { encoded: String },
    OAuth2 { access_token: String },
}

impl ResolvedAuth {
    /// Check the profile's fields against its declared kind
    pub fn resolve(profile: &AuthProfile) -> Result<Self> {
        match profile.kind {
            AuthKind::None => Ok(ResolvedAuth::None),
            AuthKind::ApiKey => {
                let value = profile.field("value")?.to_string();
                if let Some(header) = profile.fields.get("header_name").filter(|h| !h.is_empty()) {
                    Ok(ResolvedAuth::ApiKeyHeader {
                        header: header.clone(),
                        value,
                    })
                } else if let Some(name) =
                    profile.fields.get("query_name").filter(|n| !n.is_empty())
                {
                    Ok(ResolvedAuth::ApiKeyQuery {
                        name: name.clone(),
                        value,
                    })
                } else {
                    Err(BridgeError::auth_mismatch(
                        "api_key profile needs 'header_name' or 'query_name'",
                    ))
                }
            }
            AuthKind::BearerToken => Ok(ResolvedAuth::Bearer {
                token: profile.field("token")?.to_string(),
            }),
            AuthKind::BasicAuth => {
                let username = profile.field("username")?;
                let password = profile.field("password")?;
                let encoded =
                    general_purpose::STANDARD.encode(format!("{}:{}", username, password));
                Ok(ResolvedAuth::Basic { encoded })
            }
            AuthKind::Oauth2 => Ok(ResolvedAuth::OAuth2 {
                access_token: profile.field("access_token")?.to_string(),
            }),
        }
    }

    /// Inject credentials into the header and query pair lists
    ///
    /// Called after caller-supplied values are in place; colliding entries
    /// are removed first so credentials always win.
    pub fn apply(&self, headers: &mut Vec<(String, String)>, query: &mut Vec<(String, String)>) {
        match self {
            ResolvedAuth::None => {}
            ResolvedAuth::ApiKeyHeader { header, value } => {
                set_header(headers, header, value.clone());
            }
            ResolvedAuth::ApiKeyQuery { name, value } => {
                query.retain(|(k, _)| k != name);
                query.push((name.clone(), value.clone()));
            }
            ResolvedAuth::Bearer { token } => {
                set_header(headers, "Authorization", format!("Bearer {}", token));
            }
            ResolvedAuth::Basic { encoded } => {
                set_header(headers, "Authorization", format!("Basic {}", encoded));
            }
            ResolvedAuth::OAuth2 { access_token } => {
                set_header(headers, "Authorization", format!("Bearer {}", access_token));
            }
        }
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}
