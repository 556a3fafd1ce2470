//! Authorization header construction
//!
//! Supports:
//! - Basic credentials (base64 of `username:password`)
//! - Bearer tokens
//! - Arbitrary `{Type} {Credentials}` schemes

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Name of the authorization header
pub const AUTHORIZATION: &str = "Authorization";

/// Authorization scheme applied to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Auth {
    /// `Authorization: Basic base64(username:password)`
    Basic { username: String, password: String },
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `Authorization: <kind> <credentials>`
    Custom { kind: String, credentials: String },
}

impl Auth {
    /// Build the value of the `Authorization` header
    pub fn header_value(&self) -> String {
        match self {
            Auth::Basic { username, password } => {
                format!("Basic {}", encode_basic_credentials(username, password))
            }
            Auth::Bearer(token) => format!("Bearer {}", token),
            Auth::Custom { kind, credentials } => format!("{} {}", kind, credentials),
        }
    }
}

/// Base64-encode `username:password` for basic authentication
pub fn encode_basic_credentials(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    BASE64_STANDARD.encode(credentials.as_bytes())
}
