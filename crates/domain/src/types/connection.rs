//! Platform connection credential, owned by connection management

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ad account plus bearer token for the external platform. Read-only here.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCredential {
    pub ad_account_id: String,
    pub bearer_token: String,
}

impl ConnectionCredential {
    pub fn new(ad_account_id: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self { ad_account_id: ad_account_id.into(), bearer_token: bearer_token.into() }
    }

    pub fn has_token(&self) -> bool {
        !self.bearer_token.trim().is_empty()
    }
}

impl fmt::Debug for ConnectionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCredential")
            .field("ad_account_id", &self.ad_account_id)
            .field("bearer_token", &"[REDACTED]")
            .finish()
    }
}
