use serde::{Deserialize, Serialize};

/// Identity context attached to every core request.
///
/// Identity issuance lives outside the core; callers hand in whatever the
/// surrounding application resolved. An absent user yields empty results on
/// read paths and `TradeError::Unauthorized` on write paths.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthContext {
    user_id: Option<String>,
}

impl AuthContext {
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        AuthContext {
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        AuthContext { user_id: None }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
