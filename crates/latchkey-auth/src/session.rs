//! Client-visible session

use crate::SessionToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The session object handed to client code, rebuilt from the session
/// token on every access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,

    /// When the underlying token stops being valid
    pub expires: DateTime<Utc>,
}

/// User part of the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SessionView {
    /// Default projection of a token: name and email only. The user id is
    /// left for the read hook to fill in.
    pub fn from_token(token: &SessionToken) -> Self {
        Self {
            user: Some(SessionUser {
                id: None,
                name: token.name.clone(),
                email: token.email.clone(),
            }),
            expires: token.expires_at(),
        }
    }

    /// Id of the signed-in user, if the read hook provided one
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.id.as_deref())
    }
}
