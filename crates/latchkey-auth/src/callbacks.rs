//! Session enrichment with the verified user id

use crate::{Identity, SessionCallbacks, SessionToken, SessionView};

/// Carries `Identity::id` into the session token at issuance and from the
/// token into `session.user.id` on every read.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityEnrichment;

impl SessionCallbacks for IdentityEnrichment {
    fn on_issue(&self, mut token: SessionToken, identity: Option<&Identity>) -> SessionToken {
        if let Some(identity) = identity {
            token.id = Some(identity.id.clone());
        }
        token
    }

    fn on_read(&self, mut session: SessionView, token: &SessionToken) -> SessionView {
        if let Some(user) = session.user.as_mut() {
            user.id = token.id.clone();
        }
        session
    }
}
