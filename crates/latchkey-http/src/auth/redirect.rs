//! Redirect targets
//!
//! Every URL the auth actions redirect to is resolved against the
//! configured base URL and must stay on its origin.

use url::Url;

#[derive(Debug, Clone)]
pub struct Redirects {
    base: Url,
}

impl Redirects {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve a client-supplied callback URL.
    ///
    /// Relative paths are joined to the base; absolute URLs survive only on
    /// the base origin. Anything else becomes the base URL.
    pub fn callback(&self, candidate: Option<&str>) -> String {
        candidate
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty())
            .and_then(|candidate| self.base.join(candidate).ok())
            .filter(|url| url.origin() == self.base.origin())
            .unwrap_or_else(|| self.base.clone())
            .into()
    }

    /// Absolute URL of an application page with `params` appended to its query
    pub fn page(&self, page: &str, params: &[(&str, &str)]) -> String {
        let mut url = self.base.join(page).unwrap_or_else(|_| self.base.clone());
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url.into()
    }

    /// Absolute URL of an action under `/api/auth`
    pub fn action(&self, action: &str) -> String {
        self.page(&format!("/api/auth/{}", action), &[])
    }
}
