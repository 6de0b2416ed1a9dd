use std::sync::Arc;

use anyhow::Context;
use url::{Position, Url};

/// Trusted public origin of the site, always stored as the root url (`scheme://host[:port]/`).
#[derive(Clone, Debug)]
pub(crate) struct BaseUrl(Arc<Url>);

impl BaseUrl {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let url = Url::parse(input).with_context(|| format!("parsing base url {input:?}"))?;
        let origin = url.origin();
        if !origin.is_tuple() {
            anyhow::bail!("base url {input:?} has no usable origin");
        }
        let root = Url::parse(&origin.ascii_serialization())
            .with_context(|| format!("building root url from {input:?}"))?;
        Ok(Self(Arc::new(root)))
    }

    pub fn as_url(&self) -> &Url {
        self.0.as_ref()
    }

    pub fn is_secure(&self) -> bool {
        self.0.scheme() == "https"
    }

    /// Login page with a single query parameter, like `/login?error=auth_failed`.
    pub fn login_with(&self, key: &str, value: &str) -> Url {
        let mut url = self.path("/login");
        url.query_pairs_mut().append_pair(key, value);
        url
    }

    /// Callback url handed to the identity provider, carrying the already resolved target.
    pub fn callback(&self, target: &Url) -> Url {
        let mut url = self.path("/auth/callback");
        url.query_pairs_mut()
            .append_pair("next", &target[Position::BeforePath..]);
        url
    }

    fn path(&self, path: &str) -> Url {
        let mut url = self.as_url().clone();
        url.set_path(path);
        url
    }
}
