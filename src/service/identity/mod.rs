use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Context;
use axum_extra::extract::cookie::Cookie;
use url::Url;

use crate::helper::from_env_or;
use crate::service::base_url::BaseUrl;

pub(crate) mod gotrue;
pub(crate) mod pkce;
pub(crate) mod session;

/// Cookie read and write capability handed to the identity provider.
///
/// A cookie with a zero max age is a removal.
pub(crate) trait CookieStore: Send {
    fn list(&self) -> Vec<Cookie<'static>>;
    fn apply(&mut self, cookie: Cookie<'static>);

    fn get(&self, name: &str) -> Option<Cookie<'static>> {
        self.list().into_iter().find(|cookie| cookie.name() == name)
    }
}

#[axum::async_trait]
pub(crate) trait IdentityProvider: Send + Sync {
    /// Trades a one-time authorization code for a session, written through `cookies`.
    async fn exchange_code_for_session(
        &self,
        code: &str,
        cookies: &mut dyn CookieStore,
    ) -> Result<(), Error>;

    /// Revokes the current session and clears its cookies.
    async fn sign_out(&self, cookies: &mut dyn CookieStore) -> Result<(), Error>;

    /// Stores a fresh PKCE verifier through `cookies` and returns its challenge.
    fn begin_pkce(&self, cookies: &mut dyn CookieStore) -> String;

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &Url,
        code_challenge: &str,
    ) -> Result<Url, Error>;

    async fn send_magic_link(
        &self,
        email: &str,
        redirect_to: &Url,
        code_challenge: &str,
    ) -> Result<(), Error>;
}

pub(crate) type SharedIdentityProvider = Arc<dyn IdentityProvider>;

#[derive(Debug)]
pub(crate) enum Error {
    MissingCodeVerifier,
    InvalidUrl(url::ParseError),
    Transport(reqwest::Error),
    Decode(reqwest::Error),
    Rejected { status: u16, message: String },
}

impl Error {
    /// Short label used when logging, the end user never sees it.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCodeVerifier => "missing-code-verifier",
            Self::InvalidUrl(_) => "invalid-url",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::Rejected { .. } => "rejected",
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCodeVerifier => f.write_str("no code verifier found in cookies"),
            Self::InvalidUrl(err) => write!(f, "unable to build identity provider url: {err}"),
            Self::Transport(err) => write!(f, "unable to reach identity provider: {err}"),
            Self::Decode(err) => write!(f, "unable to decode identity provider response: {err}"),
            Self::Rejected { status, message } => {
                write!(f, "identity provider rejected request ({status}): {message}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUrl(err) => Some(err),
            Self::Transport(err) | Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

pub(crate) struct Config {
    url: Cow<'static, str>,
    anon_key: Cow<'static, str>,
    project_ref: Option<String>,
}

impl Config {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: from_env_or("SUPABASE_URL", "http://localhost:54321"),
            anon_key: from_env_or("SUPABASE_ANON_KEY", ""),
            project_ref: std::env::var("SUPABASE_PROJECT_REF").ok(),
        })
    }

    pub(crate) fn build(self, base_url: &BaseUrl) -> anyhow::Result<gotrue::Client> {
        let url = Url::parse(self.url.as_ref())
            .with_context(|| format!("parsing SUPABASE_URL={:?}", self.url))?;
        let project_ref = match self.project_ref {
            Some(value) => value,
            None => url
                .host_str()
                .and_then(|host| host.split('.').next())
                .filter(|label| !label.is_empty())
                .map(String::from)
                .context("unable to derive project reference from SUPABASE_URL")?,
        };
        if self.anon_key.is_empty() {
            tracing::warn!("no SUPABASE_ANON_KEY provided, identity requests will be anonymous");
        }
        tracing::debug!(message = "building identity client", url = %url, project_ref = %project_ref);
        Ok(gotrue::Client::new(
            url,
            self.anon_key.into_owned(),
            &project_ref,
            base_url.is_secure(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum_extra::extract::cookie::Cookie;
    use url::Url;

    use super::{CookieStore, Error};

    pub(crate) const VALID_CODE: &str = "abc";
    pub(crate) const SESSION_COOKIE: &str = "sb-test-auth-token";
    pub(crate) const VERIFIER_COOKIE: &str = "sb-test-auth-token-code-verifier";

    /// Accepts [`VALID_CODE`] only, and leaves a half-written cookie behind on failure
    /// so tests can check nothing leaks out of a failed exchange.
    #[derive(Debug, Default)]
    pub(crate) struct Provider {
        pub fail_sign_out: bool,
        pub exchanges: AtomicUsize,
        pub sign_outs: AtomicUsize,
    }

    impl Provider {
        pub(crate) fn failing_sign_out() -> Self {
            Self {
                fail_sign_out: true,
                ..Default::default()
            }
        }
    }

    #[axum::async_trait]
    impl super::IdentityProvider for Provider {
        async fn exchange_code_for_session(
            &self,
            code: &str,
            cookies: &mut dyn CookieStore,
        ) -> Result<(), Error> {
            self.exchanges.fetch_add(1, Ordering::SeqCst);
            if code == VALID_CODE {
                cookies.apply(Cookie::build((SESSION_COOKIE, "session")).path("/").build());
                Ok(())
            } else {
                cookies.apply(Cookie::build((SESSION_COOKIE, "partial")).path("/").build());
                Err(Error::Rejected {
                    status: 400,
                    message: "invalid grant".into(),
                })
            }
        }

        async fn sign_out(&self, cookies: &mut dyn CookieStore) -> Result<(), Error> {
            self.sign_outs.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_out {
                return Err(Error::Rejected {
                    status: 500,
                    message: "unavailable".into(),
                });
            }
            cookies.apply(
                Cookie::build((SESSION_COOKIE, ""))
                    .path("/")
                    .max_age(time::Duration::ZERO)
                    .build(),
            );
            Ok(())
        }

        fn begin_pkce(&self, cookies: &mut dyn CookieStore) -> String {
            cookies.apply(Cookie::build((VERIFIER_COOKIE, "verifier")).path("/").build());
            "challenge".into()
        }

        fn authorize_url(
            &self,
            provider: &str,
            redirect_to: &Url,
            code_challenge: &str,
        ) -> Result<Url, Error> {
            Url::parse_with_params(
                "http://identity.test/auth/v1/authorize",
                &[
                    ("provider", provider),
                    ("redirect_to", redirect_to.as_str()),
                    ("code_challenge", code_challenge),
                ],
            )
            .map_err(Error::InvalidUrl)
        }

        async fn send_magic_link(
            &self,
            email: &str,
            _redirect_to: &Url,
            _code_challenge: &str,
        ) -> Result<(), Error> {
            if email.ends_with("@fail.test") {
                Err(Error::Rejected {
                    status: 429,
                    message: "rate limited".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    /// Plain list of cookies, standing in for a request/response pair.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryCookies(pub Vec<Cookie<'static>>);

    impl CookieStore for MemoryCookies {
        fn list(&self) -> Vec<Cookie<'static>> {
            self.0.clone()
        }

        fn apply(&mut self, cookie: Cookie<'static>) {
            self.0.retain(|item| item.name() != cookie.name());
            if cookie.max_age() != Some(time::Duration::ZERO) {
                self.0.push(cookie);
            }
        }
    }
}
