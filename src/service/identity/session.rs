use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::CookieStore;

const BASE64_PREFIX: &str = "base64-";
/// Browsers drop cookies above 4096 bytes, leave room for name and attributes.
pub(crate) const MAX_CHUNK_SIZE: usize = 3180;
/// 400 days, the longest lifetime browsers accept.
const COOKIE_MAX_AGE_DAYS: i64 = 400;
// Chunk suffixes are read until the first gap, bounded anyway.
const MAX_CHUNKS: usize = 32;

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub(crate) struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "Session::default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: serde_json::Value,
}

impl Session {
    fn default_token_type() -> String {
        "bearer".into()
    }

    /// Fills `expires_at` from `expires_in` when the provider left it out.
    pub fn with_expiry(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(chrono::Utc::now().timestamp() + self.expires_in);
        }
        self
    }

    pub fn encode(&self) -> String {
        // serializing a struct of strings and json values cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        format!("{BASE64_PREFIX}{}", URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(value: &str) -> Option<Self> {
        let json = match value.strip_prefix(BASE64_PREFIX) {
            Some(encoded) => URL_SAFE_NO_PAD.decode(encoded).ok()?,
            None => value.as_bytes().to_vec(),
        };
        serde_json::from_slice(&json).ok()
    }
}

/// Naming and attributes of the cookies holding a session.
#[derive(Clone, Debug)]
pub(crate) struct SessionCookies {
    storage_key: String,
    secure: bool,
}

impl SessionCookies {
    pub fn new(project_ref: &str, secure: bool) -> Self {
        Self {
            storage_key: format!("sb-{project_ref}-auth-token"),
            secure,
        }
    }

    pub fn verifier_name(&self) -> String {
        format!("{}-code-verifier", self.storage_key)
    }

    fn chunk_name(&self, index: usize) -> String {
        format!("{}.{index}", self.storage_key)
    }

    fn is_session_cookie(&self, name: &str) -> bool {
        name == self.storage_key
            || name
                .strip_prefix(self.storage_key.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .map_or(false, |index| index.parse::<usize>().is_ok())
    }

    pub fn build(&self, name: String, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(false)
            .secure(self.secure)
            .max_age(time::Duration::days(COOKIE_MAX_AGE_DAYS))
            .build()
    }

    fn removal(&self, name: String) -> Cookie<'static> {
        Cookie::build((name, ""))
            .path("/")
            .max_age(time::Duration::ZERO)
            .build()
    }

    pub fn write_verifier(&self, cookies: &mut dyn CookieStore, verifier: String) {
        cookies.apply(self.build(self.verifier_name(), verifier));
    }

    pub fn read_verifier(&self, cookies: &dyn CookieStore) -> Option<String> {
        cookies
            .get(&self.verifier_name())
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn clear_verifier(&self, cookies: &mut dyn CookieStore) {
        cookies.apply(self.removal(self.verifier_name()));
    }

    /// Stores the session, splitting it in numbered chunks when it does not fit in one cookie.
    pub fn write(&self, cookies: &mut dyn CookieStore, session: &Session) {
        let encoded = session.encode();
        let mut written = Vec::new();
        if encoded.len() <= MAX_CHUNK_SIZE {
            written.push(self.storage_key.clone());
            cookies.apply(self.build(self.storage_key.clone(), encoded));
        } else {
            // base64 output is ascii, any byte offset is a char boundary
            for (index, chunk) in encoded.as_bytes().chunks(MAX_CHUNK_SIZE).enumerate() {
                let name = self.chunk_name(index);
                let value = String::from_utf8_lossy(chunk).into_owned();
                written.push(name.clone());
                cookies.apply(self.build(name, value));
            }
        }
        for stale in cookies
            .list()
            .into_iter()
            .map(|cookie| cookie.name().to_string())
            .filter(|name| self.is_session_cookie(name) && !written.contains(name))
        {
            cookies.apply(self.removal(stale));
        }
    }

    pub fn read(&self, cookies: &dyn CookieStore) -> Option<Session> {
        if let Some(cookie) = cookies.get(&self.storage_key) {
            return Session::decode(cookie.value());
        }
        let mut value = String::new();
        for index in 0..MAX_CHUNKS {
            match cookies.get(&self.chunk_name(index)) {
                Some(cookie) => value.push_str(cookie.value()),
                None => break,
            }
        }
        if value.is_empty() {
            None
        } else {
            Session::decode(&value)
        }
    }

    pub fn clear(&self, cookies: &mut dyn CookieStore) {
        let names = cookies
            .list()
            .into_iter()
            .map(|cookie| cookie.name().to_string())
            .filter(|name| self.is_session_cookie(name))
            .collect::<Vec<_>>();
        for name in names {
            cookies.apply(self.removal(name));
        }
    }
}
