use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::service::identity::CookieStore;

/// Exposes the request cookies to the identity provider and collects what it writes
/// back, so the jar can be attached to the outgoing response.
#[derive(Debug)]
pub(super) struct JarCookieStore {
    jar: CookieJar,
}

impl JarCookieStore {
    pub fn new(jar: CookieJar) -> Self {
        Self { jar }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl CookieStore for JarCookieStore {
    fn list(&self) -> Vec<Cookie<'static>> {
        self.jar.iter().cloned().collect()
    }

    fn apply(&mut self, cookie: Cookie<'static>) {
        let jar = std::mem::take(&mut self.jar);
        self.jar = if cookie.max_age() == Some(time::Duration::ZERO) {
            jar.remove(cookie)
        } else {
            jar.add(cookie)
        };
    }
}
