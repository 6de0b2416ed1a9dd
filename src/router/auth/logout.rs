use axum::response::Redirect;
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;

use super::cookies::JarCookieStore;
use crate::service::base_url::BaseUrl;
use crate::service::identity::SharedIdentityProvider;

/// Best effort sign out, always ends on the site root.
pub(super) async fn handle(
    Extension(base_url): Extension<BaseUrl>,
    Extension(identity): Extension<SharedIdentityProvider>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let redirect = Redirect::temporary(base_url.as_url().as_str());

    let mut cookies = JarCookieStore::new(jar);
    if let Err(err) = identity.sign_out(&mut cookies).await {
        tracing::warn!(message = "unable to sign out", kind = err.kind(), error = %err);
    }

    (cookies.into_jar(), redirect)
}
