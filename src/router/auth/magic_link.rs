use axum::extract::rejection::FormRejection;
use axum::response::Redirect;
use axum::{Extension, Form};
use axum_extra::extract::cookie::CookieJar;

use super::cookies::JarCookieStore;
use super::redirect::resolve;
use crate::service::base_url::BaseUrl;
use crate::service::identity::SharedIdentityProvider;

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RequestPayload {
    email: String,
    #[serde(default)]
    next: Option<String>,
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !email.contains(' '),
        None => false,
    }
}

pub(super) async fn handle(
    Extension(base_url): Extension<BaseUrl>,
    Extension(identity): Extension<SharedIdentityProvider>,
    jar: CookieJar,
    payload: Result<Form<RequestPayload>, FormRejection>,
) -> (CookieJar, Redirect) {
    let payload = match payload {
        Ok(Form(inner)) if is_valid_email(inner.email.trim()) => inner,
        Ok(_) => {
            tracing::debug!("invalid email provided");
            return (jar, Redirect::to(base_url.login_with("error", "invalid_email").as_str()));
        }
        Err(err) => {
            tracing::debug!(message = "unable to decode magic link payload", error = %err);
            return (jar, Redirect::to(base_url.login_with("error", "invalid_email").as_str()));
        }
    };

    let target = resolve(base_url.as_url(), payload.next.as_deref());
    let redirect_to = base_url.callback(&target);

    let original = jar.clone();
    let mut cookies = JarCookieStore::new(jar);
    let challenge = identity.begin_pkce(&mut cookies);
    match identity
        .send_magic_link(payload.email.trim(), &redirect_to, &challenge)
        .await
    {
        Ok(()) => (
            cookies.into_jar(),
            Redirect::to(base_url.login_with("sent", "1").as_str()),
        ),
        Err(err) => {
            tracing::warn!(message = "unable to send magic link", kind = err.kind(), error = %err);
            (
                original,
                Redirect::to(base_url.login_with("error", "magic_link_failed").as_str()),
            )
        }
    }
}
