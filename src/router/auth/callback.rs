use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;

use super::cookies::JarCookieStore;
use super::redirect::resolve;
use crate::service::base_url::BaseUrl;
use crate::service::identity::SharedIdentityProvider;

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct QueryParams {
    code: Option<String>,
    next: Option<String>,
}

fn failure(base_url: &BaseUrl) -> Response {
    Redirect::temporary(base_url.login_with("error", super::AUTH_FAILED).as_str()).into_response()
}

pub(super) async fn handle(
    Extension(base_url): Extension<BaseUrl>,
    Extension(identity): Extension<SharedIdentityProvider>,
    jar: CookieJar,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(inner)) => inner,
        Err(err) => {
            tracing::debug!(message = "unable to decode callback parameters", error = %err);
            QueryParams::default()
        }
    };
    let target = resolve(base_url.as_url(), params.next.as_deref());

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        tracing::debug!("no authorization code provided");
        return failure(&base_url);
    };

    // the jar only reaches the response when the exchange succeeds
    let mut cookies = JarCookieStore::new(jar);
    match identity
        .exchange_code_for_session(code.as_str(), &mut cookies)
        .await
    {
        Ok(()) => {
            tracing::debug!(message = "session established", target = %target);
            (cookies.into_jar(), Redirect::temporary(target.as_str())).into_response()
        }
        Err(err) => {
            tracing::warn!(
                message = "unable to exchange authorization code",
                kind = err.kind(),
                error = %err,
            );
            failure(&base_url)
        }
    }
}
