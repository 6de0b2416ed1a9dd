use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;

use super::cookies::JarCookieStore;
use super::redirect::resolve;
use crate::router::api::error::Error;
use crate::service::base_url::BaseUrl;
use crate::service::identity::SharedIdentityProvider;

pub(crate) enum ResponseError {
    InvalidParameters,
    InvalidProvider,
    Identity,
}

impl ResponseError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidParameters => (StatusCode::BAD_REQUEST, "invalid query parameters"),
            Self::InvalidProvider => (StatusCode::BAD_REQUEST, "invalid identity provider"),
            Self::Identity => (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong"),
        }
    }
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = self.status_and_message();
        Error::new(status, message).into_response()
    }
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct QueryParams {
    provider: String,
    next: Option<String>,
}

fn is_valid_provider(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 32
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

pub(super) async fn handle(
    Extension(base_url): Extension<BaseUrl>,
    Extension(identity): Extension<SharedIdentityProvider>,
    jar: CookieJar,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<(CookieJar, Redirect), ResponseError> {
    let Query(params) = params.map_err(|err| {
        tracing::debug!(message = "unable to decode login parameters", error = %err);
        ResponseError::InvalidParameters
    })?;
    if !is_valid_provider(&params.provider) {
        tracing::debug!(message = "invalid provider", provider = %params.provider);
        return Err(ResponseError::InvalidProvider);
    }

    let target = resolve(base_url.as_url(), params.next.as_deref());
    let redirect_to = base_url.callback(&target);

    let mut cookies = JarCookieStore::new(jar);
    let challenge = identity.begin_pkce(&mut cookies);
    let url = identity
        .authorize_url(&params.provider, &redirect_to, &challenge)
        .map_err(|err| {
            tracing::error!(message = "unable to build authorize url", error = %err);
            ResponseError::Identity
        })?;

    Ok((cookies.into_jar(), Redirect::temporary(url.as_str())))
}
