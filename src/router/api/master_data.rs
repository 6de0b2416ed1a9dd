use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::entity::locale::Locale;
use crate::entity::master_data::{Entity as MasterDataEntity, Kind, ListActive};
use crate::entity::service_radius::Entity as ServiceRadiusEntity;

#[derive(Debug)]
pub(crate) enum ResponseError {
    InvalidParameters,
    UnsupportedLocale,
    Database,
}

impl From<sqlx::Error> for ResponseError {
    fn from(value: sqlx::Error) -> Self {
        tracing::error!(message = "database interaction failed", error = %value);
        Self::Database
    }
}

impl ResponseError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidParameters => (StatusCode::BAD_REQUEST, "invalid query parameters"),
            Self::UnsupportedLocale => (StatusCode::BAD_REQUEST, "unsupported locale"),
            Self::Database => (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong"),
        }
    }
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = self.status_and_message();
        super::error::Error::new(status, message).into_response()
    }
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct QueryParams {
    locale: Option<String>,
}

fn parse_locale(
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Locale, ResponseError> {
    let Query(params) = params.map_err(|err| {
        tracing::debug!(message = "unable to decode query parameters", error = %err);
        ResponseError::InvalidParameters
    })?;
    match params.locale.as_deref() {
        None | Some("") => Ok(Locale::default()),
        Some(value) => value.parse().map_err(|err| {
            tracing::debug!(message = "rejecting locale", error = %err);
            ResponseError::UnsupportedLocale
        }),
    }
}

#[derive(Debug, serde::Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub(crate) struct Item {
    id: i64,
    code: String,
    label: String,
}

impl Item {
    fn new(entity: MasterDataEntity, locale: Locale) -> Self {
        let label = locale
            .pick(&entity.label_en, entity.label_kn.as_deref())
            .to_string();
        Self {
            id: entity.id,
            code: entity.code,
            label,
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub(crate) struct RadiusItem {
    id: i64,
    code: String,
    label: String,
    kilometers: i64,
}

impl RadiusItem {
    fn new(entity: ServiceRadiusEntity, locale: Locale) -> Self {
        let label = locale
            .pick(&entity.label_en, entity.label_kn.as_deref())
            .to_string();
        Self {
            id: entity.id,
            code: entity.code,
            label,
            kilometers: entity.kilometers,
        }
    }
}

async fn list(
    database: crate::service::database::Pool,
    kind: Kind,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Vec<Item>>, ResponseError> {
    let locale = parse_locale(params)?;
    let items = ListActive::new(kind).execute(database.as_ref()).await?;
    tracing::debug!(message = "listing master data", kind = ?kind, locale = %locale, count = items.len());
    Ok(Json(
        items
            .into_iter()
            .map(|entity| Item::new(entity, locale))
            .collect(),
    ))
}

pub(super) async fn languages(
    Extension(database): Extension<crate::service::database::Pool>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Vec<Item>>, ResponseError> {
    list(database, Kind::Language, params).await
}

pub(super) async fn categories(
    Extension(database): Extension<crate::service::database::Pool>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Vec<Item>>, ResponseError> {
    list(database, Kind::Category, params).await
}

pub(super) async fn terms(
    Extension(database): Extension<crate::service::database::Pool>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Vec<Item>>, ResponseError> {
    list(database, Kind::Term, params).await
}

pub(super) async fn service_radius(
    Extension(database): Extension<crate::service::database::Pool>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Vec<RadiusItem>>, ResponseError> {
    let locale = parse_locale(params)?;
    let items = crate::entity::service_radius::ListActive
        .execute(database.as_ref())
        .await?;
    Ok(Json(
        items
            .into_iter()
            .map(|entity| RadiusItem::new(entity, locale))
            .collect(),
    ))
}
