use axum::routing::get;

pub(crate) mod error;
mod master_data;
mod status;

pub(super) fn router() -> axum::Router {
    axum::Router::new()
        .route("/status", get(status::handle))
        .route("/master-data/languages", get(master_data::languages))
        .route("/master-data/categories", get(master_data::categories))
        .route("/master-data/terms", get(master_data::terms))
        .route("/master-data/service-radius", get(master_data::service_radius))
}
