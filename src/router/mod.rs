mod api;
mod auth;

pub(crate) fn create() -> axum::Router {
    axum::Router::new()
        .nest("/api", api::router())
        .nest("/auth", auth::router())
}
