use axum::routing::{get, post};

mod callback;
mod cookies;
mod login;
mod logout;
mod magic_link;
pub(crate) mod redirect;

pub(super) const AUTH_FAILED: &str = "auth_failed";

pub(super) fn router() -> axum::Router {
    axum::Router::new()
        .route("/callback", get(callback::handle))
        .route("/login", get(login::handle))
        .route("/logout", post(logout::handle))
        .route("/magic-link", post(magic_link::handle))
}
