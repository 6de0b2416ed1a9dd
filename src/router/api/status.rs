use axum::{http::StatusCode, Extension};

pub(crate) async fn handle(
    Extension(database): Extension<crate::service::database::Pool>,
) -> StatusCode {
    match database.ping().await {
        Ok(_) => StatusCode::NO_CONTENT,
        Err(err) => {
            tracing::error!(message = "unable to ping database", error = %err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    fn request() -> Request<Body> {
        Request::builder()
            .uri("/api/status")
            .method("GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn should_be_healthy() {
        crate::enable_tracing();
        let app = crate::app::Application::test().await;

        let res = app.handle(request()).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn closed_database_should_fail() {
        crate::enable_tracing();
        let app = crate::app::Application::test().await;
        app.database().close().await;

        let res = app.handle(request()).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
