use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Extension;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::helper::parse_env_or;
use crate::service::base_url::BaseUrl;
use crate::service::identity::SharedIdentityProvider;

pub(crate) struct Config {
    host: std::net::IpAddr,
    port: u16,
    base_url: Option<String>,

    database: crate::service::database::Config,
    dataset: crate::service::dataset::Config,
    identity: crate::service::identity::Config,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: parse_env_or("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)))?,
            port: parse_env_or("PORT", 3000)?,
            base_url: std::env::var("BASE_URL").ok(),

            database: crate::service::database::Config::from_env()?,
            dataset: crate::service::dataset::Config::from_env()?,
            identity: crate::service::identity::Config::from_env()?,
        })
    }

    pub async fn build(self) -> anyhow::Result<Application> {
        let base_url = match self.base_url {
            Some(ref value) => BaseUrl::parse(value)?,
            None => BaseUrl::parse(&format!("http://{}:{}", self.host, self.port))?,
        };

        let database = self.database.build().await?;
        database.upgrade().await?;

        self.dataset.synchronize(&database).await?;

        let identity = self.identity.build(&base_url)?;

        Ok(Application {
            socket_address: SocketAddr::from((self.host, self.port)),
            base_url,
            database,
            identity: Arc::new(identity),
        })
    }
}

pub(crate) struct Application {
    socket_address: SocketAddr,
    base_url: BaseUrl,
    database: crate::service::database::Pool,
    identity: SharedIdentityProvider,
}

impl Application {
    fn router(&self) -> axum::Router {
        crate::router::create()
            .layer(Extension(self.base_url.clone()))
            .layer(Extension(self.database.clone()))
            .layer(Extension(self.identity.clone()))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!("binding socket to {}", self.socket_address);
        let listener = TcpListener::bind(self.socket_address).await?;
        tracing::info!(
            message = "listening",
            address = %self.socket_address,
            base_url = %self.base_url.as_url(),
        );
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) const TEST_ORIGIN: &str = "http://localhost:3000";

#[cfg(test)]
impl Application {
    pub(crate) async fn test() -> Self {
        Self::test_with_identity(Arc::new(crate::service::identity::fake::Provider::default()))
            .await
    }

    pub(crate) async fn test_with_identity(identity: SharedIdentityProvider) -> Self {
        let database = crate::service::database::Config::default()
            .build()
            .await
            .unwrap();
        database.upgrade().await.unwrap();

        crate::service::dataset::RootConfig::test()
            .synchronize(&database)
            .await
            .unwrap();

        Self {
            socket_address: SocketAddr::from((Ipv4Addr::new(127, 0, 0, 1), 3000)),
            base_url: BaseUrl::parse(TEST_ORIGIN).unwrap(),
            database,
            identity,
        }
    }

    pub(crate) fn database(&self) -> &sqlx::SqlitePool {
        self.database.as_ref()
    }

    pub(crate) async fn handle(
        &self,
        req: axum::http::Request<axum::body::Body>,
    ) -> axum::http::Response<axum::body::Body> {
        use tower::ServiceExt;

        self.router().oneshot(req).await.unwrap()
    }
}
