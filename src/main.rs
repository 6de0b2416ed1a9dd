mod app;
mod entity;
mod helper;
mod router;
mod service;

fn enable_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // tests call this once per case, only the first registration wins
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // axum logs rejections from built-in extractors with the `axum::rejection`
            // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
            "vipra_sethu=debug,tower_http=debug,axum::rejection=trace".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    enable_tracing();

    let config = app::Config::from_env()?;
    let app = config.build().await?;
    app.run().await?;

    Ok(())
}
