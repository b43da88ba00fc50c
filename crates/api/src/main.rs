use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    talentbase_observability::init();

    let config = talentbase_api::config::Config::from_env()?;

    let pool = talentbase_infra::db::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    talentbase_infra::db::migrate(&pool)
        .await
        .context("failed to run migrations")?;

    let app = talentbase_api::app::build_app(pool, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
