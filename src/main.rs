use anyhow::Context;
use studentorg::{db, App, AppContext, ConfigBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigBuilder::new()
        .from_env()
        .build()
        .context("invalid configuration")?;

    studentorg::init_tracing_with_config(&config.logging);

    let connection = db::connect(&config.database)
        .await
        .context("database connection failed")?;

    if config.database.auto_migrate {
        db::run_migrations(&connection)
            .await
            .context("migrations failed")?;
    }

    App::new(config, AppContext::new(connection)).serve().await?;
    Ok(())
}
