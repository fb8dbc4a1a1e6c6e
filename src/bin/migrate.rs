use anyhow::{Context, Result};
use clap::Parser;
use coinvault::{config::AppConfig, db, migrations};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coinvault-migrate")]
#[command(about = "Bring the coin store schema up to date")]
struct Cli {
    /// Store URL; defaults to DATABASE_URL or the application default.
    #[arg(long)]
    database_url: Option<String>,
    /// Print the migration plan without applying it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coinvault=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("failed to read configuration")?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    if cli.dry_run {
        let pool = db::connect_read_only(&config)
            .await
            .with_context(|| format!("failed to open coin store at {}", config.database_url))?;
        let plan = migrations::plan(&pool)
            .await
            .context("failed to inspect coin schema")?;
        print!("{plan}");
        return Ok(());
    }

    let pool = db::connect(&config)
        .await
        .with_context(|| format!("failed to open coin store at {}", config.database_url))?;
    let plan = migrations::run(&pool)
        .await
        .context("failed to migrate coin schema")?;
    print!("{plan}");
    println!("Migrations applied successfully");
    Ok(())
}
