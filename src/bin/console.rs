use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coinvault::{
    config::AppConfig,
    console::{self, ConsoleError, app::App},
    db,
};

#[derive(Parser)]
#[command(name = "coinvault-console")]
#[command(about = "Browse the tables of the coin store")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://coins.db")]
    database_url: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List the tables in the store.
    Tables,
    /// Print the contents of one table.
    Dump { table: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::for_database(cli.database_url);
    let pool = db::connect_read_only(&config)
        .await
        .with_context(|| format!("failed to open coin store at {}", config.database_url))?;

    match cli.command {
        None => App::new(pool).run().await.context("console failed")?,
        Some(Command::Tables) => print_tables(&pool).await?,
        Some(Command::Dump { table }) => match dump(&pool, &table).await {
            Ok(rendered) => println!("{rendered}"),
            // Operator mistakes are reported, not treated as crashes.
            Err(err @ (ConsoleError::EmptyName | ConsoleError::UnknownTable(_))) => {
                println!("{err}")
            }
            Err(err) => return Err(err).context("failed to dump table"),
        },
    }

    Ok(())
}

async fn print_tables(pool: &sqlx::SqlitePool) -> Result<()> {
    let tables = console::list_tables(pool)
        .await
        .context("failed to list tables")?;

    if tables.is_empty() {
        println!("No tables found in the database.");
        return Ok(());
    }

    println!("Available tables:");
    for table in tables {
        println!("  - {table}");
    }
    Ok(())
}

async fn dump(pool: &sqlx::SqlitePool, requested: &str) -> Result<String, ConsoleError> {
    let table = console::resolve_table(pool, requested).await?;
    let dump = console::dump_table(pool, &table).await?;
    Ok(format!("Contents of '{}':\n{}", dump.table, dump.render()))
}
