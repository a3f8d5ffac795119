use clap::{Parser, Subcommand};

mod aggregate;
mod measure;


#[derive(Debug, Parser)]
#[command(name = "rankwatch")]
#[command(about = "App-store keyword position measurement and aggregation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one measurement pass over all eligible keywords.
    ///
    /// Meant to be triggered several times a day by an external scheduler.
    Measure {
        /// Override the configured worker count.
        #[arg(long)]
        workers: Option<usize>,
        /// Override the configured fetch channel (http or browser).
        #[arg(long)]
        channel: Option<String>,
        /// List what would be measured without fetching anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Reduce one day's raw observations into daily aggregate rows.
    Aggregate {
        /// Day to aggregate, formatted YYYY-MM-DD.
        day: String,
    },
    /// Database maintenance commands.
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify the database is reachable.
    Ping,
    /// Apply pending migrations.
    Migrate,
    /// Insert development fixtures.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given (try --help)");
        return Ok(());
    };

    let config = rankwatch_core::load_app_config()?;
    init_tracing(&config.log_level);

    let pool_config = rankwatch_db::PoolConfig {
        max_connections: config.db_max_connections,
        min_connections: config.db_min_connections,
        acquire_timeout_secs: config.db_acquire_timeout_secs,
    };
    let pool = rankwatch_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Measure {
            workers,
            channel,
            dry_run,
        } => measure::run(pool, &config, workers, channel.as_deref(), dry_run).await,
        Commands::Aggregate { day } => aggregate::run(pool, &day).await,
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                rankwatch_db::ping(&pool).await?;
                println!("database is reachable");
                Ok(())
            }
            DbCommands::Migrate => {
                let applied = rankwatch_db::run_migrations(&pool).await?;
                println!("applied {applied} migrations");
                Ok(())
            }
            DbCommands::Seed => {
                let seeded = rankwatch_db::seed_dev_data(&pool).await?;
                println!("seeded {seeded} apps with their keywords");
                Ok(())
            }
        },
    }
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
