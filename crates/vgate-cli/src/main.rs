mod commands;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "vgate-cli")]
#[command(about = "Operator runs of the vgate content pipeline, without the server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate, gate and repurpose ideas, appending accepted variants to the ledger
    Generate {
        /// Niche to generate for (defaults to today's niche in the rotation)
        #[arg(long)]
        niche: Option<String>,

        /// Use only the first N configured channels, for a single idea
        #[arg(long)]
        channels: Option<usize>,

        /// Number of ideas to generate (defaults to `VGATE_IDEAS_PER_RUN`)
        #[arg(long, conflicts_with = "channels")]
        ideas: Option<usize>,

        /// Print accepted variants as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-simulate performance for content created today
    Track,
    /// Print the seven-day niche plan
    Plan {
        /// First day of the plan, `YYYY-MM-DD` (defaults to today)
        #[arg(long)]
        start: Option<chrono::NaiveDate>,
    },
    /// Summarize the last seven days of the ledger
    Analyze {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = vgate_core::load_app_config()?;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("vgate-cli: no command given; try --help");
        return Ok(());
    };

    let ctx = commands::Context::from_config(&config)?;
    match command {
        Commands::Generate {
            niche,
            channels,
            ideas,
            json,
        } => {
            commands::run_generate(&ctx, niche.as_deref(), channels, ideas, json).await?;
        }
        Commands::Track => commands::run_track(&ctx).await?,
        Commands::Plan { start } => commands::run_plan(&ctx, start)?,
        Commands::Analyze { json } => commands::run_analyze(&ctx, json).await?,
    }

    Ok(())
}
