use anyhow::Context;
use clap::Parser;
use pg_typecast::{Config, Pipeline};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "pg-typecast")]
#[command(
    about = "Decode PostgreSQL change payloads into native JSON types",
    long_about = None
)]
struct Args {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Read payloads from FILE instead of stdin"
    )]
    input: Option<PathBuf>,

    #[arg(
        short,
        long = "skip-type",
        value_name = "TYPE",
        help = "Leave values of this type unconverted"
    )]
    skip_type: Vec<String>,

    #[arg(short, long, help = "Pretty-print decoded changes")]
    pretty: bool,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    info!("Starting pg-typecast");

    let mut config = Config::load(args.config.as_deref())
        .with_context(|| format!("Failed to load configuration from {:?}", args.config))?;
    config.decoder.skip_types.extend(args.skip_type);
    config.output.pretty |= args.pretty;

    info!(
        skip_types = ?config.decoder.skip_types,
        pretty = config.output.pretty,
        input = ?args.input,
        "Configuration summary"
    );

    let pipeline = Pipeline::new(config);
    let mut stdout = tokio::io::stdout();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let stats = match args.input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open input {:?}", path))?;
            pipeline
                .run_until(BufReader::new(file), &mut stdout, shutdown)
                .await?
        }
        None => {
            pipeline
                .run_until(BufReader::new(tokio::io::stdin()), &mut stdout, shutdown)
                .await?
        }
    };

    if stats.rejected > 0 {
        error!(rejected = stats.rejected, "Some payloads could not be decoded");
    }

    Ok(())
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("pg_typecast=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("pg_typecast=info,warn"))
    };

    // stdout carries the decoded stream, logs go to stderr
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
