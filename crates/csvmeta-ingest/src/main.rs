//! CSV Metadata Ingest - Lambda entry point and local invoker

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use csvmeta_common::logging::{init_logging, LogConfig, LogLevel};
use csvmeta_ingest::{
    clients,
    config::{self, IngestConfig},
    event, handler, IngestContext, InvocationResponse,
};
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "csvmeta-ingest")]
#[command(author, version, about = "Extract CSV metadata from S3 event notifications")]
struct Cli {
    /// Defaults to `lambda`, which is what the Lambda runtime launches
    #[command(subcommand)]
    command: Option<Command>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dotenv file to load instead of `./.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve invocations from the Lambda runtime API
    Lambda,

    /// Run one S3 event document against the configured backends
    Invoke {
        /// Path to the event JSON
        #[arg(short, long)]
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Before anything reads the environment, logging included
    config::load_env_file(cli.env_file.as_deref())?;

    let _log_guard = init_logging(&log_config(cli.verbose)?)?;

    let config = IngestConfig::from_env()?;
    let ctx = clients::build_context(&config).await;

    match cli.command.unwrap_or(Command::Lambda) {
        Command::Lambda => {
            info!("Starting Lambda runtime loop");
            run_lambda(ctx).await?;
            Ok(ExitCode::SUCCESS)
        },
        Command::Invoke { event } => {
            let response = invoke_file(&ctx, &event).await?;
            println!("{}", serde_json::to_string(&response)?);

            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        },
    }
}

/// CLI defaults, overridden by `LOG_*` environment variables
fn log_config(verbose: bool) -> Result<LogConfig> {
    let log_level = if verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let base = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("csvmeta-ingest")
        .filter_directives("aws_config=warn,aws_smithy_runtime=warn,hyper=warn")
        .build();

    LogConfig::from_env_with(base)
}

async fn run_lambda(ctx: IngestContext) -> Result<()> {
    let func = service_fn(move |event: LambdaEvent<Value>| {
        let ctx = ctx.clone();

        async move {
            info!(request_id = %event.context.request_id, "Invocation received");
            Ok::<InvocationResponse, lambda_runtime::Error>(
                handler::handle(&ctx, &event.payload).await,
            )
        }
    });

    lambda_runtime::run(func)
        .await
        .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {}", e))
}

async fn invoke_file(ctx: &IngestContext, path: &Path) -> Result<InvocationResponse> {
    let event = event::read_event_file(path).await?;
    Ok(handler::handle(ctx, &event).await)
}
