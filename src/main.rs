//! Imagegen - prompt-to-gallery image generation over Gemini.

mod adapters;
mod batch;
mod cassette;
mod cli;
mod config;
mod context;
mod dimensions;
mod error;
mod output;
mod params;
mod ports;
mod server;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::batch::{BatchGenerator, BatchRequest};
use crate::cli::{Cli, Command, GenerateArgs, ServeArgs};
use crate::config::Config;
use crate::context::{RecordingSession, ServiceContext};
use crate::dimensions::resolve_dimensions;
use crate::error::ImageError;
use crate::output::{resolve_output_path, FileSink};
use crate::params::{validate_base_size, OutputFormat};
use crate::server::AppState;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "imagegen=debug,info" } else { "imagegen=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<(), ImageError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(ImageError::Config)?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    match cli.command {
        Command::Serve(args) => serve(args, &config).await,
        Command::Generate(args) => generate(args, &config).await,
    }
}

async fn serve(args: ServeArgs, config: &Config) -> Result<(), ImageError> {
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| ImageError::InvalidArgument(format!("Invalid bind address {host}:{port}: {e}")))?;

    // Missing credentials fail here, before the listener is bound.
    let (ctx, recording) = ServiceContext::from_env(|| ServiceContext::upstream(config))?;

    let state = AppState {
        batch: Arc::new(BatchGenerator::new(ctx.generator)),
        model: Arc::from(config.upstream.model.as_str()),
        max_count: config.server.max_count,
    };
    tracing::info!(model = %config.upstream.model, max_count = state.max_count, "starting proxy");

    let served = server::serve(state, addr).await;
    finish_recording(recording);
    served
}

async fn generate(args: GenerateArgs, config: &Config) -> Result<(), ImageError> {
    let prompt = args.resolve_prompt().map_err(ImageError::Io)?;
    if prompt.trim().is_empty() {
        return Err(ImageError::Validation("Prompt is required".to_string()));
    }

    let defaults = &config.defaults;
    let aspect_ratio = args.aspect_ratio.as_deref().unwrap_or(&defaults.aspect_ratio);
    let base_size = args.base_size.unwrap_or(defaults.base_size);
    let count = args.count.unwrap_or(defaults.count);
    let format: OutputFormat = args
        .format
        .as_deref()
        .unwrap_or(&defaults.format)
        .parse()
        .map_err(ImageError::InvalidArgument)?;
    let server_url = args.server.as_deref().unwrap_or(&defaults.server_url);

    validate_base_size(base_size).map_err(ImageError::InvalidArgument)?;
    let dimensions = resolve_dimensions(aspect_ratio, base_size)?;
    tracing::debug!(%aspect_ratio, %dimensions, count, %format, %server_url, "resolved request");

    let (ctx, recording) = ServiceContext::from_env(|| Ok(ServiceContext::proxy(server_url)))?;
    let batch = BatchGenerator::new(ctx.generator);

    let base_path = resolve_output_path(args.output.as_deref(), &prompt, format);
    let sink = FileSink::new(base_path, format, count);
    let request = BatchRequest { prompt, dimensions, count };

    let results = batch.generate(&request, &sink).await;
    finish_recording(recording);
    let results = results?;

    let saved = sink.saved().len();
    if count > 0 && saved == 0 {
        return Err(ImageError::AllSlotsFailed { count: results.len() });
    }
    if saved < count {
        eprintln!("Generated {saved} of {count} image(s)");
    }
    Ok(())
}

fn finish_recording(recording: Option<RecordingSession>) {
    if let Some(session) = recording {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }
}
