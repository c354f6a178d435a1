//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};

/// Prompt-to-gallery image generation: a Gemini proxy server and its batch client.
#[derive(Parser, Debug)]
#[command(name = "imagegen", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP proxy in front of the Gemini API.
    Serve(ServeArgs),
    /// Generate a batch of images through a running proxy.
    Generate(GenerateArgs),
}

/// Options for `imagegen serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (defaults to the config file, then 0.0.0.0).
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (defaults to the config file, then 3000).
    #[arg(long)]
    pub port: Option<u16>,
}

/// Options for `imagegen generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Text prompt describing the desired image.
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt text.
    #[arg(short = 'p', long, conflicts_with = "prompt")]
    pub prompt_file: Option<String>,

    /// Aspect ratio as W/H (e.g., 1/1, 16/9, 9/16).
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Base size in pixels; the geometric mean of width and height.
    #[arg(short, long)]
    pub base_size: Option<u32>,

    /// Number of images to generate.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output format: jpeg, png, webp.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output file path (auto-generated if not specified).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Proxy server URL.
    #[arg(long)]
    pub server: Option<String>,
}

impl GenerateArgs {
    /// Resolve the prompt from either the positional argument or the file flag.
    ///
    /// # Errors
    ///
    /// Returns an error if neither prompt nor prompt-file is provided,
    /// or if the file cannot be read.
    pub fn resolve_prompt(&self) -> Result<String, std::io::Error> {
        if let Some(ref text) = self.prompt {
            Ok(text.clone())
        } else if let Some(ref path) = self.prompt_file {
            std::fs::read_to_string(path)
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Provide a prompt string or use -p/--prompt-file",
            ))
        }
    }
}
