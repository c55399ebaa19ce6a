use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use dataset_captioner::CaptionerError;
use dataset_captioner::caption::{AzureOpenAiBackend, CaptionClient, RetryPolicy};
use dataset_captioner::config::credentials::{API_KEY_VAR, DEPLOYMENT_VAR, ENDPOINT_VAR};
use dataset_captioner::config::{AzureCredentials, RunConfig};
use dataset_captioner::pipeline::Pipeline;
use dataset_captioner::preprocess::{OutputFormat, PreprocessConfig, Preprocessor};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Generate image captions for training diffusion models.
#[derive(Parser, Debug)]
#[command(name = "captioner")]
#[command(about = "Generate image captions for training diffusion models")]
#[command(long_about = "Letterbox every image in the input folder to a fixed canvas,
caption it with an Azure OpenAI vision deployment and write image{N}.txt files,
captions.csv and dataset.json.

Requires AZURE_OPENAI_API_KEY, AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_DEPLOYMENT_NAME
(read from the environment or a .env file).")]
struct Args {
    /// Input folder containing images
    #[arg(long, default_value = "input")]
    input_folder: PathBuf,

    /// Output folder for processed images and caption files
    #[arg(long, default_value = "output")]
    output_folder: PathBuf,

    /// Prefix for each caption
    #[arg(long, default_value = "")]
    prefix: String,

    /// Suffix for each caption
    #[arg(long, default_value = "")]
    suffix: String,

    /// Disable JSON dataset creation
    #[arg(long)]
    no_json: bool,

    /// Disable the captions.csv table
    #[arg(long)]
    no_csv: bool,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 1024)]
    height: u32,

    /// Output image format
    #[arg(long, value_enum, default_value_t = FormatArg::Jpeg)]
    format: FormatArg,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 95)]
    quality: u8,

    /// Attempts per image before giving up
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 5)]
    retry_delay: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Jpeg,
    Png,
}

impl Args {
    fn output_format(&self) -> OutputFormat {
        match self.format {
            FormatArg::Jpeg => OutputFormat::Jpeg { quality: self.quality },
            FormatArg::Png => OutputFormat::Png,
        }
    }

    fn run_config(&self) -> RunConfig {
        RunConfig::new(&self.input_folder, &self.output_folder)
            .with_prefix(self.prefix.as_str())
            .with_suffix(self.suffix.as_str())
            .with_json(!self.no_json)
            .with_csv(!self.no_csv)
    }
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let credentials = match AzureCredentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Please set the required environment variables:");
            for name in [API_KEY_VAR, ENDPOINT_VAR, DEPLOYMENT_VAR] {
                eprintln!("  {name}");
            }
            eprintln!();
            eprintln!("{}", Args::command().render_usage());
            return ExitCode::from(2);
        }
    };

    match run(&args, &credentials) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            if e.downcast_ref::<CaptionerError>().is_some_and(CaptionerError::is_fatal) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(args: &Args, credentials: &AzureCredentials) -> Result<()> {
    let preprocess = PreprocessConfig::new(args.width, args.height, args.output_format());
    let policy = RetryPolicy::new(args.max_retries, Duration::from_secs(args.retry_delay));

    let backend =
        AzureOpenAiBackend::new(credentials).context("failed to set up inference client")?;
    let client = CaptionClient::new(backend).with_policy(policy);
    let mut pipeline = Pipeline::new(Preprocessor::new(preprocess), client);

    let summary = pipeline.run(&args.run_config())?;
    info!(
        "Captioned {}/{} images ({} preprocessing failures, {} caption failures, \
         {} write failures)",
        summary.captioned,
        summary.discovered,
        summary.preprocess_failures,
        summary.caption_failures,
        summary.persist_failures
    );
    if let Some(path) = summary.manifest_path {
        info!("Dataset manifest: {}", path.display());
    }
    Ok(())
}
