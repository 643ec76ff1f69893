// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use ocr_stream::config::DEFAULT_CONFIG_PATH;
use ocr_stream::utils::logging::{format_error, format_info, format_success, format_warning};
use ocr_stream::{
    Config, ExtractionMode, ExtractionRequest, FormatOption, ImageEncoder, OcrError, PromptBuilder,
    Session, TerminalRenderer, UploadFormat, Validator, WaitIndicator,
};
use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "ocr_stream")]
#[command(version = "0.1.0")]
#[command(about = "Extract text from images with a streaming multimodal model", long_about = None)]
struct Cli {
    /// Configuration file; config/default.toml is used when present
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Colored output; defaults to the [output] color setting
    #[arg(long, action = ArgAction::Set)]
    color: Option<bool>,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from an image and stream it to stdout
    Extract {
        /// Image file (jpg, jpeg, png, bmp, gif, tiff, webp)
        image: PathBuf,

        /// OpenRouter API key; prompted for when omitted on a terminal
        #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        #[arg(short, long, value_enum)]
        mode: Option<ExtractionMode>,

        /// Output formatting instruction (repeatable)
        #[arg(short = 'f', long = "format", value_enum)]
        formats: Vec<FormatOption>,

        /// Send no formatting instructions at all
        #[arg(long, conflicts_with = "formats")]
        no_formatting: bool,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },

    /// Print the system instruction for the given options
    Prompt {
        #[arg(short, long, value_enum)]
        mode: Option<ExtractionMode>,

        #[arg(short = 'f', long = "format", value_enum)]
        formats: Vec<FormatOption>,

        #[arg(long, conflicts_with = "formats")]
        no_formatting: bool,
    },

    /// List accepted image formats
    Formats,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let color = config.output.color_enabled(cli.color);

    ocr_stream::utils::logging::init_logger(color, cli.verbose);
    if !color {
        colored::control::set_override(false);
    }

    debug!(
        "Configuration loaded from {}",
        cli.config
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("{} (optional) and environment", DEFAULT_CONFIG_PATH))
    );

    match cli.command {
        Commands::Extract {
            image,
            api_key,
            mode,
            formats,
            no_formatting,
            model,
        } => {
            let options = resolve_options(&config, mode, formats, no_formatting);
            cmd_extract(config, image, api_key, options, model, color).await
        }
        Commands::Prompt {
            mode,
            formats,
            no_formatting,
        } => {
            let (mode, formatting) = resolve_options(&config, mode, formats, no_formatting);
            println!("{}", PromptBuilder::system_instruction(mode, &formatting));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Formats => {
            cmd_formats();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_options(
    config: &Config,
    mode: Option<ExtractionMode>,
    formats: Vec<FormatOption>,
    no_formatting: bool,
) -> (ExtractionMode, BTreeSet<FormatOption>) {
    let mode = mode.unwrap_or(config.extraction.mode);
    let formatting = if no_formatting {
        BTreeSet::new()
    } else if formats.is_empty() {
        config.extraction.formatting.iter().copied().collect()
    } else {
        formats.into_iter().collect()
    };
    (mode, formatting)
}

async fn cmd_extract(
    mut config: Config,
    image: PathBuf,
    api_key: Option<String>,
    (mode, formatting): (ExtractionMode, BTreeSet<FormatOption>),
    model: Option<String>,
    color: bool,
) -> Result<ExitCode> {
    if let Some(model) = model {
        config.provider.model = model;
    }

    let upload = match ImageEncoder::read_upload(&image) {
        Ok(upload) => upload,
        Err(e) => return Ok(report_failure(&e)),
    };
    info!(
        "Loaded {} ({} bytes, {})",
        image.display(),
        upload.bytes.len(),
        upload.format.mime_type()
    );

    let credential = api_key.unwrap_or_else(prompt_for_credential);

    let request = ExtractionRequest::new(
        upload.bytes,
        upload.format.submission_format(),
        credential,
    )
    .with_mode(mode)
    .with_format_options(formatting);

    let mut session = Session::from_config(&config);

    let shutdown = session.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping extraction");
            shutdown.cancel();
        }
    });

    let spinner = WaitIndicator::start(
        format!("Extracting text with {}", config.provider.model),
        config.output.spinner && std::io::stderr().is_terminal(),
        color,
    );
    let mut renderer =
        TerminalRenderer::new(std::io::stdout()).with_wait_indicator(spinner.clone());

    let result = session.run(&request, &mut renderer).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) if outcome.cancelled => {
            if !outcome.text.is_empty() && !outcome.text.ends_with('\n') {
                println!();
            }
            eprintln!(
                "{}",
                format_warning(&format!(
                    "Extraction cancelled; {} characters shown",
                    outcome.text.chars().count()
                ))
            );
            Ok(ExitCode::from(130))
        }
        Ok(outcome) => {
            if outcome.text.is_empty() {
                eprintln!("{}", format_warning("The model returned no text"));
            } else {
                eprintln!("{}", format_success(&outcome.summary()));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if let Some(partial) = e.partial_text()
                && !partial.ends_with('\n')
            {
                println!();
            }
            Ok(report_failure(&e))
        }
    }
}

fn report_failure(err: &OcrError) -> ExitCode {
    eprintln!("{}", format_error(&err.to_string()));
    match err {
        OcrError::MissingCredential => {
            eprintln!(
                "{}",
                format_info("Pass --api-key or set OPENROUTER_API_KEY (keys: https://openrouter.ai/keys)")
            );
        }
        OcrError::StreamInterrupted { .. } => {
            eprintln!("{}", format_info("Partial output above was kept; run again to retry"));
        }
        _ => {}
    }
    ExitCode::FAILURE
}

fn prompt_for_credential() -> String {
    if !std::io::stdin().is_terminal() {
        return String::new();
    }

    inquire::Password::new("Enter your OpenRouter API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .unwrap_or_else(|e| {
            debug!("Credential prompt aborted: {}", e);
            String::new()
        })
}

fn cmd_formats() {
    println!("Accepted image formats:");
    for format in UploadFormat::ALL {
        println!(
            "  {:<12} {:<11} -> submitted as {}",
            format.extensions().join(", "),
            format.mime_type(),
            format.submission_format()
        );
    }
    println!();
    println!("Extensions: {}", Validator::accepted_extensions().join(" "));
}
