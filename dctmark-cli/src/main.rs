//! DCTMark CLI - frequency-domain image watermarking tool.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dctmark_core::{AttackKind, EmbeddingRegion};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error (invalid arguments or configuration)
  65  Data error (image sizes or region do not fit)
  66  Cannot read input image or config file
  74  Cannot write output file";

#[derive(Parser)]
#[command(name = "dctmark")]
#[command(author, version, about = "Frequency-domain image watermarking", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Suppress report output (errors are still printed)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// When to use colors in the report
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn apply(self) {
        match self {
            ColorChoice::Auto => {}
            ColorChoice::Always => colored::control::set_override(true),
            ColorChoice::Never => colored::control::set_override(false),
        }
    }
}

/// Report format for the evaluate command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Embedding parameters shared by embed and extract.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct EmbeddingArgs {
    /// Embedding strength [default: 10, or DCTMARK_STRENGTH]
    #[arg(short, long)]
    pub strength: Option<f64>,

    /// Coefficient region as x,y,width,height [default: 100,100,32,32, or DCTMARK_REGION]
    #[arg(short, long, value_name = "X,Y,W,H")]
    pub region: Option<EmbeddingRegion>,
}

/// Attack parameters. Only the ones relevant to the chosen kind are used.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct AttackArgs {
    /// Horizontal shift for translate
    #[arg(long, allow_negative_numbers = true)]
    pub dx: Option<i32>,

    /// Vertical shift for translate
    #[arg(long, allow_negative_numbers = true)]
    pub dy: Option<i32>,

    /// Margin removed from every side for crop
    #[arg(long)]
    pub margin: Option<u32>,

    /// Intensity multiplier for contrast
    #[arg(long)]
    pub factor: Option<f64>,

    /// Odd Gaussian kernel size for blur, 3 to 1001
    #[arg(long)]
    pub kernel_size: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a watermark into a host image
    Embed {
        /// Host image
        #[arg(value_name = "HOST")]
        host: PathBuf,

        /// Watermark image (resized to the region)
        #[arg(value_name = "WATERMARK")]
        watermark: PathBuf,

        /// Output path for the watermarked image
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        embedding: EmbeddingArgs,
    },

    /// Recover a watermark by comparing an image against the original
    Extract {
        /// Possibly watermarked image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Original, unwatermarked host image
        #[arg(value_name = "ORIGINAL")]
        original: PathBuf,

        /// Output path for the recovered watermark
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        embedding: EmbeddingArgs,

        /// Resize IMAGE to the size of ORIGINAL before extracting
        #[arg(long)]
        resize: bool,

        /// Watermark to score the recovery against
        #[arg(long, value_name = "WATERMARK")]
        reference: Option<PathBuf>,
    },

    /// Apply one attack to an image
    Attack {
        /// Input image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Attack to apply: mirror, translate, crop, contrast or blur
        #[arg(value_name = "KIND")]
        kind: AttackKind,

        /// Output path for the attacked image
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        params: AttackArgs,
    },

    /// Embed, run the attack suite and score every extraction
    Evaluate {
        /// Host image
        #[arg(value_name = "HOST")]
        host: PathBuf,

        /// Watermark image (resized to the region)
        #[arg(value_name = "WATERMARK")]
        watermark: PathBuf,

        /// Directory for the watermarked, attacked and extracted images
        #[arg(short = 'd', long)]
        output_dir: PathBuf,

        /// Comma-separated attacks to run, in order [default: all]
        #[arg(short, long, value_name = "LIST")]
        attacks: Option<String>,

        /// JSON configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        embedding: EmbeddingArgs,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands, quiet: bool) -> Result<()> {
    match command {
        Commands::Embed {
            host,
            watermark,
            output,
            embedding,
        } => commands::embed::execute(host, watermark, output, embedding, quiet),
        Commands::Extract {
            image,
            original,
            output,
            embedding,
            resize,
            reference,
        } => commands::extract::execute(
            commands::extract::ExtractOptions {
                image,
                original,
                output,
                resize,
                reference,
            },
            embedding,
            quiet,
        ),
        Commands::Attack {
            image,
            kind,
            output,
            params,
        } => commands::attack::execute(image, kind, output, params, quiet),
        Commands::Evaluate {
            host,
            watermark,
            output_dir,
            attacks,
            config,
            embedding,
            format,
        } => commands::evaluate::execute(
            commands::evaluate::EvaluateOptions {
                host,
                watermark,
                output_dir,
                attacks,
                config,
                format,
            },
            embedding,
            quiet,
        ),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(exit_codes::USAGE_ERROR);
        }
        Err(e) => e.exit(),
    };

    init_tracing(cli.verbose);
    cli.color.apply();

    if let Err(err) = run(cli.command, cli.quiet) {
        let exit = ExitCode::from_anyhow(&err);
        debug!(code = exit.code, "Command failed");
        eprintln!("{} {}", "Error:".red().bold(), exit.message);
        std::process::exit(exit.code);
    }
}
