mod job;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdf_rebrand::{ComposeOptions, MaskSettings, ResolvedProfile};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdft", about = "Flyer rebranding tools", version)]
struct Cli {
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the size and rotation of every page
    Inspect {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the generated initial blocks for one page as JSON
    Layout {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Profile JSON file
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Bottom band height in display units
        #[arg(long)]
        bottom_height: Option<f32>,

        /// Left strip width in display units
        #[arg(long)]
        left_width: Option<f32>,

        /// Mask the left edge as well as the bottom
        #[arg(long)]
        l_shape: bool,
    },

    /// Compose the pages of a job file into one PDF
    Compose {
        /// Job JSON file
        #[arg(short, long)]
        job: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Options JSON file
        #[arg(long)]
        options: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Inspect { input } => {
            let bytes = pdf_rebrand::load_pdf_bytes(&input).await?;
            let pages = pdf_rebrand::inspect_pages(&bytes)?;
            println!("{}: {} pages", input.display(), pages.len());
            for (index, page) in pages.iter().enumerate() {
                let display = page.display_size();
                println!(
                    "  Page {}: {} x {} pt, rotate {}, displayed {} x {}",
                    index + 1,
                    page.raw.raw_width,
                    page.raw.raw_height,
                    page.rotation.degrees(),
                    display.width,
                    display.height
                );
            }
        }

        Commands::Layout {
            input,
            page,
            profile,
            bottom_height,
            left_width,
            l_shape,
        } => {
            let profile = match profile {
                Some(path) => load_profile(&path).await?,
                None => ResolvedProfile::default(),
            };
            let defaults = MaskSettings::default();
            let mask = MaskSettings {
                bottom_height: bottom_height.unwrap_or(defaults.bottom_height),
                left_width: left_width.unwrap_or(defaults.left_width),
                enable_l_shape: l_shape,
            };

            let bytes = pdf_rebrand::load_pdf_bytes(&input).await?;
            let prepared = pdf_rebrand::prepare_page_with_mask(&bytes, page, &mask, &profile)?;
            for warning in &prepared.mask.warnings {
                log::warn!("{}", warning);
            }
            println!("{}", serde_json::to_string_pretty(&prepared.blocks)?);
        }

        Commands::Compose {
            job,
            output,
            options,
        } => {
            let options = match options {
                Some(path) => ComposeOptions::load(&path)
                    .await
                    .with_context(|| format!("Failed to load options {}", path.display()))?,
                None => ComposeOptions::default(),
            };

            let request = job::JobFile::load(&job).await?.into_request(options).await?;
            let result = pdf_rebrand::compose(request).await?;
            pdf_rebrand::save_pdf_bytes(&output, &result.bytes).await?;

            println!("Composition:");
            for page in &result.pages {
                println!(
                    "  Page {}: source {} page {}, rotate {}, scale {:.3}, {} drawn, {} skipped",
                    page.page_index + 1,
                    page.source_index,
                    page.page_number,
                    page.rotation.degrees(),
                    page.scale_ratio,
                    page.blocks_drawn(),
                    page.blocks_skipped
                );
                for warning in &page.warnings {
                    println!("    warning: {}", warning);
                }
            }
            println!("Composed {} pages → {}", result.pages.len(), output.display());
        }
    }

    Ok(())
}

async fn load_profile(path: &std::path::Path) -> Result<ResolvedProfile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse profile {}", path.display()))
}
