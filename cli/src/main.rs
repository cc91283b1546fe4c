//! imgdeck CLI - image archive to slide deck tool
//!
//! Builds a widescreen PPTX with one cropped, scaled and aligned picture per
//! image found in a ZIP archive.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use imgdeck::driver::{self, GenerateRequest};
use imgdeck::{CropMargins, DeckSummary, HorizontalAlignment, ImageOutcome, VerticalAlignment};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;

/// Image archive to widescreen PowerPoint deck
#[derive(Parser)]
#[command(
    name = "imgdeck",
    author = "iyulab",
    version,
    about = "Turn a ZIP of images into a slide deck",
    long_about = "imgdeck - build a 13.33in x 7.5in PowerPoint deck from a ZIP of images.\n\n\
                  Each image is cropped, scaled to a fixed height and aligned on its own slide."
)]
struct Cli {
    /// Log more (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a deck from a ZIP archive of images
    Build(BuildArgs),

    /// List the images a ZIP archive would contribute
    #[command(visible_alias = "ls")]
    List {
        /// Input ZIP archive
        input: PathBuf,
    },

    /// Show slide size and picture placement of a deck
    Info {
        /// Input PPTX file
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct BuildArgs {
    /// Input ZIP archive
    input: PathBuf,

    /// Output PPTX file
    #[arg(short, long, default_value = driver::DEFAULT_OUTPUT_NAME)]
    output: PathBuf,

    /// Presentation to build on (masters, layouts and existing slides are kept)
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Pixels cropped from the left edge
    #[arg(long, default_value = "250")]
    crop_left: u32,

    /// Pixels cropped from the right edge
    #[arg(long, default_value = "0")]
    crop_right: u32,

    /// Pixels cropped from the top edge
    #[arg(long, default_value = "0")]
    crop_top: u32,

    /// Pixels cropped from the bottom edge
    #[arg(long, default_value = "42")]
    crop_bottom: u32,

    /// Picture height in inches (1.0-10.0)
    #[arg(long, default_value = "6.0")]
    height: f64,

    /// Horizontal alignment
    #[arg(long, default_value = "left")]
    horizontal: Horizontal,

    /// Vertical alignment
    #[arg(long, default_value = "top")]
    vertical: Vertical,

    /// Print the build report as JSON
    #[arg(long)]
    json: bool,
}

/// Horizontal alignment
#[derive(Clone, Copy, ValueEnum)]
enum Horizontal {
    Left,
    Center,
    Right,
}

impl From<Horizontal> for HorizontalAlignment {
    fn from(value: Horizontal) -> Self {
        match value {
            Horizontal::Left => HorizontalAlignment::Left,
            Horizontal::Center => HorizontalAlignment::Center,
            Horizontal::Right => HorizontalAlignment::Right,
        }
    }
}

/// Vertical alignment
#[derive(Clone, Copy, ValueEnum)]
enum Vertical {
    Top,
    Middle,
    Bottom,
}

impl From<Vertical> for VerticalAlignment {
    fn from(value: Vertical) -> Self {
        match value {
            Vertical::Top => VerticalAlignment::Top,
            Vertical::Middle => VerticalAlignment::Middle,
            Vertical::Bottom => VerticalAlignment::Bottom,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Build(args) => build(args)?,

        Commands::List { input } => {
            let names = imgdeck::list_images(fs::File::open(&input)?)?;
            if names.is_empty() {
                println!("{} No images found in {}", "!".yellow().bold(), input.display());
            }
            for name in &names {
                println!("{}", name);
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Reading deck...");
            let summary = DeckSummary::open(&input)?;
            pb.finish_and_clear();

            println!("{}", "Deck Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            if let Some(size) = summary.slide_size {
                println!(
                    "{}: {:.2}in x {:.2}in",
                    "Slide size".bold(),
                    size.width.to_inches(),
                    size.height.to_inches()
                );
            }
            println!("{}: {}", "Slides".bold(), summary.slide_count());

            for (index, slide) in summary.slides.iter().enumerate() {
                println!("\n{} {} ({})", "Slide".cyan().bold(), index + 1, slide.part);
                for picture in &slide.pictures {
                    let f = &picture.frame;
                    println!(
                        "  {} at ({}, {}) size {} x {} EMU",
                        picture.target.as_deref().unwrap_or("<unresolved>"),
                        f.x,
                        f.y,
                        f.width,
                        f.height
                    );
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Reading archive...");

    let options = driver::form_defaults()
        .with_crop(CropMargins::new(
            args.crop_left,
            args.crop_right,
            args.crop_top,
            args.crop_bottom,
        ))
        .with_height(args.height)
        .with_alignment(args.horizontal.into(), args.vertical.into());

    let request = GenerateRequest {
        archive: Some(fs::read(&args.input)?),
        template: args.template.as_ref().map(fs::read).transpose()?,
        output_name: args.output.to_string_lossy().into_owned(),
        options,
    };

    pb.set_message("Building deck...");
    let result = driver::generate(request);
    pb.finish_and_clear();
    let download = result?;

    fs::write(&args.output, &download.data)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&download.report)?);
        return Ok(());
    }

    for outcome in &download.report.outcomes {
        if let ImageOutcome::Skipped { image, reason } = outcome {
            let name = image.file_name().unwrap_or_default().to_string_lossy();
            println!("{} Skipped {}: {}", "!".yellow().bold(), name, reason);
        }
    }
    println!(
        "{} Added {} slides to {}",
        "✓".green().bold(),
        download.report.added(),
        args.output.display()
    );

    Ok(())
}

fn print_version() {
    println!("{} {}", "imgdeck".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Image archive to widescreen PowerPoint deck");
    println!();
    println!("Input images: JPG, JPEG, PNG, BMP, GIF");
    println!("Repository: https://github.com/iyulab/imgdeck");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_defaults_follow_form() {
        let cli = Cli::try_parse_from(["imgdeck", "build", "photos.zip"]).unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.output, PathBuf::from(driver::DEFAULT_OUTPUT_NAME));
        assert_eq!(
            (args.crop_left, args.crop_right, args.crop_top, args.crop_bottom),
            (250, 0, 0, 42)
        );
        assert!(matches!(args.horizontal, Horizontal::Left));
        assert!(matches!(args.vertical, Vertical::Top));
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["imgdeck", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
