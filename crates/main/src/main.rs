use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fgnsb_form::format::{amount_in_words, format_naira};
use fgnsb_form::{ApplicationData, FormGenerator};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

/// Renders FGN Savings Bond subscription forms from JSON application records.
///
/// Fonts must be present under `assets/fonts` next to the binary or the library crate, or be
/// provided via the `FGNSB_FONTS_DIR` environment variable. Set `RUST_LOG=debug` to follow the
/// assembly stages.
#[derive(Parser)]
#[command(author, version, about = "Subscription form generator for FGN Savings Bonds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an application record to a PDF file.
    Render {
        /// JSON application record.
        #[arg(short, long)]
        input: PathBuf,
        /// Destination of the PDF.
        #[arg(short, long, default_value = "subscription_form.pdf")]
        output: PathBuf,
        /// PNG or JPEG used as the header logo.
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Add an outline entry per section.
        #[cfg(feature = "bookmarks")]
        #[arg(long)]
        bookmarks: bool,
    },

    /// Print an amount in words the way the form spells it.
    Words {
        /// Amount in Naira, e.g. `50000000.25`.
        amount: Decimal,
    },

    /// List the sections an application record would produce, without rendering.
    Inspect {
        /// JSON application record.
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        #[cfg(feature = "bookmarks")]
        Commands::Render {
            input,
            output,
            logo,
            bookmarks,
        } => render(&input, &output, logo.as_deref(), |generator| {
            generator.with_bookmarks(bookmarks)
        }),
        #[cfg(not(feature = "bookmarks"))]
        Commands::Render {
            input,
            output,
            logo,
        } => render(&input, &output, logo.as_deref(), |generator| generator),
        Commands::Words { amount } => words(amount),
        Commands::Inspect { input } => inspect(&input),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn read_application(path: &Path) -> Result<ApplicationData, Box<dyn Error>> {
    let json = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    let data = serde_json::from_str(&json)
        .map_err(|err| format!("failed to parse {}: {}", path.display(), err))?;
    Ok(data)
}

fn render(
    input: &Path,
    output: &Path,
    logo: Option<&Path>,
    configure: impl FnOnce(FormGenerator) -> FormGenerator,
) -> Result<(), Box<dyn Error>> {
    let data = read_application(input)?;

    let mut generator = FormGenerator::new();
    if let Some(logo) = logo {
        let bytes = fs::read(logo)
            .map_err(|err| format!("failed to read logo {}: {}", logo.display(), err))?;
        generator = generator.with_logo_bytes(bytes);
    }
    let generator = configure(generator);

    let form = generator.generate_form(&data)?;
    fs::write(output, &form.bytes)?;

    println!(
        "Wrote {} ({} pages, {} bytes)",
        output.display(),
        form.page_count,
        form.bytes.len()
    );
    for section in &form.sections {
        println!("  page {:>2}  {}", section.first_page, section.title);
    }
    Ok(())
}

fn words(amount: Decimal) -> Result<(), Box<dyn Error>> {
    let display = format_naira(amount).ok_or("amount is negative or out of range")?;
    let words = amount_in_words(amount).ok_or("amount is negative or out of range")?;
    println!("{display}");
    println!("{words}");
    Ok(())
}

fn inspect(input: &Path) -> Result<(), Box<dyn Error>> {
    let data = read_application(input)?;
    let composition = FormGenerator::new().compose(&data)?;

    println!("{} applicant", composition.applicant_type());
    for section in composition.sections() {
        println!(
            "  {:<20} {} ({} primitives)",
            format!("{:?}", section.kind()),
            section.title(),
            section.all_primitives().len()
        );
    }
    match composition.ensure_renderable() {
        Ok(()) => println!("All fixed-width values can be rendered."),
        Err(err) => println!("Not renderable: {err}"),
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
