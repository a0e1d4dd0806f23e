//! CLI binary for mobiledoc2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and pipes stdin or a file to stdout.

use clap::Parser;
use mobiledoc2md::{convert, convert_file, ConversionConfig, UnknownCardPolicy};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a Ghost article export (stdout)
  mobiledoc2md article.json

  # Pipe from stdin
  curl -s https://blog.example/api/article | mobiledoc2md

  # HTML figure blocks instead of ![caption](src)
  mobiledoc2md --use-figure article.json

  # Write to a file, skip cards this tool does not know
  mobiledoc2md --skip-unknown-cards article.json -o article.md

INPUT FORMAT:
  A JSON object {"title": "...", "mobiledoc": "..."} where the mobiledoc
  field holds a serialised Mobiledoc 0.3.x document. This is the shape of
  a single post in a Ghost JSON export.

CARDS:
  Built-in handlers: image, gallery, markdown, html. Any other card type
  aborts the conversion unless --skip-unknown-cards is given.
"#;

/// Convert Mobiledoc articles to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "mobiledoc2md",
    version,
    about = "Convert Mobiledoc articles to Markdown",
    long_about = "Convert a Mobiledoc article (a JSON envelope with a title and a serialised \
Mobiledoc 0.3.x document, as found in Ghost exports) to Markdown on stdout.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input JSON file; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long, env = "MOBILEDOC2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Render images with HTML figure tags instead of ![caption](src).
    #[arg(long, env = "MOBILEDOC2MD_USE_FIGURE")]
    use_figure: bool,

    /// Do not emit the title as an H1 heading.
    #[arg(long, env = "MOBILEDOC2MD_NO_TITLE")]
    no_title: bool,

    /// Skip cards with no registered handler instead of failing.
    #[arg(long, env = "MOBILEDOC2MD_SKIP_UNKNOWN_CARDS")]
    skip_unknown_cards: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MOBILEDOC2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MOBILEDOC2MD_QUIET")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("mobiledoc2md: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ConversionConfig::builder()
        .use_figure(cli.use_figure)
        .include_title(!cli.no_title)
        .unknown_cards(if cli.skip_unknown_cards {
            UnknownCardPolicy::Skip
        } else {
            UnknownCardPolicy::Error
        })
        .build();

    let stats = match &cli.output {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .map_err(|e| anyhow::anyhow!("cannot create output file '{}': {e}", path.display()))?;
            let stats = dispatch(cli, &mut file, &config)?;
            file.flush()?;
            stats
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let stats = dispatch(cli, &mut handle, &config)?;
            handle.flush()?;
            stats
        }
    };

    if cli.verbose && !cli.quiet {
        eprintln!(
            "converted {} sections ({} cards), {} bytes in {}ms",
            stats.sections, stats.cards, stats.bytes_written, stats.duration_ms
        );
    }
    Ok(())
}

/// Run the conversion against the chosen input source.
fn dispatch(
    cli: &Cli,
    writer: &mut impl Write,
    config: &ConversionConfig,
) -> anyhow::Result<mobiledoc2md::ConversionStats> {
    let stats = match &cli.input {
        Some(path) => convert_file(path, writer, config)?,
        None => convert(io::stdin().lock(), writer, config)?,
    };
    Ok(stats)
}
