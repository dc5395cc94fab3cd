mod echo;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ogmeta_core::{
    BatchRequest, DocumentResult, ExtractConfig, FetchConfig, JsonConfig, JsonLinesSink, TextConfig, convert_to_json,
    convert_to_text, extract_with_config, fetch_batch_into, fetch_file, fetch_stdin, fetch_url,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extracted metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, text", s)),
        }
    }
}

/// Extract Open Graph, Twitter, Facebook and link metadata from web pages
#[derive(Parser, Debug)]
#[command(name = "ogmeta")]
#[command(author = "ogmeta Contributors")]
#[command(version)]
#[command(about = "Extract Open Graph and social metadata from web pages", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<String>,

    /// Page URL used to resolve relative references in file or stdin input
    #[arg(short, long, default_value = "http://localhost/", value_name = "URL")]
    url: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (json, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "8", value_name = "SECS")]
    timeout: u64,

    /// Prefix for the User-Agent of HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Treat INPUT as a batch request and write one JSON line per result
    #[arg(long)]
    batch: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn fetch_config(&self) -> FetchConfig {
        FetchConfig { timeout: self.timeout, user_agent: self.user_agent.clone(), extract: ExtractConfig::default() }
    }
}

/// Logs go to stderr so they never mix with extracted output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn is_web_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        fetch_stdin().context("Failed to read from stdin")
    } else {
        fetch_file(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

async fn run_batch(args: &Args, input: &str) -> anyhow::Result<()> {
    if args.verbose {
        echo::print_step(1, 2, &format!("Reading batch from {}", input.bright_white()));
    }

    let request: BatchRequest =
        serde_json::from_str(&read_input(input)?).context("Failed to parse batch request")?;

    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(
            fs::File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let sink = JsonLinesSink::new(writer);

    if args.verbose {
        echo::print_step(2, 2, "Fetching pages");
    }

    let started = Instant::now();
    let summary = fetch_batch_into(request, &args.fetch_config(), &sink)
        .await
        .context("Failed to run batch")?;

    if args.verbose {
        echo::print_batch_summary(&summary);
        echo::print_timing("Batch", started.elapsed());
    }

    if let Some(path) = &args.output {
        echo::print_success(&format!("Results written to {}", path.display().bright_white()));
    }

    Ok(())
}

async fn extract_input(
    args: &Args, input: &str, timings: &mut Vec<(&'static str, Duration)>,
) -> anyhow::Result<DocumentResult> {
    if is_web_url(input) {
        if args.verbose {
            echo::print_step(1, 3, &format!("Fetching {}", input.bright_white().underline()));
        }

        let started = Instant::now();
        let outcome = fetch_url(input, serde_json::Value::Null, &args.fetch_config()).await;
        timings.push(("Fetch", started.elapsed()));

        if let Some(err) = outcome.err {
            anyhow::bail!("Failed to fetch URL: {}", err);
        }
        if let Some(redirect) = outcome.result.redirect {
            anyhow::bail!("{} redirects to {}", input, redirect);
        }
        return outcome.result.data.context("Fetch returned no data");
    }

    if args.verbose {
        let source = if input == "-" { "stdin".to_string() } else { format!("file {}", input.bright_white()) };
        echo::print_step(1, 3, &format!("Reading from {}", source));
    }

    let html = read_input(input)?;

    if args.verbose {
        echo::print_detail("Size", &echo::format_size(html.len()));
        echo::print_detail("Page URL", &args.url);
        echo::print_step(2, 3, "Extracting metadata");
    }

    let started = Instant::now();
    let result = extract_with_config(&args.url, &html, None, &ExtractConfig::default())
        .context("Failed to extract metadata")?;
    timings.push(("Extract", started.elapsed()));

    Ok(result)
}

async fn run(args: &Args) -> anyhow::Result<()> {
    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "ogmeta", &mut io::stdout());
        return Ok(());
    }

    let input = args.input.as_deref().context("No input given")?;
    tracing::debug!(input, batch = args.batch, "starting");

    if args.batch {
        return run_batch(args, input).await;
    }

    let total = Instant::now();
    let mut timings = Vec::new();
    let result = extract_input(args, input, &mut timings).await?;

    if args.verbose {
        echo::print_extraction_details(&result);
        echo::print_step(3, 3, "Writing output");
        echo::print_detail("Format", &format!("{:?}", args.format));
    }

    let started = Instant::now();
    let output = match args.format {
        OutputFormat::Json => convert_to_json(&result, &JsonConfig { pretty: !args.compact })
            .context("Failed to convert to JSON")?,
        OutputFormat::Text => convert_to_text(&result, &TextConfig::default()).context("Failed to convert to text")?,
    };
    timings.push(("Format", started.elapsed()));

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", output))
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    if args.verbose {
        echo::print_timing_summary(total.elapsed(), &timings);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    if let Err(e) = run(&args).await {
        echo::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
