mod echo;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use pagedown_core::{Converter, ConverterConfig, DEFAULT_MIRROR_HOST, DEFAULT_USER_AGENT, parse_target};
use tracing_subscriber::EnvFilter;

use crate::echo::{
    format_size, print_banner, print_detail, print_info, print_step, print_success, print_timing, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert any article, post, video or PDF URL into a readable Markdown document
#[derive(Parser, Debug)]
#[command(name = "pagedown")]
#[command(version, about = "Turn web pages, posts, videos and PDFs into Markdown", long_about = None)]
struct Args {
    /// Absolute http(s) URL to convert
    #[arg(value_name = "URL", required_unless_present = "completions")]
    url: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// User-Agent sent with every request
    #[arg(long, value_name = "UA", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Host Twitter/X links are fetched from
    #[arg(long, value_name = "HOST", default_value = DEFAULT_MIRROR_HOST)]
    mirror_host: String,

    /// Upper bound for reading page metadata, in seconds
    #[arg(long, default_value = "5", value_name = "SECS")]
    metadata_timeout: u64,

    /// Upper bound for downloading video captions, in seconds
    #[arg(long, default_value = "15", value_name = "SECS")]
    caption_timeout: u64,

    /// Preferred caption language for video transcripts
    #[arg(long, default_value = "en", value_name = "LANG")]
    caption_lang: String,

    /// Start article output with the page title as a heading
    #[arg(long)]
    title_heading: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    completions: Option<Shell>,
}

impl Args {
    fn converter_config(&self) -> ConverterConfig {
        ConverterConfig::builder()
            .user_agent(self.user_agent.as_str())
            .mirror_host(self.mirror_host.as_str())
            .request_timeout(self.timeout)
            .metadata_timeout(Duration::from_secs(self.metadata_timeout))
            .caption_timeout(Duration::from_secs(self.caption_timeout))
            .caption_language(self.caption_lang.as_str())
            .include_title_heading(self.title_heading)
            .build()
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pagedown_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "pagedown", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let input = args.url.as_deref().context("No URL given")?;
    let url = parse_target(input).with_context(|| format!("Invalid URL: {input}"))?;

    if args.verbose {
        print_step(1, 3, "Preparing converter");
        print_detail("User-Agent", &args.user_agent);
        print_detail("Mirror host", &args.mirror_host);
        print_detail("Timeout", &format!("{}s", args.timeout));
        eprintln!();
    }

    let converter = Converter::with_config(args.converter_config()).context("Failed to set up converter")?;

    if args.verbose {
        print_step(2, 3, &format!("Converting {}", url.as_str().bright_white().underline()));
    }

    let started = Instant::now();
    let markdown = converter
        .convert_url(&url)
        .await
        .with_context(|| format!("Failed to convert {url}"))?;

    if args.verbose {
        print_timing("Conversion", started.elapsed());
        print_detail("Size", &format_size(markdown.len()));
        eprintln!();
        print_step(3, 3, "Writing output");
    }

    if markdown.is_empty() {
        print_warning("No content could be extracted");
    }

    match args.output {
        Some(path) => {
            fs::write(&path, &markdown).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{markdown}"),
    }

    Ok(())
}
