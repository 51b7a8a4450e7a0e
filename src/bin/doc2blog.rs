//! CLI binary for doc2blog.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig` / `HttpClientConfig` and prints results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use doc2blog::{
    prepare, publish, read_document, HttpBlogClient, HttpClientConfig, PipelineConfig,
    ProgressCallback, PublishProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner whose message follows the pipeline stages.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Parsing");
        bar.set_message("reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl PublishProgressCallback for CliProgressCallback {
    fn on_parsed(&self, block_count: usize, keyword_count: usize) {
        self.bar.println(format!(
            "  {} Parsed  {}",
            green("✓"),
            dim(&format!("{block_count} blocks, {keyword_count} keywords"))
        ));
        self.bar.set_prefix("Rendering");
    }

    fn on_rendered(&self, html_len: usize) {
        self.bar.println(format!(
            "  {} Rendered  {}",
            green("✓"),
            dim(&format!("{html_len} bytes HTML"))
        ));
    }

    fn on_upload_start(&self, filename: &str) {
        self.bar.set_prefix("Uploading");
        self.bar.set_message(filename.to_string());
    }

    fn on_image_uploaded(&self, url: &str) {
        self.bar
            .println(format!("  {} Image   {}", green("✓"), dim(url)));
    }

    fn on_publish_start(&self, title: &str) {
        self.bar.set_prefix("Publishing");
        self.bar.set_message(title.to_string());
    }

    fn on_published(&self, url: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} Published  {}", green("✔"), bold(url));
    }

    fn on_failed(&self, stage: &str, error: &str) {
        self.bar.finish_and_clear();
        // Keep the line readable; the full error follows from anyhow.
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        eprintln!("{} {} failed: {}", red("✘"), stage, red(&msg));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Preview the generated HTML without publishing
  doc2blog --dry-run post.txt

  # Publish with a cover image
  doc2blog post.txt --image cover.jpg

  # Read from stdin, publish as a draft
  pbpaste | doc2blog - --draft

  # Machine-readable preview (parsed blocks, keywords, HTML)
  doc2blog --dry-run --json post.txt > preview.json

INPUT FORMAT:
  First line            Title (unless it looks like body text)
  # / ## / ###          Headings (levels clamp to 1..6)
  - item / 1. item      Lists; a different marker starts a new list
  > quoted              Blockquote
  [[image: hint]]       Image placeholder; hint becomes alt text
  **bold** *italic*     Inline emphasis
  blank line            Paragraph break

ENVIRONMENT VARIABLES:
  DOC2BLOG_API_URL        Blog API root (required unless --dry-run)
  DOC2BLOG_API_TOKEN      Bearer token for the blog API
  DOC2BLOG_TIMEOUT_SECS   Per-request timeout (default 30)
  RUST_LOG                Overrides -v / -q log filtering
"#;

/// Publish a pasted document as a formatted blog article.
#[derive(Parser, Debug)]
#[command(
    name = "doc2blog",
    version,
    about = "Turn a pasted document into SEO-aware blog HTML and publish it",
    long_about = "Parse a loosely formatted text document (title, headings, lists, quotes, \
emphasis, image placeholders), render it to semantic HTML with keyword tags and an excerpt, \
optionally upload a cover image, and create the article on a blog platform.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document file, or `-` for stdin.
    input: String,

    /// Image to upload and place at `[[image]]` placeholders.
    #[arg(long, env = "DOC2BLOG_IMAGE")]
    image: Option<PathBuf>,

    /// Title used when the document has none.
    #[arg(long, env = "DOC2BLOG_DEFAULT_TITLE", default_value = "Untitled")]
    title: String,

    /// Parse and render only; print the result instead of publishing.
    #[arg(long)]
    dry_run: bool,

    /// Print structured JSON instead of human-readable output.
    #[arg(long, env = "DOC2BLOG_JSON")]
    json: bool,

    /// Blog API root URL.
    #[arg(long, env = "DOC2BLOG_API_URL")]
    api_url: Option<String>,

    /// Bearer token for the blog API.
    #[arg(long, env = "DOC2BLOG_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "DOC2BLOG_TIMEOUT_SECS", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..=600))]
    timeout: u64,

    /// Maximum number of keyword tags (0 disables tags).
    #[arg(long, env = "DOC2BLOG_MAX_KEYWORDS", default_value_t = 10)]
    max_keywords: usize,

    /// Excerpt length in characters.
    #[arg(long, env = "DOC2BLOG_EXCERPT_CHARS", default_value_t = 160)]
    excerpt_chars: usize,

    /// Create the article unpublished.
    #[arg(long, env = "DOC2BLOG_DRAFT")]
    draft: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2BLOG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2BLOG_QUIET")]
    quiet: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DOC2BLOG_NO_PROGRESS")]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers what INFO logs would say, so they are muted while
    // it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Read inputs ──────────────────────────────────────────────────────
    let raw = read_input(&cli.input)?;
    let image = match cli.image {
        Some(ref path) => Some(
            std::fs::read(path).with_context(|| format!("Failed to read image {:?}", path))?,
        ),
        None => None,
    };

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let config = build_config(&cli, None)?;
        let prepared = prepare(&raw, &cli.title, &config).context("Preview failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&prepared).context("Failed to serialise preview")?
            );
        } else {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", prepared.rendered.html).context("Failed to write to stdout")?;
            if !cli.quiet {
                eprintln!("{}    {}", bold("Title:"), prepared.title);
                eprintln!("{}  {}", bold("Excerpt:"), prepared.rendered.excerpt);
                eprintln!("{}     {}", bold("Tags:"), prepared.document.keywords().join(", "));
            }
        }
        return Ok(());
    }

    // ── Publish ──────────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn PublishProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let client = HttpBlogClient::new(build_client_config(&cli)?)
        .context("Failed to create blog API client")?;

    let output = publish(&raw, image.as_deref(), &cli.title, &client, &client, &config)
        .await
        .context("Publish failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else {
        println!("{}", output.url);
        if !cli.quiet && !show_progress {
            eprintln!(
                "Published '{}' in {}ms ({} tags{})",
                output.title,
                output.stats.prepare_duration_ms
                    + output.stats.upload_duration_ms
                    + output.stats.publish_duration_ms,
                output.tags.len(),
                if output.image_url.is_some() { ", with image" } else { "" }
            );
        }
    }

    Ok(())
}

/// Read the document from a path, or from stdin for `-`.
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read document from stdin")?;
        return Ok(buf);
    }
    read_document(input).with_context(|| format!("Failed to read document {input:?}"))
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .max_keywords(cli.max_keywords)
        .excerpt_max_chars(cli.excerpt_chars);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Map CLI args to `HttpClientConfig`.
fn build_client_config(cli: &Cli) -> Result<HttpClientConfig> {
    let Some(ref url) = cli.api_url else {
        bail!(
            "No blog API configured.\n\
             Pass --api-url or set DOC2BLOG_API_URL (or use --dry-run to preview)."
        );
    };

    let mut config = HttpClientConfig::new(url.as_str())
        .timeout_secs(cli.timeout)
        .published(!cli.draft);
    if let Some(ref token) = cli.api_token {
        config = config.token(token.as_str());
    }
    Ok(config)
}
