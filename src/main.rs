//! Catalog-Sweep main entry point
//!
//! This is the command-line interface for the Catalog-Sweep crawler.

use anyhow::Context;
use catalog_sweep::config::{makers_url, read_config_with_hash, validate, Config};
use catalog_sweep::crawler::run_crawl;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Sweep: crawl a product catalog into one delimited table
///
/// Catalog-Sweep walks the maker list, every maker's (paginated) product
/// listing and every product page, and merges the attribute tables it finds
/// into a single file whose columns are discovered while crawling.
#[derive(Parser, Debug)]
#[command(name = "catalog-sweep")]
#[command(version = "1.0.0")]
#[command(about = "Crawl a product catalog into one delimited table", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file; built-in defaults otherwise
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Brand filter: plain text (case-insensitive) or /pattern/flags
    #[arg(short, long)]
    brand: Option<String>,

    /// Model filter: plain text (case-insensitive) or /pattern/flags
    #[arg(short = 'd', long)]
    model: Option<String>,

    /// Field separator, a single character
    #[arg(short, long)]
    separator: Option<String>,

    /// Maximum number of requests in flight
    #[arg(short, long = "max-connection")]
    max_connection: Option<u32>,

    /// Per-request timeout in milliseconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Total attempts per page
    #[arg(short, long)]
    retry: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(short = 'R', long)]
    retry_delay: Option<u64>,

    /// User-Agent header value
    #[arg(short = 'a', long)]
    user_agent: Option<String>,

    /// Stop the whole crawl on the first failed page
    #[arg(long)]
    fail_fast: bool,

    /// Also write the maker and product URL lists
    #[arg(long)]
    dump_lists: bool,

    /// Directory for the export and list files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Catalog site root
    #[arg(long)]
    base_url: Option<String>,

    /// First maker position to crawl (0-based, inclusive)
    #[arg(long)]
    min_maker: Option<usize>,

    /// Last maker position to crawl (0-based, inclusive)
    #[arg(long)]
    max_maker: Option<usize>,

    /// Keep rows whose every field is blank
    #[arg(long)]
    keep_empty_rows: bool,

    /// Validate the configuration and show what would be crawled
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line values on top of the file (or default) config
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(brand) = &self.brand {
            config.filter.brand = brand.clone();
        }
        if let Some(model) = &self.model {
            config.filter.model = model.clone();
        }
        if let Some(separator) = &self.separator {
            config.output.separator = separator.clone();
        }
        if let Some(max_connection) = self.max_connection {
            config.crawler.max_connections = max_connection;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.timeout_ms = timeout;
        }
        if let Some(retry) = self.retry {
            config.crawler.max_attempts = retry;
        }
        if let Some(retry_delay) = self.retry_delay {
            config.crawler.retry_delay_ms = retry_delay;
        }
        if let Some(user_agent) = &self.user_agent {
            config.crawler.user_agent = user_agent.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.site.base_url = base_url.clone();
        }
        if self.min_maker.is_some() {
            config.crawler.min_maker = self.min_maker;
        }
        if self.max_maker.is_some() {
            config.crawler.max_maker = self.max_maker;
        }
        if self.fail_fast {
            config.crawler.fail_fast = true;
        }
        if self.dump_lists {
            config.output.dump_lists = true;
        }
        if self.keep_empty_rows {
            config.output.skip_empty_rows = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config, cli.quiet).await?;
    }

    Ok(())
}

/// Builds the effective configuration: file (or defaults), then flags
///
/// Validation runs once, after the flags are applied, so a flag can correct
/// a file value.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_sweep=info,warn"),
            1 => EnvFilter::new("catalog_sweep=debug,info"),
            2 => EnvFilter::new("catalog_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Catalog-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max connections: {}", config.crawler.max_connections);
    println!("  Timeout: {}ms", config.crawler.timeout_ms);
    println!("  Attempts per page: {}", config.crawler.max_attempts);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  Fail fast: {}", config.crawler.fail_fast);
    println!("  User agent: {}", config.crawler.user_agent);

    let window = match (config.crawler.min_maker, config.crawler.max_maker) {
        (None, None) => "all".to_string(),
        (min, max) => format!(
            "{}..={}",
            min.unwrap_or(0),
            max.map_or_else(|| "end".to_string(), |m| m.to_string())
        ),
    };
    println!("  Makers: {}", window);

    println!("\nFilters:");
    println!("  Brand: {}", display_filter(&config.filter.brand));
    println!("  Model: {}", display_filter(&config.filter.model));

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory.display());
    println!("  Prefix: {}", config.output.prefix);
    println!("  Separator: {:?}", config.output.separator);
    println!("  Title column: {}", config.output.title_column);
    println!("  URL lists: {}", config.output.dump_lists);
    println!("  Skip empty rows: {}", config.output.skip_empty_rows);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", makers_url(&config.site)?);

    Ok(())
}

fn display_filter(raw: &str) -> &str {
    if raw.is_empty() {
        "(any)"
    } else {
        raw
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} with {} connection(s)",
        config.site.base_url,
        config.crawler.max_connections
    );

    let summary = match run_crawl(config).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !quiet {
        println!("{}\n", summary.stats);
        println!(
            "{} records saved to {}",
            summary.rows,
            summary.export_path.display()
        );
        for path in [&summary.maker_list_path, &summary.product_list_path]
            .into_iter()
            .flatten()
        {
            println!("URL list saved to {}", path.display());
        }
    }

    Ok(())
}
