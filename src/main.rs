//! chefwiki CLI - render Chef node searches

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use chefwiki::sink::DEFAULT_REFRESH;
use chefwiki::{
    compile, render_page, ApiConfig, ChefCall, ChefClient, ChefError, ChefPlugin, FixSuggestion,
    MockSearch, NodeSearch, PageMeta, RenderMode, XhtmlSink,
};

#[derive(Parser)]
#[command(name = "chefwiki")]
#[command(about = "Render Chef Server node searches into wiki pages")]
#[command(version)]
struct Cli {
    /// Config file (default: ./chefwiki.yaml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the Chef Server URL
    #[arg(long, global = true)]
    server: Option<String>,

    /// Override the API client name
    #[arg(long, global = true)]
    client: Option<String>,

    /// Answer searches from a saved JSON response instead of the server
    #[arg(long, global = true, value_name = "FILE")]
    rows: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search and print it as XHTML
    Search {
        /// Chef search query, e.g. "role:web"
        query: String,

        /// Row format, e.g. "%name% (%automatic.ipaddress%)"
        #[arg(short, long)]
        format: Option<String>,

        /// Cache refresh hint in seconds
        #[arg(short, long)]
        refresh: Option<u64>,
    },

    /// Render every {{chef>...}} tag in a wiki page
    Page {
        /// Page source file
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show how a row format compiles
    Compile {
        /// Row format string
        format: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries rendered output only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Search {
            query,
            format,
            refresh,
        } => {
            let call = ChefCall {
                query: query.clone(),
                format: format.clone(),
                refresh: *refresh,
            };
            run_search(&cli, call).await
        }
        Commands::Page { file, output } => run_page(&cli, file, output.as_deref()).await,
        Commands::Compile { format } => {
            show_format(format);
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(suggestion) = e.fix_suggestion() {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            std::process::exit(1);
        }
    }
}

/// Build the one search client this process uses
fn build_client(cli: &Cli) -> Result<Arc<dyn NodeSearch>, ChefError> {
    if let Some(rows) = &cli.rows {
        let json = std::fs::read_to_string(rows)?;
        return Ok(Arc::new(MockSearch::from_json(&json)?));
    }

    let mut config = ApiConfig::load(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        config.server = server.clone();
    }
    if let Some(client) = &cli.client {
        config.client = client.clone();
    }

    let client = ChefClient::new(&config)?;
    tracing::debug!(server = %client.server(), client = %config.client, "chef client ready");
    Ok(Arc::new(client))
}

async fn run_search(cli: &Cli, call: ChefCall) -> Result<bool, ChefError> {
    let plugin = ChefPlugin::new(build_client(cli)?);
    let mut meta = PageMeta::new();
    let mut sink = XhtmlSink::new();

    plugin
        .render(RenderMode::Metadata, &call, &mut sink, &mut meta)
        .await;
    let outcome = plugin
        .render(RenderMode::Xhtml, &call, &mut sink, &mut meta)
        .await;

    print!("{}", sink.as_str());
    eprintln!(
        "{} refresh: {}s",
        "→".cyan(),
        meta.refresh().unwrap_or(DEFAULT_REFRESH)
    );

    Ok(outcome.is_success())
}

async fn run_page(
    cli: &Cli,
    file: &std::path::Path,
    output: Option<&std::path::Path>,
) -> Result<bool, ChefError> {
    let text = tokio::fs::read_to_string(file).await?;
    let plugin = ChefPlugin::new(build_client(cli)?);

    let page = render_page(&plugin, &text).await;

    match output {
        Some(path) => tokio::fs::write(path, &page.body).await?,
        None => print!("{}", page.body),
    }

    let failed = page.failed_tags();
    eprintln!(
        "{} {} tags, {} failed",
        if failed == 0 { "✓".green() } else { "✗".red() },
        page.outcomes.len(),
        failed
    );
    if let Some(refresh) = page.meta.refresh() {
        eprintln!("  refresh: {}s", refresh);
    }

    Ok(failed == 0)
}

fn show_format(format: &str) {
    let template = compile(format);
    println!(
        "{} {} segments, {} placeholders",
        "✓".green(),
        template.len(),
        template.placeholder_count()
    );
    for segment in template.segments() {
        println!("  {}", segment);
    }
}
