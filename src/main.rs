use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mdnotion::{Config, Document, NotionClient, PageSpec, PublishedPage, Publisher};

#[derive(Parser)]
#[command(name = "mdnotion")]
#[command(about = "Convert Markdown files to Notion pages")]
#[command(version)]
struct Cli {
    /// Config file (defaults are used when it does not exist)
    #[arg(short, long, global = true, default_value = "mdnotion.toml")]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a page from a Markdown file
    Publish {
        #[command(flatten)]
        page: PageArgs,

        /// Archive this page before creating the new one
        #[arg(long, value_name = "PAGE_ID")]
        replace: Option<String>,
    },
    /// Append the remaining chunks of a partially published file
    Resume {
        /// Input Markdown file
        input: PathBuf,

        /// Page created by the failed run
        #[arg(long)]
        page_id: String,

        /// Chunk index reported by the failed run
        #[arg(long)]
        from_chunk: usize,
    },
    /// Print the blocks that would be sent, as JSON, one array per call
    Blocks {
        /// Input Markdown file
        input: PathBuf,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args)]
struct PageArgs {
    /// Input Markdown file
    input: PathBuf,

    /// Page title (defaults to frontmatter title, first heading, then file name)
    #[arg(short, long)]
    title: Option<String>,

    /// Page icon emoji
    #[arg(short, long)]
    icon: Option<String>,

    /// Parent page id (overrides the config file)
    #[arg(short, long)]
    parent: Option<String>,
}

fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_document(path: &Path, config: &Config) -> Result<Document> {
    let markdown = fs::read_to_string(path)
        .with_context(|| format!("Error reading {}", path.display()))?;
    let document = mdnotion::parse_document(&markdown, &config.parse);
    info!(
        input = %path.display(),
        blocks = document.blocks.len(),
        "parsed document"
    );
    Ok(document)
}

fn page_spec(args: &PageArgs, document: &Document, config: &Config) -> Result<PageSpec> {
    let parent_id = config.parent_page_id(args.parent.as_deref())?.to_string();
    let title = args
        .title
        .clone()
        .or_else(|| document.title())
        .unwrap_or_else(|| {
            args.input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Untitled".to_string())
        });
    let icon = args
        .icon
        .clone()
        .or_else(|| document.meta.icon.clone())
        .or_else(|| config.publish.default_icon.clone());

    Ok(PageSpec {
        parent_id,
        title,
        icon,
    })
}

fn publisher(config: &Config) -> Result<Publisher<NotionClient>> {
    let token = config.resolve_token()?;
    let client = NotionClient::from_config(token, &config.notion);
    Ok(Publisher::new(client).with_chunk_size(config.publish.effective_chunk_size()))
}

fn report(verb: &str, page: &PublishedPage) {
    println!("{verb} {} ({})", page.url, page.page_id);
    println!(
        "Sent {} blocks in {} calls",
        page.blocks_sent, page.chunks_sent
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Publish { page, replace } => {
            let document = read_document(&page.input, &config)?;
            let spec = page_spec(&page, &document, &config)?;
            let publisher = publisher(&config)?;

            let published = match replace {
                Some(old_page_id) => {
                    publisher
                        .replace(&old_page_id, &spec, &document.blocks)
                        .await?
                }
                None => publisher.publish(&spec, &document.blocks).await?,
            };
            report("Created", &published);
        }
        Commands::Resume {
            input,
            page_id,
            from_chunk,
        } => {
            let document = read_document(&input, &config)?;
            let published = publisher(&config)?
                .resume(&page_id, &document.blocks, from_chunk)
                .await?;
            report("Resumed", &published);
        }
        Commands::Blocks { input, pretty } => {
            let document = read_document(&input, &config)?;
            let json = mdnotion::chunks_to_json(
                &document.blocks,
                config.publish.effective_chunk_size(),
            )?;
            let out = if pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            println!("{out}");
        }
    }

    Ok(())
}
