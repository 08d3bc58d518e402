use anyhow::Context;
use clap::{Parser, Subcommand};
use notebook_variables::{HeadlessTree, NotebookVariablesViewPane};
use shared::ViewConfig;
use std::path::PathBuf;
use variables_backend::{DEFAULT_PAGE_SIZE, SnapshotVariableProvider, load_dump, sample_dump};

#[derive(Parser)]
#[command(name = "notebook-variables")]
#[command(about = "Render a notebook kernel's variables as a tree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the variables panel for a JSON snapshot (or the built-in sample)
    Show {
        #[arg(long, short)]
        snapshot: Option<PathBuf>,

        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Expand a node given as slash-separated names, e.g. `dictA` (parents first)
        #[arg(long, short)]
        expand: Vec<String>,

        #[arg(long)]
        expand_all: bool,

        #[arg(long, default_value = "400")]
        width: f64,

        #[arg(long, default_value = "600")]
        height: f64,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Print the built-in sample snapshot as JSON
    DumpSample,
}

struct ShowOptions {
    snapshot: Option<PathBuf>,
    config: Option<PathBuf>,
    expand: Vec<String>,
    expand_all: bool,
    width: f64,
    height: f64,
    page_size: usize,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ViewConfig> {
    let mut config = match path {
        Some(path) => ViewConfig::load(path)?,
        None => ViewConfig::default(),
    };
    for warning in config.validate_and_fix() {
        log::warn!("config: {}", warning);
    }
    Ok(config)
}

async fn show(options: ShowOptions) -> anyhow::Result<()> {
    let config = load_config(options.config.as_ref())?;
    let dump = match &options.snapshot {
        Some(path) => load_dump(path)?,
        None => {
            log::info!("no snapshot given, showing the sample variables");
            sample_dump()
        }
    };
    let provider = SnapshotVariableProvider::with_page_size(dump, options.page_size);

    let mut pane = NotebookVariablesViewPane::new(config);
    pane.render_body(HeadlessTree::new);
    pane.layout_body(options.width, options.height);
    pane.refresh(&provider)
        .await
        .context("failed to collect notebook variables")?;

    let tree = pane
        .tree_mut()
        .context("variables tree was not created")?;
    if options.expand_all {
        tree.expand_all().await?;
    }
    for path in &options.expand {
        let path: Vec<String> = path.split('/').map(str::to_string).collect();
        if !tree.expand(&path).await? {
            log::warn!("nothing to expand at '{}'", path.join("/"));
        }
    }

    for line in tree.lines() {
        println!("{}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            snapshot,
            config,
            expand,
            expand_all,
            width,
            height,
            page_size,
        } => {
            show(ShowOptions {
                snapshot,
                config,
                expand,
                expand_all,
                width,
                height,
                page_size,
            })
            .await
        }
        Commands::DumpSample => {
            println!("{}", serde_json::to_string_pretty(&sample_dump())?);
            Ok(())
        }
    }
}
