use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pdf_pages::{
    Delivery, EngineContext, OrganizerStore, SplitDirection, SplitterStore, ToolOptions, assemble,
    export_images, ingest_organizer, ingest_splitter, split_spreads,
};
use pdf_pages_runtime::{AppLogger, engine_context};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pdfp", about = "PDF page organizer, spread splitter and image exporter", version)]
struct Cli {
    /// JSON options file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine, reorder and prune pages from one or more PDFs
    Organize {
        /// Input PDF file(s), pages appended in order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 1-based pages to delete, counted across all inputs
        #[arg(long, value_delimiter = ',')]
        delete: Vec<usize>,

        /// New page order after deletion (1-based); unlisted pages follow
        #[arg(long, value_delimiter = ',')]
        order: Vec<usize>,

        /// Reverse the final page order
        #[arg(long)]
        reverse: bool,
    },

    /// Split two-page spreads into single pages
    Split {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reading direction of the spreads
        #[arg(long, default_value = "ltr", value_enum)]
        direction: DirectionArg,

        /// 1-based pages to split (default: all)
        #[arg(long, value_delimiter = ',', conflicts_with = "none")]
        pages: Vec<usize>,

        /// Split no pages, copy the document as is
        #[arg(long)]
        none: bool,
    },

    /// Export every page as a JPEG into a zip archive
    ExportImages {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render scale
        #[arg(long)]
        scale: Option<f32>,

        /// JPEG quality (1-100)
        #[arg(long)]
        quality: Option<u8>,

        /// Pages rendered concurrently
        #[arg(long)]
        batch_size: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    /// Left half first
    Ltr,
    /// Right half first
    Rtl,
}

impl From<DirectionArg> for SplitDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Ltr => Self::LeftToRight,
            DirectionArg::Rtl => Self::RightToLeft,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    AppLogger::new(256)
        .with_level(level)
        .with_echo(true)
        .init()
        .context("Failed to install logger")?;

    let mut options = match &cli.config {
        Some(path) => ToolOptions::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ToolOptions::default(),
    };
    if let Commands::ExportImages {
        scale,
        quality,
        batch_size,
        ..
    } = &cli.command
    {
        options.export_scale = scale.unwrap_or(options.export_scale);
        options.export_quality = quality.unwrap_or(options.export_quality);
        options.export_batch_size = batch_size.unwrap_or(options.export_batch_size);
    }
    options.validate()?;

    let ctx = cli_context(engine_context(options));

    match cli.command {
        Commands::Organize {
            input,
            output,
            delete,
            order,
            reverse,
        } => {
            let mut store = OrganizerStore::new();
            let mut documents = Vec::with_capacity(input.len());
            for path in &input {
                documents.push(read_input(path).await?);
            }
            let loaded = ingest_organizer(&mut store, documents, &ctx).await?;
            println!("Loaded {} pages from {} files", loaded, input.len());

            for page in to_indices(&delete, store.collection.len())? {
                store.collection.toggle(page)?;
            }
            store.delete_selected();
            apply_order(&mut store, &order)?;
            if reverse {
                store.reverse_all(ctx.options.clear_selection_on_reverse);
            }

            match assemble(&store.collection, &ctx).await? {
                Some(delivery) => finish(delivery, output).await?,
                None => println!("No pages left, nothing written"),
            }
        }

        Commands::Split {
            input,
            output,
            direction,
            pages,
            none,
        } => {
            let mut store = SplitterStore::new();
            let count = ingest_splitter(&mut store, read_input(&input).await?, &ctx).await?;

            if none || !pages.is_empty() {
                store.flag_none();
            }
            for page in to_indices(&pages, count)? {
                store.toggle_split(page)?;
            }
            println!("Splitting {} of {} pages", store.flagged_count(), count);

            match split_spreads(&store, direction.into(), &ctx)
                .await
                .context("Split failed")?
            {
                Some(delivery) => finish(delivery, output).await?,
                None => println!("Document has no pages, nothing written"),
            }
        }

        Commands::ExportImages { input, output, .. } => {
            let bytes: Arc<[u8]> = read_input(&input).await?.into();
            let name = input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            match export_images(bytes, &name, &ctx).await? {
                Some(delivery) => finish(delivery, output).await?,
                None => println!("Document has no pages, nothing written"),
            }
        }
    }

    Ok(())
}

/// Progress on stderr and Ctrl-C cancellation
fn cli_context(ctx: EngineContext) -> EngineContext {
    let ctx = ctx.with_progress(|progress| {
        eprint!(
            "\r{}: {}/{} ({:.0}%)",
            progress.operation,
            progress.current,
            progress.total,
            progress.percent()
        );
        if progress.current == progress.total {
            eprintln!();
        }
        let _ = std::io::stderr().flush();
    });

    let token = ctx.cancellation().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
    ctx
}

async fn read_input(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// 1-based page numbers to unique zero-based indices
fn to_indices(pages: &[usize], len: usize) -> Result<Vec<usize>> {
    let mut indices = Vec::with_capacity(pages.len());
    for &page in pages {
        if page == 0 || page > len {
            bail!("Page {} out of range (1-{})", page, len);
        }
        if indices.contains(&(page - 1)) {
            bail!("Page {} listed twice", page);
        }
        indices.push(page - 1);
    }
    Ok(indices)
}

/// Move the listed pages to the front, in the listed order
fn apply_order(store: &mut OrganizerStore, order: &[usize]) -> Result<()> {
    let indices = to_indices(order, store.collection.len())?;
    // Current position of each page, by its position before reordering
    let mut positions: Vec<usize> = (0..store.collection.len()).collect();

    for (target, original) in indices.into_iter().enumerate() {
        let from = positions
            .iter()
            .position(|&p| p == original)
            .context("Page order is inconsistent")?;
        store.collection.move_page(from, target)?;
        let moved = positions.remove(from);
        positions.insert(target, moved);
    }
    Ok(())
}

/// Write a delivery to `output`, a file or directory, or the working directory
async fn finish(delivery: Delivery, output: Option<PathBuf>) -> Result<()> {
    let path = match output {
        Some(path) if path.is_dir() => path.join(&delivery.filename),
        Some(path) => path,
        None => PathBuf::from(&delivery.filename),
    };
    tokio::fs::write(&path, &delivery.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Wrote {} ({}, {} bytes)",
        path.display(),
        delivery.mime,
        delivery.bytes.len()
    );
    Ok(())
}
