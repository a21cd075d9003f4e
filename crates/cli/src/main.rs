mod display;
mod shell;

use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use face_catalog_core::analysis::domain::age_bucketer::AgeBucketer;
use face_catalog_core::analysis::domain::face_analyzer::FaceAnalyzer;
use face_catalog_core::analysis::infrastructure::http_face_analyzer::HttpFaceAnalyzer;
use face_catalog_core::annotation::domain::frame_annotator::FrameAnnotator;
use face_catalog_core::annotation::infrastructure::imageproc_painter::ImageprocPainter;
use face_catalog_core::capture::infrastructure::image_sequence_source::ImageSequenceSource;
use face_catalog_core::catalog::domain::face_record::{RecordField, SearchField};
use face_catalog_core::catalog::domain::image_store::ImageStore;
use face_catalog_core::catalog::domain::record_store::RecordStore;
use face_catalog_core::catalog::infrastructure::csv_record_file::CsvRecordFile;
use face_catalog_core::catalog::infrastructure::image_directory::ImageDirectory;
use face_catalog_core::pipeline::analyze_image_use_case::AnalyzeImageUseCase;
use face_catalog_core::pipeline::capture_logger::StdoutCaptureLogger;
use face_catalog_core::pipeline::capture_session::CaptureSession;
use face_catalog_core::pipeline::catalog_view::CatalogView;
use face_catalog_core::shared::config::CatalogConfig;

use crate::display::{format_attributes, format_sort, format_table};
use crate::shell::Shell;

/// Capture, analyze, and browse a catalog of face attributes.
#[derive(Parser)]
#[command(name = "face-catalog")]
struct Cli {
    /// Config file (JSON). Defaults to the per-user config, if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog CSV file.
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Directory holding the stored face images.
    #[arg(long, global = true)]
    image_dir: Option<PathBuf>,

    /// Base URL of the face analysis service.
    #[arg(long, global = true)]
    analyzer_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the catalog, optionally filtered and sorted.
    List {
        /// Search term (case-insensitive substring).
        #[arg(long)]
        search: Option<String>,

        /// Field to search: all, filename, gender, age_range, emotion, race.
        #[arg(long, default_value = "all")]
        field: SearchField,

        /// Column to sort by.
        #[arg(long)]
        sort: Option<RecordField>,

        /// Sort descending.
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Show the attributes of an image without storing it.
    Analyze { image: PathBuf },
    /// Analyze an image and add it to the catalog.
    Save { image: PathBuf },
    /// Remove a record and its stored image.
    Delete { filename: String },
    /// Run the live annotation loop over a frame source.
    Capture {
        /// Directory of frames played back as a camera feed.
        #[arg(long)]
        source: PathBuf,

        /// Store every Nth frame in the catalog.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        store_every: Option<u64>,

        /// Write annotated frames to this directory.
        #[arg(long)]
        preview_dir: Option<PathBuf>,
    },
    /// Interactive catalog browser.
    Shell,
    /// Show the effective configuration, or write it out.
    Config {
        /// Save to --config, or to the per-user config file.
        #[arg(long)]
        write: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::List {
            search,
            field,
            sort,
            desc,
        } => run_list(&config, search, field, sort, desc),
        Command::Analyze { image } => {
            let mut images = build_image_use_case(&config)?;
            println!("{}", format_attributes(&images.analyze(Some(&image))?));
            Ok(())
        }
        Command::Save { image } => {
            let mut store = open_store(&config)?;
            let mut images = build_image_use_case(&config)?;
            let record = images.save(Some(&image), &mut store)?;
            println!("Saved {}", record.filename);
            println!("{}", format_attributes(&record.attributes()));
            Ok(())
        }
        Command::Delete { filename } => {
            let mut view = CatalogView::new(open_store(&config)?);
            view.delete(&filename)?;
            println!("Deleted {filename}");
            Ok(())
        }
        Command::Capture {
            source,
            store_every,
            preview_dir,
        } => run_capture(&config, &source, store_every, preview_dir.as_deref()),
        Command::Shell => {
            let view = CatalogView::new(open_store(&config)?);
            let mut shell = Shell::new(view, build_image_use_case(&config)?);
            shell.run(io::stdin().lock(), &mut io::stdout())?;
            Ok(())
        }
        Command::Config { write: false } => {
            println!("{config:#?}");
            Ok(())
        }
        Command::Config { write: true } => {
            let path = match cli.config {
                Some(path) => path,
                None => CatalogConfig::default_path()
                    .ok_or("no per-user config directory on this platform")?,
            };
            config.save(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn run_list(
    config: &CatalogConfig,
    search: Option<String>,
    field: SearchField,
    sort: Option<RecordField>,
    desc: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut view = CatalogView::new(open_store(config)?);
    if let Some(term) = search {
        view.set_search(term, field);
    }
    if let Some(column) = sort {
        let mut active = view.sort(column);
        if desc {
            active = view.sort(column);
        }
        log::debug!("{}", format_sort(active));
    }
    println!("{}", format_table(&view.visible()));
    Ok(())
}

fn run_capture(
    config: &CatalogConfig,
    source: &Path,
    store_every: Option<u64>,
    preview_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config)?;
    let previews = preview_dir.map(ImageDirectory::open).transpose()?;

    let annotator = FrameAnnotator::new(
        Box::new(ImageprocPainter::from_config(config)),
        AgeBucketer::new(config.age_adjustment),
    );
    let mut session = CaptureSession::new(
        annotator,
        build_analyzer(config)?,
        Box::new(StdoutCaptureLogger::default()),
    );
    let frames = ImageSequenceSource::new(source)
        .with_interval(Duration::from_millis(config.frame_interval_ms));
    session.start(Box::new(frames))?;

    let mut seen: u64 = 0;
    let mut stored = 0usize;
    while let Some(live) = session.next_frame() {
        seen += 1;
        if let Some(previews) = &previews {
            let name = format!("frame_{:06}.jpg", live.frame.index());
            previews.write_frame(&name, &live.frame)?;
        }
        if store_every.is_some_and(|n| seen % n == 0) {
            let now = chrono::Local::now().naive_local();
            match session.capture_and_store(&mut store, now) {
                Ok(record) => {
                    stored += 1;
                    log::info!("Captured {} ({}, {})", record.filename, record.gender, record.age_range);
                }
                Err(e) => log::warn!("Capture not stored: {e}"),
            }
        }
    }

    log::info!("Processed {seen} frame(s), stored {stored}");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<CatalogConfig, Box<dyn std::error::Error>> {
    let mut config = CatalogConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.data_file {
        config.data_file = path.clone();
    }
    if let Some(path) = &cli.image_dir {
        config.image_dir = path.clone();
    }
    if let Some(url) = &cli.analyzer_url {
        config.analyzer_url = url.clone();
    }
    Ok(config)
}

fn open_store(config: &CatalogConfig) -> Result<RecordStore, Box<dyn std::error::Error>> {
    let store = RecordStore::open(
        Box::new(CsvRecordFile::new(config.data_file.clone())),
        Box::new(ImageDirectory::open(config.image_dir.clone())?),
    )?;
    Ok(store)
}

fn build_analyzer(config: &CatalogConfig) -> Result<Box<dyn FaceAnalyzer>, Box<dyn std::error::Error>> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let analyzer = HttpFaceAnalyzer::new(&config.analyzer_url, timeout)?;
    log::debug!("Analyzer endpoint: {}", analyzer.endpoint());
    Ok(Box::new(analyzer))
}

fn build_image_use_case(
    config: &CatalogConfig,
) -> Result<AnalyzeImageUseCase, Box<dyn std::error::Error>> {
    Ok(AnalyzeImageUseCase::new(
        build_analyzer(config)?,
        AgeBucketer::new(config.age_adjustment),
    ))
}
