use clap::Parser;
use log::{error, info};
use std::process;
use viewtag_core::cli::{Cli, Command, LabelArgs, OutputFormat, SourceArgs, SummaryArgs, TaxonomyArgs};
use viewtag_core::{AnnotationStore, Result, Summary, SummaryReport, TextReport};

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let result = match cli.command {
        Command::Label(args) => label(args),
        Command::Scan(args) => scan(args),
        Command::Status(args) => status(args),
        Command::Summary(args) => summary(args),
        Command::Categories(args) => categories(args),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

#[cfg(feature = "gui")]
fn label(args: LabelArgs) -> Result<()> {
    let config = args.to_config()?;
    info!("Labeling {} in {}", config.kind, config.media_dir.display());

    let session = viewtag_core::open_session(&config)?;
    viewtag_core::gui::run(config, session)
}

#[cfg(not(feature = "gui"))]
fn label(args: LabelArgs) -> Result<()> {
    args.to_config()?;
    eprintln!("Error: the labeling window requires the 'gui' feature");
    eprintln!("Rebuild with: cargo build --features gui,video");
    process::exit(1);
}

fn scan(args: SourceArgs) -> Result<()> {
    let config = args.to_config();
    info!("Scanning {}", config.media_dir.display());
    let (_, store, report) = viewtag_core::scan(&config)?;

    println!(
        "Found {} {} files in {}",
        report.discovered,
        config.kind,
        config.media_dir.display()
    );
    println!(
        "{} records in {} ({} classified)",
        report.records,
        store.path().display(),
        report.classified
    );
    Ok(())
}

fn status(args: SourceArgs) -> Result<()> {
    let config = args.to_config();
    let store = AnnotationStore::open(&config.store_path)?;
    print!("{}", TextReport::new(config.kind, &store));
    Ok(())
}

fn summary(args: SummaryArgs) -> Result<()> {
    let config = args.source.to_config();
    let mut store = AnnotationStore::open(&config.store_path)?;
    let summary = if args.write {
        store.write_summary()?
    } else {
        store.summarize()
    };

    output_summary(&summary, args.format);
    Ok(())
}

fn output_summary(summary: &Summary, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", SummaryReport(summary)),
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match serde_json::to_string_pretty(summary) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

fn categories(args: TaxonomyArgs) -> Result<()> {
    let taxonomy = args.load()?;
    print!("{}", taxonomy);
    println!("{} categories", taxonomy.len());
    Ok(())
}
