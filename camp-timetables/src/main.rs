use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use camp_timetables::config::RunConfig;
use camp_timetables::display::{print_run_summary, write_timetables, OutputFormat};
use camp_timetables::parser::{load_roster, load_sheets};
use camp_timetables::schedule::{build_instructor_timetables, build_timetables};

#[derive(Parser)]
#[command(name = "camp-timetables")]
#[command(about = "Generate one personal timetable per camp participant from the master grid")]
struct Cli {
    /// Run configuration (JSON)
    config: PathBuf,

    /// Output directory, overriding the config
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// File format of the generated timetables
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Write one timetable per instructor column instead of per participant
    #[arg(long)]
    instructors: bool,

    /// Resolve and summarize without writing files
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = RunConfig::load(&cli.config)?;
    let options = config.options()?;

    println!("Loading {} day sheet(s)...", config.days.len());
    let sheets = load_sheets(&config)?;
    let roster = load_roster(&config, &options.matchers)?;

    // Everything is resolved before the first file is written.
    let (timetables, default_dir) = if cli.instructors {
        let tables = build_instructor_timetables(&sheets, &roster, &options)?;
        print_run_summary("Instructors", &tables);
        (tables, &config.instructor_output_dir)
    } else {
        let tables = build_timetables(&sheets, &roster, &options)?;
        print_run_summary("Individuals", &tables);
        (tables, &config.output_dir)
    };

    if cli.dry_run {
        info!("dry run; nothing written");
        return Ok(());
    }

    let output_dir = cli
        .output
        .unwrap_or_else(|| config.resolve(default_dir));
    let written = write_timetables(&timetables, &output_dir, cli.format)?;
    println!(
        "\nSuccessfully generated {} timetables in '{}'",
        written.len(),
        output_dir.display()
    );

    Ok(())
}
