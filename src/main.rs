extern crate lighting_savings;

use clap::{Args, Parser, Subcommand};
use lighting_savings::core::schedule::{duration_hours, parse_clock_time};
use lighting_savings::core::units::round_to_decimal_places;
use lighting_savings::core::validation::validate_named_input;
use lighting_savings::intake::IntakePolicy;
use lighting_savings::output::FileOutput;
use lighting_savings::{run_project, ProjectFlags, RunOutcome};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct LightingSavingsArgs {
    #[command(subcommand)]
    command: Command,
    #[clap(
        long,
        global = true,
        default_value_t = false,
        help = "Whether to log out spans"
    )]
    log_spans: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Calculate savings for a project input file and write out the results")]
    Run(RunArgs),
    #[command(about = "Check a single value against the bounds for an installation parameter")]
    Validate { field: String, value: String },
    #[command(about = "Convert a pair of HH:MM clock times into a duration in hours")]
    Duration { start: String, end: String },
}

#[derive(Args, Debug)]
struct RunArgs {
    input_file: String,
    #[arg(
        long,
        default_value_t = false,
        help = "Only write out parameters, summary and response, without period details or proposals"
    )]
    summary_only: bool,
}

fn main() -> anyhow::Result<()> {
    let args = LightingSavingsArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::TRACE);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)
        .expect("setting tracing subscriber failed");

    match args.command {
        Command::Run(run_args) => run(&run_args),
        Command::Validate { field, value } => {
            validate_named_input(&field, &value)?;
            println!("{value} is an acceptable value for {field}");
            Ok(())
        }
        Command::Duration { start, end } => {
            let hours = duration_hours(parse_clock_time(&start)?, parse_clock_time(&end)?);
            println!(
                "{}",
                round_to_decimal_places(hours, IntakePolicy::default().duration_decimal_places)
            );
            Ok(())
        }
    }
}

fn run(args: &RunArgs) -> anyhow::Result<()> {
    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };
    let input_file_stem = PathBuf::from(input_file_stem);

    let output_path = PathBuf::from(format!("{}__results", input_file_stem.display()));
    fs::create_dir_all(&output_path)?;
    let input_file_name = input_file_stem
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("project");
    let file_output = FileOutput::new(output_path, format!("{input_file_name}__{{}}.{{}}"));

    let project_flags = args.into();

    let outcome = run_project(
        BufReader::new(File::open(Path::new(input_file))?),
        &file_output,
        &project_flags,
    )?;

    match outcome {
        RunOutcome::Complete(response) => {
            debug!(
                "JSON response: {}",
                serde_json::to_string_pretty(&response)?
            );
            println!(
                "{}: annual savings of {} SGD ({} SGD per light)",
                response.project_name,
                response.savings.annual_savings_sgd,
                response.savings.per_light_annual_savings
            );
        }
        RunOutcome::Unavailable { missing } => {
            let missing = missing
                .iter()
                .map(|field| field.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("Savings are unavailable until these are provided: {missing}");
        }
    }

    Ok(())
}

impl From<&RunArgs> for ProjectFlags {
    fn from(args: &RunArgs) -> Self {
        let mut flags = ProjectFlags::all();
        if args.summary_only {
            flags.remove(ProjectFlags::PERIOD_DETAILS | ProjectFlags::PROPOSALS);
        }

        flags
    }
}
