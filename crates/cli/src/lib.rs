use clap::{Args, Parser, Subcommand};
use exit::{CliResult, ExitContext, ExitKind, Failure};
use realitycheck_indexer::build_index;
use realitycheck_intent::{parse_plan, parse_spec};
use realitycheck_oracle::Profile;
use realitycheck_protocol::serialize_json_pretty;
use std::path::PathBuf;
use std::process::ExitCode;

mod check;
mod exit;
mod output;
mod render;

pub use check::CheckArgs;
pub use render::{render_json, render_markdown, OutputFormat};

use output::print_stdout;

#[derive(Parser)]
#[command(name = "realitycheck")]
#[command(about = "Intent enforcement for agentic coding systems", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for the report)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a codebase against its spec and plan
    Check(CheckArgs),

    /// Print the items a spec or plan document segments into
    Segment(SegmentArgs),

    /// Print the bounded code inventory sent to the oracle
    Inventory(InventoryArgs),

    /// List builtin profiles
    Profiles(ProfilesArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SegmentArgs {
    /// Segment a spec document (SPEC-NNN ids)
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Segment a plan document (PLAN-NNN ids, Step headers)
    #[arg(long)]
    plan: Option<PathBuf>,
}

#[derive(Args)]
struct InventoryArgs {
    /// Code root (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Extra directory names to skip (repeatable)
    #[arg(long = "ignore", value_name = "NAME")]
    ignore: Vec<String>,

    /// Print the full index as JSON instead of the bounded summary
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ProfilesArgs {
    /// Print profiles as JSON
    #[arg(long)]
    json: bool,
}

pub async fn main_entry() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(ExitKind::BadInput.code())
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let result = match cli.command {
        Commands::Check(args) => check::run_check(args).await,
        Commands::Segment(args) => run_segment(args),
        Commands::Inventory(args) => run_inventory(args),
        Commands::Profiles(args) => run_profiles(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => failure.report(),
    }
}

fn run_segment(args: SegmentArgs) -> CliResult<()> {
    let items = match (args.spec, args.plan) {
        (Some(spec), _) => parse_spec(&spec),
        (None, Some(plan)) => parse_plan(&plan),
        (None, None) => return Err(Failure::input("one of --spec or --plan is required")),
    }
    .exit_with(ExitKind::BadInput)?;
    let json = serialize_json_pretty(&items).exit_with(ExitKind::General)?;
    print_stdout(&format!("{json}\n")).exit_with(ExitKind::General)
}

fn run_inventory(args: InventoryArgs) -> CliResult<()> {
    let index = build_index(&args.path, &args.ignore).exit_with(ExitKind::BadInput)?;
    let text = if args.json {
        format!(
            "{}\n",
            serialize_json_pretty(&index).exit_with(ExitKind::General)?
        )
    } else {
        index.summary()
    };
    print_stdout(&text).exit_with(ExitKind::General)
}

fn run_profiles(args: ProfilesArgs) -> CliResult<()> {
    let profiles = Profile::builtins();
    let text = if args.json {
        format!(
            "{}\n",
            serialize_json_pretty(&profiles).exit_with(ExitKind::General)?
        )
    } else {
        let width = profiles.iter().map(|p| p.name.len()).max().unwrap_or(0);
        profiles
            .iter()
            .map(|p| {
                let escalates = if p.strict_drift_severity {
                    " [escalates drift]"
                } else {
                    ""
                };
                format!("{:width$}  {}{escalates}\n", p.name, p.description)
            })
            .collect()
    };
    print_stdout(&text).exit_with(ExitKind::General)
}
