use crate::exit::{CliResult, ExitContext, ExitKind, Failure};
use crate::output::{print_stdout, write_atomic};
use crate::render::{render, OutputFormat};
use anyhow::Context;
use clap::Args;
use realitycheck_indexer::build_index;
use realitycheck_intent::{parse_plan, parse_spec};
use realitycheck_oracle::{
    analyze, build_oracle, load_profile, AnalysisRequest, AnalyzeError, ProviderConfig,
    ProviderKind, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use realitycheck_protocol::{Report, RunInput, Severity, Verdict, TOOL_NAME};
use realitycheck_verdict::{evaluate, filter_by_severity, summarize_coverage};
use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const DEFAULT_PROFILE: &str = "general";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Code root (used when --code-root is not given; default: current directory)
    pub path: Option<PathBuf>,

    /// Path to SPEC.md (required)
    #[arg(long)]
    pub spec: Option<PathBuf>,

    /// Path to PLAN.md (required)
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Root of the code to analyze
    #[arg(long)]
    pub code_root: Option<PathBuf>,

    /// Output format: json or md
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Builtin profile name or path to a profile file (env: REALITYCHECK_PROFILE)
    #[arg(long)]
    pub profile: Option<String>,

    /// anthropic, openai, google or replay (env: REALITYCHECK_PROVIDER)
    #[arg(long)]
    pub provider: Option<String>,

    /// Model id; defaults per provider (env: REALITYCHECK_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Escalate drift severities and treat unclear coverage as not implemented
    #[arg(long)]
    pub strict: bool,

    /// Exit 2 when the verdict is at or above this level
    #[arg(long)]
    pub fail_on: Option<String>,

    /// Hide findings below this severity from the output (scoring is unaffected)
    #[arg(long)]
    pub severity_threshold: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f64,

    /// Deadline covering both oracle calls
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Extra directory names to skip while indexing (repeatable)
    #[arg(long = "ignore", value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Skip the API key pre-flight check
    #[arg(long)]
    pub offline: bool,

    /// Recorded oracle response for the replay provider (repeatable, served in order)
    #[arg(long = "replay-response", value_name = "FILE")]
    pub replay_responses: Vec<PathBuf>,

    /// Log the assembled prompts at debug level
    #[arg(long)]
    pub debug: bool,
}

/// Flags after validation and environment fallback.
#[derive(Debug)]
struct CheckPlan {
    spec: PathBuf,
    plan: PathBuf,
    code_root: PathBuf,
    format: OutputFormat,
    out: Option<PathBuf>,
    profile: String,
    provider: ProviderConfig,
    fail_on: Option<Verdict>,
    severity_threshold: Option<Severity>,
}

fn env_or(flag: &Option<String>, var: &str) -> Option<String> {
    flag.clone()
        .or_else(|| env::var(var).ok())
        .filter(|value| !value.trim().is_empty())
}

impl CheckArgs {
    fn resolve(&self) -> CliResult<CheckPlan> {
        let spec = self
            .spec
            .clone()
            .ok_or_else(|| Failure::input("--spec is required"))?;
        let plan = self
            .plan
            .clone()
            .ok_or_else(|| Failure::input("--plan is required"))?;
        if let Err(err) = std::fs::metadata(&spec) {
            return Err(Failure::input(format!(
                "spec file {:?} not found: {err}",
                spec.display().to_string()
            )));
        }
        if let Err(err) = std::fs::metadata(&plan) {
            return Err(Failure::input(format!(
                "plan file {:?} not found: {err}",
                plan.display().to_string()
            )));
        }

        let code_root = match self.code_root.clone().or_else(|| self.path.clone()) {
            Some(root) => root,
            None => env::current_dir()
                .context("cannot determine current directory")
                .exit_with(ExitKind::BadInput)?,
        };

        let format = OutputFormat::parse(&self.format).ok_or_else(|| {
            Failure::input(format!(
                "--format must be \"json\" or \"md\", got {:?}",
                self.format
            ))
        })?;

        let provider_name = env_or(&self.provider, "REALITYCHECK_PROVIDER")
            .unwrap_or_else(|| ProviderKind::Anthropic.as_str().to_string());
        let kind: ProviderKind = provider_name.parse().map_err(|_| {
            Failure::input(format!(
                "--provider value {provider_name:?} is not valid (anthropic|openai|google|replay)"
            ))
        })?;
        if kind == ProviderKind::Replay && self.replay_responses.is_empty() {
            return Err(Failure::input(
                "--provider replay needs at least one --replay-response",
            ));
        }

        let fail_on = self
            .fail_on
            .as_deref()
            .map(|value| {
                value.parse::<Verdict>().map_err(|_| {
                    Failure::input(format!(
                        "--fail-on value {:?} is not a valid verdict",
                        value.to_ascii_uppercase()
                    ))
                })
            })
            .transpose()?;
        let severity_threshold = self
            .severity_threshold
            .as_deref()
            .map(|value| {
                value.parse::<Severity>().map_err(|_| {
                    Failure::input(format!(
                        "--severity-threshold value {:?} is not valid (INFO|WARN|CRITICAL)",
                        value.to_ascii_uppercase()
                    ))
                })
            })
            .transpose()?;

        let mut provider = ProviderConfig::new(kind)
            .with_api_key_from_env()
            .with_replay_responses(self.replay_responses.clone());
        if let Some(model) = env_or(&self.model, "REALITYCHECK_MODEL") {
            provider = provider.with_model(model);
        }
        if let Some(env_name) = kind.api_key_env() {
            if !self.offline && provider.api_key.is_none() {
                return Err(Failure::new(
                    ExitKind::Oracle,
                    anyhow::anyhow!(
                        "{env_name} is not set; set the environment variable or pass --offline to skip this check"
                    ),
                ));
            }
        }

        Ok(CheckPlan {
            spec,
            plan,
            code_root,
            format,
            out: self.out.clone(),
            profile: env_or(&self.profile, "REALITYCHECK_PROFILE")
                .unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
            provider,
            fail_on,
            severity_threshold,
        })
    }
}

pub async fn run_check(args: CheckArgs) -> CliResult<()> {
    let started = Instant::now();
    let plan = args.resolve()?;

    let spec_items = parse_spec(&plan.spec)
        .context("parse spec")
        .exit_with(ExitKind::BadInput)?;
    log::info!("Parsed {} spec items", spec_items.len());
    let plan_items = parse_plan(&plan.plan)
        .context("parse plan")
        .exit_with(ExitKind::BadInput)?;
    log::info!("Parsed {} plan items", plan_items.len());

    let index = build_index(&plan.code_root, &args.ignore)
        .context("build code index")
        .exit_with(ExitKind::BadInput)?;
    let profile = load_profile(&plan.profile).exit_with(ExitKind::BadInput)?;
    let oracle = build_oracle(&plan.provider).exit_with(ExitKind::Oracle)?;
    log::info!(
        "Oracle: provider={} model={} profile={}",
        plan.provider.kind,
        plan.provider.model,
        profile.name
    );

    let mut request = AnalysisRequest::new(&spec_items, &plan_items, &index, &profile);
    request.strict = args.strict;
    request.max_tokens = args.max_tokens;
    request.temperature = args.temperature;
    request.timeout = Duration::from_secs(args.timeout_secs);
    request.debug_prompts = args.debug;

    let analysis = analyze(oracle.as_ref(), &request)
        .await
        .map_err(|err| match err {
            AnalyzeError::InvalidOutput { .. } => Failure::new(ExitKind::InvalidOutput, err),
            other => Failure::new(
                ExitKind::Oracle,
                anyhow::Error::new(other).context("oracle"),
            ),
        })?;
    if analysis.repaired {
        log::info!("Oracle output accepted after one repair");
    }

    let escalate = args.strict || profile.strict_drift_severity;
    let mut evaluation = evaluate(analysis.report, escalate);
    let spec_tally = summarize_coverage(&evaluation.report.coverage.spec);
    let plan_tally = summarize_coverage(&evaluation.report.coverage.plan);
    log::info!(
        "verdict={} score={} critical={} warn={} info={} spec_implemented={}/{} plan_implemented={}/{}",
        evaluation.verdict,
        evaluation.score,
        evaluation.counts.critical,
        evaluation.counts.warn,
        evaluation.counts.info,
        spec_tally.implemented,
        spec_tally.total(),
        plan_tally.implemented,
        plan_tally.total()
    );

    let mut meta = std::mem::take(&mut evaluation.report.meta);
    if meta.model.is_empty() {
        meta.model = plan.provider.model.clone();
        meta.temperature = args.temperature;
    }
    let summary = evaluation.summary();
    let verdict = evaluation.verdict;
    let mut report = Report {
        tool: TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        input: RunInput {
            spec_file: plan.spec.display().to_string(),
            plan_file: plan.plan.display().to_string(),
            code_root: plan.code_root.display().to_string(),
            profile: plan.profile.clone(),
            strict: args.strict,
        },
        summary,
        coverage: evaluation.report.coverage,
        drift: evaluation.report.drift,
        violations: evaluation.report.violations,
        meta,
    };
    if let Some(threshold) = &plan.severity_threshold {
        filter_by_severity(&mut report, threshold);
    }

    let rendered = render(&report, plan.format).exit_with(ExitKind::General)?;
    match &plan.out {
        Some(path) => write_atomic(path, &rendered)
            .context("write output")
            .exit_with(ExitKind::General)?,
        None => print_stdout(&rendered)
            .context("write stdout")
            .exit_with(ExitKind::General)?,
    }
    log::info!("Done in {:.3}s", started.elapsed().as_secs_f64());

    if let Some(threshold) = plan.fail_on {
        if verdict.ordinal() >= threshold.ordinal() {
            return Err(Failure::new(
                ExitKind::FailOn,
                anyhow::anyhow!(
                    "verdict {verdict} meets or exceeds --fail-on threshold {threshold}"
                ),
            ));
        }
    }
    Ok(())
}
