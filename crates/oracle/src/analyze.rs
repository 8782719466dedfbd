use crate::client::{CompletionRequest, Oracle};
use crate::error::AnalyzeError;
use crate::profile::Profile;
use crate::prompt::{build_repair_prompt, build_system_prompt, build_user_prompt};
use crate::validate::{validate_response, Validation, ValidationError};
use realitycheck_indexer::Index;
use realitycheck_intent::Item;
use realitycheck_protocol::PartialReport;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    pub spec_items: &'a [Item],
    pub plan_items: &'a [Item],
    pub index: &'a Index,
    pub profile: &'a Profile,
    pub strict: bool,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Shared by the initial call and the repair call.
    pub timeout: Duration,
    /// Log the assembled prompts at debug level.
    pub debug_prompts: bool,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(
        spec_items: &'a [Item],
        plan_items: &'a [Item],
        index: &'a Index,
        profile: &'a Profile,
    ) -> Self {
        Self {
            spec_items,
            plan_items,
            index,
            profile,
            strict: false,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            debug_prompts: false,
        }
    }
}

/// A validated report and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub report: PartialReport,
    /// Non-fatal findings of the accepted response.
    pub diagnostics: Vec<ValidationError>,
    pub oracle_calls: usize,
    pub repaired: bool,
}

/// Asks the oracle for a report, with at most one repair round.
///
/// Transport failures and the deadline are terminal on either call; only
/// fatal validation errors of the first response lead to the second call.
pub async fn analyze(
    oracle: &dyn Oracle,
    request: &AnalysisRequest<'_>,
) -> Result<Analysis, AnalyzeError> {
    let deadline = Instant::now() + request.timeout;
    let system = build_system_prompt(request.profile, request.strict);
    let user = build_user_prompt(
        request.spec_items,
        request.plan_items,
        &request.index.summary(),
    );
    if request.debug_prompts {
        log::debug!("System prompt:\n{system}");
        log::debug!("User prompt:\n{user}");
    }

    let first = CompletionRequest {
        system,
        user,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    };
    let raw = call(oracle, &first, 1, deadline, request.timeout).await?;
    let validation = validate_response(&raw, request.index);
    if let Some(analysis) = accept(validation.clone(), 1, false) {
        return Ok(analysis);
    }

    log::warn!(
        "Oracle output rejected, requesting one repair: {}",
        describe(&validation.errors)
    );
    let repair = CompletionRequest {
        user: build_repair_prompt(&first.user, &raw, &validation.errors),
        ..first
    };
    if request.debug_prompts {
        log::debug!("Repair prompt:\n{}", repair.user);
    }
    let raw = call(oracle, &repair, 2, deadline, request.timeout).await?;
    let validation = validate_response(&raw, request.index);
    let errors = validation.errors.clone();
    accept(validation, 2, true).ok_or(AnalyzeError::InvalidOutput { errors })
}

async fn call(
    oracle: &dyn Oracle,
    request: &CompletionRequest,
    number: usize,
    deadline: Instant,
    timeout: Duration,
) -> Result<String, AnalyzeError> {
    log::info!("Oracle call {number} via {}", oracle.label());
    let raw = timeout_at(deadline, oracle.complete(request))
        .await
        .map_err(|_| AnalyzeError::Timeout {
            call: number,
            timeout,
        })??;
    log::debug!("Oracle call {number} returned {} bytes", raw.len());
    Ok(raw)
}

fn accept(validation: Validation, calls: usize, repaired: bool) -> Option<Analysis> {
    if validation.has_fatal() {
        return None;
    }
    let report = validation.report?;
    for diagnostic in &validation.errors {
        log::debug!("{diagnostic}");
    }
    Some(Analysis {
        report,
        diagnostics: validation.errors,
        oracle_calls: calls,
        repaired,
    })
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .filter(|error| error.is_fatal())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
