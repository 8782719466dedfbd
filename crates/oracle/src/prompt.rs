use crate::profile::Profile;
use crate::validate::ValidationError;
use realitycheck_intent::Item;
use std::fmt::Write as _;

const PREAMBLE: &str = "You are RealityCheck, an intent enforcement analyzer.\n\n";

const JSON_ONLY_RULE: &str = "Output ONLY valid JSON conforming to the schema below. No prose, no markdown, no explanation outside the JSON.\n\n";

const GROUNDING_RULE: &str = "Only cite file paths that appear in the CODE INVENTORY below. Never fabricate paths or symbol names. If you cannot find evidence, set evidence to [] and state uncertainty in the notes field.\n\n";

const CITATION_RULE: &str =
    "Every drift finding and violation MUST cite at least one path from the CODE INVENTORY.\n\n";

const STRICT_RULE: &str = "Strict mode is active. Do not infer intent. Treat all unclear coverage as NOT_IMPLEMENTED. Treat all unverifiable evidence as absent.\n\n";

const OUTPUT_SCHEMA: &str = r#"Output schema (JSON only):
{
  "coverage": {
    "spec": [
      {
        "id": "SPEC-001",
        "status": "IMPLEMENTED|PARTIAL|NOT_IMPLEMENTED|UNCLEAR",
        "spec_reference": {"line_start": 1, "line_end": 2, "quote": "..."},
        "evidence": [{"path": "relative/file.go", "symbol": "FuncName", "confidence": "HIGH|MEDIUM|LOW"}],
        "notes": "optional explanation"
      }
    ],
    "plan": [
      {
        "id": "PLAN-001",
        "status": "IMPLEMENTED|PARTIAL|NOT_IMPLEMENTED|UNCLEAR",
        "plan_reference": {"line_start": 1, "line_end": 2, "quote": "..."},
        "evidence": [{"path": "relative/file.go", "symbol": "FuncName", "confidence": "HIGH|MEDIUM|LOW"}],
        "notes": "optional explanation"
      }
    ]
  },
  "drift": [
    {
      "id": "DRIFT-001",
      "severity": "INFO|WARN|CRITICAL",
      "description": "...",
      "evidence": [{"path": "relative/file.go", "symbol": "FuncName", "confidence": "HIGH|MEDIUM|LOW"}],
      "why_unjustified": "...",
      "impact": "...",
      "recommendation": "..."
    }
  ],
  "violations": [
    {
      "id": "VIOLATION-001",
      "severity": "INFO|WARN|CRITICAL",
      "description": "...",
      "spec_reference": {"line_start": 1, "line_end": 2, "quote": "..."},
      "evidence": [{"path": "relative/file.go", "symbol": "FuncName", "confidence": "HIGH|MEDIUM|LOW"}],
      "impact": "...",
      "blocking": true
    }
  ],
  "meta": {
    "model": "<model-name>",
    "temperature": 0.2
  }
}
"#;

pub fn build_system_prompt(profile: &Profile, strict: bool) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(PREAMBLE);
    prompt.push_str(JSON_ONLY_RULE);
    prompt.push_str(GROUNDING_RULE);
    prompt.push_str(CITATION_RULE);
    if strict {
        prompt.push_str(STRICT_RULE);
    }
    if !profile.system_prompt_addendum.is_empty() {
        prompt.push_str(&profile.system_prompt_addendum);
        prompt.push_str("\n\n");
    }
    prompt.push_str(OUTPUT_SCHEMA);
    prompt
}

/// Documents with line numbers, then the inventory. Source content is never
/// part of `inventory`; only paths, symbols and manifest text.
pub fn build_user_prompt(spec_items: &[Item], plan_items: &[Item], inventory: &str) -> String {
    let mut prompt = String::from("SPEC.md (with line numbers):\n");
    push_items(&mut prompt, spec_items);
    prompt.push_str("\nPLAN.md (with line numbers):\n");
    push_items(&mut prompt, plan_items);
    prompt.push_str("\nCODE INVENTORY:\n");
    prompt.push_str(inventory);
    prompt.push_str("\nProduce the JSON report now.");
    prompt
}

fn push_items(prompt: &mut String, items: &[Item]) {
    for item in items {
        let _ = writeln!(
            prompt,
            "  {}-{}: {}",
            item.line_start, item.line_end, item.text
        );
    }
}

/// Second-call prompt: the original request, the rejected answer and why it
/// was rejected.
pub fn build_repair_prompt(
    original_user_prompt: &str,
    raw_response: &str,
    errors: &[ValidationError],
) -> String {
    let mut prompt = String::with_capacity(original_user_prompt.len() + raw_response.len() + 256);
    prompt.push_str(original_user_prompt);
    prompt.push_str("\n\nYour previous response was:\n");
    prompt.push_str(raw_response);
    prompt.push_str("\n\nThat response was invalid. Errors:\n");
    for error in errors {
        let _ = writeln!(prompt, "  - {error}");
    }
    prompt.push_str(
        "\nPlease output only the corrected JSON conforming to the schema. Do not repeat the error.",
    );
    prompt
}
