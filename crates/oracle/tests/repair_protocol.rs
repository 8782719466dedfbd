use async_trait::async_trait;
use pretty_assertions::assert_eq;
use realitycheck_indexer::{FileEntry, Index};
use realitycheck_intent::Item;
use realitycheck_oracle::{
    analyze, AnalysisRequest, AnalyzeError, CompletionRequest, Oracle, Profile, ReplayOracle,
};
use realitycheck_protocol::Confidence;
use realitycheck_symbols::Language;
use std::time::Duration;

fn index() -> Index {
    Index {
        files: vec![FileEntry {
            path: "internal/auth/login.go".to_string(),
            language: Language::Go,
        }],
        ..Index::default()
    }
}

fn spec_items() -> Vec<Item> {
    vec![Item {
        id: "SPEC-001".to_string(),
        line_start: 3,
        line_end: 3,
        text: "Users must log in with a password.".to_string(),
    }]
}

const GROUNDED: &str = r#"```json
{
  "coverage": {
    "spec": [{
      "id": "SPEC-001",
      "status": "IMPLEMENTED",
      "spec_reference": {"line_start": 3, "line_end": 3},
      "evidence": [
        {"path": "internal/auth/login.go", "symbol": "Login", "confidence": "HIGH"},
        {"path": "internal/auth/oauth.go", "symbol": "OAuth", "confidence": "HIGH"}
      ]
    }],
    "plan": []
  },
  "drift": [],
  "violations": [],
  "meta": {"model": "replay", "temperature": 0.2}
}
```"#;

#[tokio::test]
async fn fabricated_path_is_downgraded_not_dropped() {
    let oracle = ReplayOracle::new(vec![GROUNDED.to_string()]);
    let profile = Profile::builtin("general").unwrap();
    let index = index();
    let items = spec_items();
    let request = AnalysisRequest::new(&items, &[], &index, &profile);

    let analysis = analyze(&oracle, &request).await.unwrap();
    assert_eq!(analysis.oracle_calls, 1);
    let evidence = &analysis.report.coverage.spec[0].evidence;
    assert_eq!(evidence.len(), 2);
    assert_eq!(evidence[0].confidence, Some(Confidence::High));
    assert_eq!(evidence[1].confidence, Some(Confidence::Low));
    assert_eq!(analysis.diagnostics.len(), 1);
    assert_eq!(
        analysis.diagnostics[0].field,
        "coverage.spec[0].evidence[1].path"
    );
}

#[tokio::test]
async fn unparseable_then_valid_takes_two_calls() {
    let oracle = ReplayOracle::new(vec![
        "Sure! Here is the report you asked for.".to_string(),
        GROUNDED.to_string(),
    ]);
    let profile = Profile::builtin("general").unwrap();
    let index = index();
    let request = AnalysisRequest::new(&[], &[], &index, &profile);

    let analysis = analyze(&oracle, &request).await.unwrap();
    assert_eq!(analysis.oracle_calls, 2);
    assert!(analysis.repaired);
    assert_eq!(oracle.calls(), 2);
}

#[tokio::test]
async fn two_unparseable_responses_are_unrecoverable() {
    let oracle = ReplayOracle::new(vec![
        "not json".to_string(),
        "still not json".to_string(),
        GROUNDED.to_string(),
    ]);
    let profile = Profile::builtin("general").unwrap();
    let index = index();
    let request = AnalysisRequest::new(&[], &[], &index, &profile);

    let err = analyze(&oracle, &request).await.unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidOutput { .. }), "{err}");
    assert!(err
        .to_string()
        .starts_with("invalid model output after repair attempt: validation: json_parse:"));
    assert_eq!(oracle.calls(), 2);
}

struct Stalled;

#[async_trait]
impl Oracle for Stalled {
    async fn complete(&self, _request: &CompletionRequest) -> realitycheck_oracle::Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(String::new())
    }
}

#[tokio::test]
async fn deadline_is_a_distinct_failure() {
    let profile = Profile::builtin("general").unwrap();
    let index = index();
    let mut request = AnalysisRequest::new(&[], &[], &index, &profile);
    request.timeout = Duration::from_millis(20);

    let err = analyze(&Stalled, &request).await.unwrap_err();
    assert!(matches!(err, AnalyzeError::Timeout { call: 1, .. }), "{err}");
}

#[tokio::test]
async fn strict_profile_reaches_the_system_prompt() {
    struct Capture(std::sync::Mutex<Option<CompletionRequest>>);

    #[async_trait]
    impl Oracle for Capture {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> realitycheck_oracle::Result<String> {
            *self.0.lock().unwrap() = Some(request.clone());
            Ok(GROUNDED.to_string())
        }
    }

    let oracle = Capture(std::sync::Mutex::new(None));
    let profile = Profile::builtin("data-pipeline").unwrap();
    let index = index();
    let items = spec_items();
    let mut request = AnalysisRequest::new(&items, &[], &index, &profile);
    request.strict = true;
    request.max_tokens = 1234;

    analyze(&oracle, &request).await.unwrap();
    let seen = oracle.0.lock().unwrap().clone().unwrap();
    assert!(seen.system.contains("Strict mode is active."));
    assert!(seen.system.contains("This codebase processes data."));
    assert!(seen.user.contains("  3-3: Users must log in with a password.\n"));
    assert!(seen.user.contains("  internal/auth/login.go (Go)\n"));
    assert_eq!(seen.max_tokens, 1234);
}
