use std::path::Path;

/// Test-file naming conventions per ecosystem.
///
/// - Go: `*_test.go`
/// - JS/TS: `*.test.{ts,tsx,js}` and `*.spec.{ts,tsx,js}`
/// - Python: `test_*.py` and `*_test.py`
pub fn is_test_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("");

    match ext {
        "go" => stem.ends_with("_test"),
        "py" => name.starts_with("test_") || stem.ends_with("_test"),
        "ts" | "tsx" | "js" => stem.ends_with(".test") || stem.ends_with(".spec"),
        _ => false,
    }
}
