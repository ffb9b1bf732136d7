pub mod html;
pub mod json;
pub mod junit;
pub mod types;

use anyhow::Result;
use std::path::Path;

/// Generate report from saved load test results
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let results = std::fs::read_to_string(results_path)?;
    let load_results: types::LoadTestResults = serde_json::from_str(&results)?;

    match format {
        "json" => json::generate(&load_results, output).await,
        "html" => html::generate(&load_results, output).await,
        "junit" => junit::generate(&load_results, output),
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}
