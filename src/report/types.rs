use crate::runner::state::{LoadSummary, ScenarioStateReport};
use serde::{Deserialize, Serialize};

/// Load test results for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTestResults {
    pub session_id: String,
    pub scenarios: Vec<ScenarioStateReport>,
    pub summary: LoadSummary,
    pub generated_at: String,
}
