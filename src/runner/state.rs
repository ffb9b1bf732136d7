use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of a single scenario step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

/// State for a single step execution
#[derive(Debug, Clone)]
pub struct StepState {
    pub index: usize,
    pub step_name: String,
    pub status: StepStatus,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
}

impl StepState {
    pub fn new(index: usize, name: &str) -> Self {
        Self {
            index,
            step_name: name.to_string(),
            status: StepStatus::Pending,
            started_at: None,
            finished_at: None,
            duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = StepStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self) {
        self.finish(StepStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.finish(StepStatus::Failed { error });
    }

    pub fn skip(&mut self, reason: String) {
        self.status = StepStatus::Skipped { reason };
    }

    fn finish(&mut self, status: StepStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> StepStateReport {
        StepStateReport {
            index: self.index,
            step_name: self.step_name.clone(),
            status: self.status.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStateReport {
    pub index: usize,
    pub step_name: String,
    pub status: StepStatus,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pending,
    Running,
    Passed,
    Failed,
    PartiallyPassed { passed: u32, failed: u32 },
}

/// State for one scenario execution (one user iteration)
#[derive(Debug, Clone)]
pub struct ScenarioState {
    pub user: u32,
    pub iteration: u32,
    pub status: ScenarioStatus,
    pub steps: Vec<StepState>,
    pub current_index: usize,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub total_duration_ms: Option<u64>,
    /// Scenario-level error (connection failure); steps carry their own
    pub error: Option<String>,
}

impl ScenarioState {
    pub fn new(user: u32, iteration: u32, steps: Vec<StepState>) -> Self {
        Self {
            user,
            iteration,
            status: ScenarioStatus::Pending,
            steps,
            current_index: 0,
            started_at: None,
            finished_at: None,
            total_duration_ms: None,
            error: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ScenarioStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn current_step(&mut self) -> Option<&mut StepState> {
        self.steps.get_mut(self.current_index)
    }

    pub fn advance(&mut self) -> bool {
        self.current_index += 1;
        self.current_index < self.steps.len()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.total_duration_ms = Some(start.elapsed().as_millis() as u64);
        }

        let (passed, failed) = self
            .steps
            .iter()
            .fold((0, 0), |(p, f), step| match step.status {
                StepStatus::Passed => (p + 1, f),
                StepStatus::Failed { .. } => (p, f + 1),
                _ => (p, f),
            });

        self.status = if self.error.is_some() {
            ScenarioStatus::Failed
        } else if failed == 0 {
            ScenarioStatus::Passed
        } else if passed == 0 {
            ScenarioStatus::Failed
        } else {
            ScenarioStatus::PartiallyPassed { passed, failed }
        };
    }

    pub fn skip_remaining(&mut self, reason: &str) {
        for step in &mut self.steps[self.current_index..] {
            if matches!(step.status, StepStatus::Pending) {
                step.skip(reason.to_string());
            }
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> ScenarioStateReport {
        ScenarioStateReport {
            user: self.user,
            iteration: self.iteration,
            status: self.status.clone(),
            steps: self.steps.iter().map(|s| s.to_report()).collect(),
            total_duration_ms: self.total_duration_ms,
            error: self.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioStateReport {
    pub user: u32,
    pub iteration: u32,
    pub status: ScenarioStatus,
    pub steps: Vec<StepStateReport>,
    pub total_duration_ms: Option<u64>,
    pub error: Option<String>,
}

/// Global load test session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    pub scenarios: Vec<ScenarioState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SessionState {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            scenarios: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_scenario(&mut self, scenario: ScenarioState) {
        self.scenarios.push(scenario);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> LoadSummary {
        let mut total_steps = 0;
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for scenario in &self.scenarios {
            for step in &scenario.steps {
                total_steps += 1;
                match step.status {
                    StepStatus::Passed => passed += 1,
                    StepStatus::Failed { .. } => failed += 1,
                    StepStatus::Skipped { .. } => skipped += 1,
                    _ => {}
                }
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        LoadSummary {
            session_id: self.session_id.clone(),
            total_scenarios: self.scenarios.len() as u32,
            total_steps,
            passed,
            failed,
            skipped,
            total_duration_ms,
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> SessionReport {
        SessionReport {
            session_id: self.session_id.clone(),
            scenarios: self.scenarios.iter().map(|s| s.to_report()).collect(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub session_id: String,
    pub total_scenarios: u32,
    pub total_steps: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub scenarios: Vec<ScenarioStateReport>,
    pub summary: LoadSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_steps() -> Vec<StepState> {
        ["login", "register", "refreshToken", "forgotPassword", "resetPassword"]
            .iter()
            .enumerate()
            .map(|(i, name)| StepState::new(i, name))
            .collect()
    }

    #[test]
    fn test_scenario_status_all_passed() {
        let mut scenario = ScenarioState::new(1, 1, five_steps());
        scenario.start();
        for i in 0..5 {
            scenario.steps[i].start();
            scenario.steps[i].pass();
        }
        scenario.finish();
        assert_eq!(scenario.status, ScenarioStatus::Passed);
    }

    #[test]
    fn test_scenario_status_partial() {
        let mut scenario = ScenarioState::new(1, 1, five_steps());
        scenario.start();
        for i in 0..5 {
            scenario.steps[i].start();
            if i == 1 {
                scenario.steps[i].fail("register rejected".to_string());
            } else {
                scenario.steps[i].pass();
            }
        }
        scenario.finish();
        assert_eq!(
            scenario.status,
            ScenarioStatus::PartiallyPassed {
                passed: 4,
                failed: 1
            }
        );
    }

    #[test]
    fn test_scenario_status_connection_error() {
        let mut scenario = ScenarioState::new(1, 1, five_steps());
        scenario.start();
        scenario.error = Some("connection refused".to_string());
        scenario.skip_remaining("connection failed");
        scenario.finish();

        assert_eq!(scenario.status, ScenarioStatus::Failed);
        assert!(scenario
            .steps
            .iter()
            .all(|s| matches!(s.status, StepStatus::Skipped { .. })));
    }

    #[test]
    fn test_summary_counts() {
        let mut session = SessionState::new("s1");
        session.start();

        let mut ok = ScenarioState::new(1, 1, five_steps());
        ok.start();
        for i in 0..5 {
            ok.steps[i].start();
            ok.steps[i].pass();
        }
        ok.finish();
        session.add_scenario(ok);

        let mut dead = ScenarioState::new(2, 1, five_steps());
        dead.start();
        dead.error = Some("connection refused".to_string());
        dead.skip_remaining("connection failed");
        dead.finish();
        session.add_scenario(dead);

        session.finish();
        let summary = session.summary();
        assert_eq!(summary.total_scenarios, 2);
        assert_eq!(summary.total_steps, 10);
        assert_eq!(summary.passed, 5);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 5);
    }
}
