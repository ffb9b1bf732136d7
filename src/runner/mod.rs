pub mod events;
pub mod scenario;
pub mod state;

pub use events::*;
pub use state::*;

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::client::{GrpcAuthClient, TransportMode};
use crate::identity::{FakerIdentityGenerator, IdentityGenerator};
use crate::utils::config::LoadConfig;
use scenario::{step_states, ScenarioRunner};

/// Run a full load test session: spawn the simulated users, collect their
/// scenario states, write results and optional reports
pub async fn run_load_test(config: &LoadConfig, output: &Path, report: bool) -> Result<()> {
    std::fs::create_dir_all(output)?;

    let (emitter, receiver) = EventEmitter::new();

    // Start console listener in background
    tokio::spawn(ConsoleEventListener::listen(receiver));

    let mut session = SessionState::new(&Uuid::new_v4().to_string());
    session.start();

    emitter.emit(LoadEvent::SessionStarted {
        session_id: session.session_id.clone(),
        users: config.users,
        iterations: config.iterations,
    });

    let generator: Arc<dyn IdentityGenerator> = Arc::new(FakerIdentityGenerator);

    // Each user is an independent task with its own connections and
    // identities; nothing is shared beyond the event channel
    let mut handles = Vec::new();
    for user in 1..=config.users {
        let config = config.clone();
        let emitter = emitter.clone();
        let generator = generator.clone();

        let handle =
            tokio::spawn(async move { run_user(user, &config, generator, emitter).await });
        handles.push(handle);
    }

    for handle in handles {
        for scenario in handle.await? {
            session.add_scenario(scenario);
        }
    }

    session.finish();
    let summary = session.summary();
    emitter.emit(LoadEvent::SessionFinished {
        summary: summary.clone(),
    });

    // Small delay to ensure the summary is rendered before the report paths
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    // Save raw session results; the report subcommand re-reads this file
    let report_data = session.to_report();
    let results = crate::report::types::LoadTestResults {
        session_id: report_data.session_id.clone(),
        scenarios: report_data.scenarios,
        summary: report_data.summary,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    let results_path = output.join("results.json");
    let json = serde_json::to_string_pretty(&results)?;
    std::fs::write(&results_path, json)?;

    println!(
        "\n{} Results saved to: {}",
        "📄".to_string().blue(),
        results_path.display().to_string().cyan()
    );

    if report {
        let html_path = output.join("report.html");
        crate::report::html::generate(&results, Some(&html_path)).await?;
        println!(
            "{} HTML report saved to: {}",
            "📊".to_string().blue(),
            html_path.display().to_string().cyan()
        );

        crate::report::junit::write_report(&results, output)?;
    }

    Ok(())
}

/// One simulated user: sequential scenario iterations, each over its own
/// connection with its own generated identity
async fn run_user(
    user: u32,
    config: &LoadConfig,
    generator: Arc<dyn IdentityGenerator>,
    emitter: EventEmitter,
) -> Vec<ScenarioState> {
    let mode = TransportMode::from_tls(config.tls);
    let mut scenarios = Vec::new();

    for iteration in 1..=config.iterations {
        let state = match GrpcAuthClient::connect(&config.target, mode).await {
            Ok(client) => {
                ScenarioRunner::new(
                    Box::new(client),
                    generator.clone(),
                    emitter.clone(),
                    &config.email,
                    &config.password,
                    user,
                    iteration,
                )
                .run()
                .await
            }
            Err(err) => connection_failure(user, iteration, err.to_string(), &emitter),
        };
        scenarios.push(state);
    }

    scenarios
}

/// The transport could not be established: no steps execute, the scenario is
/// reported as a single failure with every step skipped
fn connection_failure(
    user: u32,
    iteration: u32,
    error: String,
    emitter: &EventEmitter,
) -> ScenarioState {
    let mut state = ScenarioState::new(user, iteration, step_states());

    emitter.emit(LoadEvent::ScenarioStarted {
        user,
        iteration,
        step_count: state.steps.len(),
    });

    state.start();
    state.error = Some(error.clone());
    state.skip_remaining("connection failed");
    state.finish();

    for step in &state.steps {
        emitter.emit(LoadEvent::StepSkipped {
            user,
            index: step.index,
            reason: "connection failed".to_string(),
        });
    }
    emitter.emit(LoadEvent::Log {
        message: format!("{} {}", "⚠".yellow(), error),
    });
    emitter.emit(LoadEvent::ScenarioFinished {
        user,
        iteration,
        status: state.status.clone(),
        duration_ms: state.total_duration_ms,
    });

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::{ScenarioStatus, StepStatus};

    #[test]
    fn test_connection_failure_reports_five_skipped_steps() {
        let emitter = EventEmitter::default();
        let state = connection_failure(1, 1, "connection refused".to_string(), &emitter);

        assert_eq!(state.status, ScenarioStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("connection refused"));
        assert_eq!(state.steps.len(), 5);
        assert!(state
            .steps
            .iter()
            .all(|s| matches!(s.status, StepStatus::Skipped { .. })));
    }
}
