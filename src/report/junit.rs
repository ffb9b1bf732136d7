use super::types::LoadTestResults;
use crate::runner::state::{ScenarioStateReport, ScenarioStatus, StepStatus};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML report string from LoadTestResults
pub fn generate_junit_xml(results: &LoadTestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    // Write XML declaration
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    // Calculate totals
    let total_tests = results.scenarios.len();
    let failures = results
        .scenarios
        .iter()
        .filter(|s| {
            matches!(
                s.status,
                ScenarioStatus::Failed | ScenarioStatus::PartiallyPassed { .. }
            )
        })
        .count();
    let skipped = 0;
    let total_duration: u64 = results
        .scenarios
        .iter()
        .map(|s| s.total_duration_ms.unwrap_or(0))
        .sum();

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "authprobe-run"));
    suites_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suites_start.push_attribute(("failures", failures.to_string().as_str()));
    suites_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suites_start.push_attribute((
        "time",
        (total_duration as f64 / 1000.0).to_string().as_str(),
    ));
    writer.write_event(Event::Start(suites_start))?;

    // Single <testsuite> for this run: one testcase per scenario execution
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "auth-scenario"));
    suite_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suite_start.push_attribute(("failures", failures.to_string().as_str()));
    suite_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute((
        "time",
        (total_duration as f64 / 1000.0).to_string().as_str(),
    ));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for scenario in &results.scenarios {
        write_test_case(&mut writer, scenario)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    let xml = String::from_utf8(result)?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    scenario: &ScenarioStateReport,
) -> Result<()> {
    let name = format!("user-{} iteration {}", scenario.user, scenario.iteration);

    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", name.as_str()));
    case_start.push_attribute(("classname", "authprobe.auth-scenario"));
    case_start.push_attribute((
        "time",
        (scenario.total_duration_ms.unwrap_or(0) as f64 / 1000.0)
            .to_string()
            .as_str(),
    ));

    writer.write_event(Event::Start(case_start))?;

    match scenario.status {
        ScenarioStatus::Failed | ScenarioStatus::PartiallyPassed { .. } => {
            let message = failure_message(scenario);

            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", message.as_str()));
            fail_start.push_attribute(("type", "StepFailure"));
            writer.write_event(Event::Start(fail_start))?;
            writer.write_event(Event::Text(quick_xml::events::BytesText::new(&message)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        _ => {}
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Scenario-level error first, failed step outcomes otherwise
fn failure_message(scenario: &ScenarioStateReport) -> String {
    if let Some(ref error) = scenario.error {
        return error.clone();
    }

    let failed: Vec<String> = scenario
        .steps
        .iter()
        .filter_map(|step| match &step.status {
            StepStatus::Failed { error } => Some(format!("{}: {}", step.step_name, error)),
            _ => None,
        })
        .collect();

    if failed.is_empty() {
        "Unknown error".to_string()
    } else {
        failed.join("; ")
    }
}

/// Generate report on demand (report subcommand)
pub fn generate(results: &LoadTestResults, output: Option<&Path>) -> Result<()> {
    let xml = generate_junit_xml(results)?;

    if let Some(path) = output {
        std::fs::write(path, xml)?;
        println!("JUnit report saved to: {}", path.display());
    } else {
        println!("{}", xml);
    }

    Ok(())
}

/// Write report to file
pub fn write_report(results: &LoadTestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::LoadTestResults;
    use crate::runner::state::{LoadSummary, ScenarioStateReport, ScenarioStatus, StepStateReport};

    fn step(index: usize, name: &str, status: StepStatus) -> StepStateReport {
        StepStateReport {
            index,
            step_name: name.to_string(),
            status,
            duration_ms: Some(10),
        }
    }

    #[test]
    fn test_generate_junit_xml() {
        let results = LoadTestResults {
            session_id: "test-session".to_string(),
            scenarios: vec![
                ScenarioStateReport {
                    user: 1,
                    iteration: 1,
                    status: ScenarioStatus::Passed,
                    steps: vec![step(0, "login", StepStatus::Passed)],
                    total_duration_ms: Some(1500),
                    error: None,
                },
                ScenarioStateReport {
                    user: 2,
                    iteration: 1,
                    status: ScenarioStatus::PartiallyPassed {
                        passed: 4,
                        failed: 1,
                    },
                    steps: vec![step(
                        1,
                        "register",
                        StepStatus::Failed {
                            error: "AlreadyExists: email already registered".to_string(),
                        },
                    )],
                    total_duration_ms: Some(2000),
                    error: None,
                },
            ],
            summary: LoadSummary {
                session_id: "test-session".to_string(),
                total_scenarios: 2,
                total_steps: 10,
                passed: 9,
                failed: 1,
                skipped: 0,
                total_duration_ms: Some(3500),
            },
            generated_at: "2023-01-01 12:00:00".to_string(),
        };

        let xml = generate_junit_xml(&results).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="authprobe-run""#));
        assert!(xml.contains(r#"tests="2""#));
        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains(r#"<testcase name="user-1 iteration 1""#));
        assert!(xml.contains("register: AlreadyExists: email already registered"));
    }

    #[test]
    fn test_failure_message_prefers_scenario_error() {
        let scenario = ScenarioStateReport {
            user: 1,
            iteration: 1,
            status: ScenarioStatus::Failed,
            steps: vec![step(
                0,
                "login",
                StepStatus::Skipped {
                    reason: "connection failed".to_string(),
                },
            )],
            total_duration_ms: None,
            error: Some("failed to connect to http://localhost:50001".to_string()),
        };

        assert_eq!(
            failure_message(&scenario),
            "failed to connect to http://localhost:50001"
        );
    }
}
