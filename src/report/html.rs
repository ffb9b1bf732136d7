use super::types::LoadTestResults;
use crate::runner::state::{ScenarioStatus, StepStatus};
use anyhow::Result;
use std::path::Path;

/// Generate HTML report
pub async fn generate(results: &LoadTestResults, output: Option<&Path>) -> Result<()> {
    let html = generate_html(results);

    if let Some(path) = output {
        std::fs::write(path, html)?;
        println!("HTML report saved to: {}", path.display());
    } else {
        println!("{}", html);
    }

    Ok(())
}

fn generate_html(results: &LoadTestResults) -> String {
    let summary = &results.summary;
    let pass_rate = if summary.total_steps > 0 {
        (summary.passed as f64 / summary.total_steps as f64 * 100.0) as u32
    } else {
        0
    };

    let mut scenarios_html = String::new();
    for scenario in &results.scenarios {
        let (status_text, status_class) = match scenario.status {
            ScenarioStatus::Passed => ("Passed", "passed"),
            ScenarioStatus::Failed => ("Failed", "failed"),
            _ => ("Partial", "partial"),
        };

        let mut steps_html = String::new();
        for step in &scenario.steps {
            let (status_icon, step_class) = match &step.status {
                StepStatus::Passed => ("✓", "passed"),
                StepStatus::Failed { .. } => ("✗", "failed"),
                StepStatus::Skipped { .. } => ("○", "skipped"),
                StepStatus::Running => ("⋯", "running"),
                StepStatus::Pending => ("○", "pending"),
            };

            let detail_html = match &step.status {
                StepStatus::Failed { error } => {
                    format!(
                        r##"<div class="error-message">{}</div>"##,
                        html_escape(error)
                    )
                }
                StepStatus::Skipped { reason } => {
                    format!(
                        r##"<div class="skip-reason">{}</div>"##,
                        html_escape(reason)
                    )
                }
                _ => String::new(),
            };

            let duration_html = step
                .duration_ms
                .map(|d| format!("<span class=\"duration\">{}ms</span>", d))
                .unwrap_or_default();

            steps_html.push_str(&format!(
                r##"
                <div class="step {step_class}">
                    <div class="step-icon">{status_icon}</div>
                    <div class="step-content">
                        <div class="step-name">{}</div>
                        {duration_html}
                        {detail_html}
                    </div>
                </div>
            "##,
                html_escape(&step.step_name),
                step_class = step_class,
                status_icon = status_icon,
                duration_html = duration_html,
                detail_html = detail_html
            ));
        }

        let duration_html = scenario
            .total_duration_ms
            .map(|d| format!("<span class=\"duration\">{}ms</span>", d))
            .unwrap_or_default();

        let error_html = scenario
            .error
            .as_ref()
            .map(|e| format!(r##"<div class="error-message">{}</div>"##, html_escape(e)))
            .unwrap_or_default();

        scenarios_html.push_str(&format!(
            r#"
            <div class="scenario {status_class}">
                <div class="scenario-header">
                    <h3>user-{} iteration {} <span class="status-badge">{status_text}</span></h3>
                    {duration_html}
                </div>
                {error_html}
                <div class="steps">
                    {steps_html}
                </div>
            </div>
        "#,
            scenario.user,
            scenario.iteration,
            status_class = status_class,
            status_text = status_text,
            duration_html = duration_html,
            error_html = error_html,
            steps_html = steps_html
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Load Test Report - {session_id}</title>
    <style>
        :root {{
            --bg-primary: #0a0f1d;
            --bg-secondary: #141b2d;
            --border: #374151;
            --text-primary: #f9fafb;
            --text-secondary: #9ca3af;
            --green: #10b981;
            --red: #ef4444;
            --yellow: #f59e0b;
            --blue: #3b82f6;
        }}

        * {{ margin: 0; padding: 0; box-sizing: border-box; }}

        body {{
            background: var(--bg-primary);
            color: var(--text-primary);
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
            padding: 32px;
        }}

        h1 {{ font-size: 22px; margin-bottom: 4px; }}
        .meta {{ color: var(--text-secondary); font-size: 13px; margin-bottom: 24px; }}

        .summary {{
            display: flex;
            gap: 16px;
            margin-bottom: 32px;
            flex-wrap: wrap;
        }}
        .summary .card {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 8px;
            padding: 16px 24px;
            min-width: 120px;
        }}
        .card .value {{ font-size: 24px; font-weight: 700; }}
        .card .label {{ color: var(--text-secondary); font-size: 12px; }}
        .card.passed .value {{ color: var(--green); }}
        .card.failed .value {{ color: var(--red); }}
        .card.skipped .value {{ color: var(--yellow); }}

        .scenario {{
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-left: 3px solid var(--blue);
            border-radius: 8px;
            margin-bottom: 16px;
            padding: 16px;
        }}
        .scenario.passed {{ border-left-color: var(--green); }}
        .scenario.failed {{ border-left-color: var(--red); }}
        .scenario.partial {{ border-left-color: var(--yellow); }}

        .scenario-header {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 8px;
        }}
        .scenario-header h3 {{ font-size: 15px; }}
        .status-badge {{
            font-size: 11px;
            color: var(--text-secondary);
            border: 1px solid var(--border);
            border-radius: 10px;
            padding: 2px 8px;
            margin-left: 8px;
        }}

        .step {{
            display: flex;
            gap: 10px;
            padding: 6px 8px;
            border-radius: 6px;
            font-size: 13px;
        }}
        .step.failed {{ background: rgba(239, 68, 68, 0.08); }}
        .step.passed .step-icon {{ color: var(--green); }}
        .step.failed .step-icon {{ color: var(--red); }}
        .step.skipped .step-icon {{ color: var(--yellow); }}

        .duration {{ color: var(--text-secondary); font-size: 12px; margin-left: 8px; }}
        .error-message {{ color: var(--red); font-size: 12px; margin-top: 4px; }}
        .skip-reason {{ color: var(--yellow); font-size: 12px; margin-top: 4px; }}
    </style>
</head>
<body>
    <h1>Load Test Report</h1>
    <div class="meta">Session {session_id} &middot; {generated_at}</div>

    <div class="summary">
        <div class="card"><div class="value">{total_scenarios}</div><div class="label">Scenarios</div></div>
        <div class="card"><div class="value">{total_steps}</div><div class="label">Steps</div></div>
        <div class="card passed"><div class="value">{passed}</div><div class="label">Passed</div></div>
        <div class="card failed"><div class="value">{failed}</div><div class="label">Failed</div></div>
        <div class="card skipped"><div class="value">{skipped}</div><div class="label">Skipped</div></div>
        <div class="card"><div class="value">{pass_rate}%</div><div class="label">Pass rate</div></div>
    </div>

    {scenarios_html}
</body>
</html>
"#,
        session_id = html_escape(&results.session_id),
        generated_at = html_escape(&results.generated_at),
        total_scenarios = summary.total_scenarios,
        total_steps = summary.total_steps,
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        pass_rate = pass_rate,
        scenarios_html = scenarios_html
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
