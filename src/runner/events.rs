use super::state::{LoadSummary, ScenarioStatus};
use tokio::sync::broadcast;

/// Load test execution events for real-time updates
#[derive(Debug, Clone)]
pub enum LoadEvent {
    // Session events
    SessionStarted {
        session_id: String,
        users: u32,
        iterations: u32,
    },
    SessionFinished {
        summary: LoadSummary,
    },

    // Scenario events
    ScenarioStarted {
        user: u32,
        iteration: u32,
        step_count: usize,
    },
    ScenarioFinished {
        user: u32,
        iteration: u32,
        status: ScenarioStatus,
        duration_ms: Option<u64>,
    },

    // Step events
    StepStarted {
        user: u32,
        index: usize,
        step: String,
    },
    StepPassed {
        user: u32,
        index: usize,
        duration_ms: u64,
    },
    StepFailed {
        user: u32,
        index: usize,
        error: String,
        duration_ms: u64,
    },
    StepSkipped {
        user: u32,
        index: usize,
        reason: String,
    },

    // Log event for coordinated output
    Log {
        message: String,
    },
}

/// Event emitter for broadcasting load test events
#[derive(Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<LoadEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<LoadEvent>) {
        let (sender, receiver) = broadcast::channel(256);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: LoadEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoadEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }
}

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<LoadEvent>) {
        use colored::Colorize;
        use indicatif::ProgressDrawTarget;
        use std::io::IsTerminal;

        // Hidden draw target when piped to avoid terminal escape codes
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        // One spinner per user, plus the step text it is currently showing
        let mut spinners: HashMap<u32, ProgressBar> = HashMap::new();
        let mut step_texts: HashMap<u32, String> = HashMap::new();

        while let Ok(event) = receiver.recv().await {
            match event {
                LoadEvent::SessionStarted {
                    session_id,
                    users,
                    iterations,
                } => {
                    multi
                        .println(format!(
                            "\n{} Load test session started: {} ({} user(s) x {} iteration(s))",
                            "▶".green().bold(),
                            session_id.cyan(),
                            users,
                            iterations
                        ))
                        .ok();
                }

                LoadEvent::SessionFinished { summary } => {
                    for (_, pb) in spinners.drain() {
                        pb.finish();
                    }

                    // Small delay so spinner finishes render before the summary
                    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

                    println!("\n{} Load test session finished", "■".blue().bold());
                    println!("  Total scenarios: {}", summary.total_scenarios);
                    println!("  Total steps: {}", summary.total_steps);
                    println!(
                        "  {} passed, {} failed, {} skipped",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red(),
                        summary.skipped.to_string().yellow()
                    );
                    if let Some(duration) = summary.total_duration_ms {
                        println!("  Duration: {}ms", duration);
                    }
                }

                LoadEvent::ScenarioStarted {
                    user,
                    iteration,
                    step_count,
                } => {
                    println!(
                        "\n  {} user-{} iteration {} ({} steps)",
                        "→".blue(),
                        user.to_string().white().bold(),
                        iteration,
                        step_count
                    );
                }

                LoadEvent::ScenarioFinished {
                    user,
                    iteration,
                    status,
                    duration_ms,
                } => {
                    if let Some(pb) = spinners.remove(&user) {
                        pb.finish();
                    }

                    let status_str = match status {
                        ScenarioStatus::Passed => "PASSED".green().bold(),
                        ScenarioStatus::Failed => "FAILED".red().bold(),
                        ScenarioStatus::PartiallyPassed { passed, failed } => {
                            format!("PARTIAL ({}/{} passed)", passed, passed + failed)
                                .yellow()
                                .bold()
                        }
                        _ => "UNKNOWN".white().bold(),
                    };
                    println!(
                        "  {} user-{} iteration {} [{}]",
                        "←".blue(),
                        user,
                        iteration,
                        status_str
                    );
                    if let Some(duration) = duration_ms {
                        println!("    Duration: {}ms", duration);
                    }
                }

                LoadEvent::StepStarted { user, index, step } => {
                    let pb = multi.add(ProgressBar::new_spinner());
                    let style = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("    {spinner} {msg}")
                        .unwrap();
                    pb.set_style(style);

                    let body = format!("[{}] {}... ", index, step.dimmed());
                    pb.set_message(body.clone());
                    pb.enable_steady_tick(StdDuration::from_millis(100));

                    if let Some(old) = spinners.insert(user, pb) {
                        old.finish_and_clear();
                    }
                    step_texts.insert(user, body);
                }

                LoadEvent::StepPassed {
                    user, duration_ms, ..
                } => {
                    let text = step_texts.remove(&user).unwrap_or_default();
                    let done_msg = format!("    {} {}({}ms)", "✓".green(), text, duration_ms);

                    if let Some(pb) = spinners.remove(&user) {
                        pb.finish_and_clear();
                        println!("{}", done_msg);
                    } else {
                        println!("{}", done_msg);
                    }
                }

                LoadEvent::StepFailed {
                    user,
                    error,
                    duration_ms,
                    ..
                } => {
                    let text = step_texts.remove(&user).unwrap_or_default();

                    if let Some(pb) = spinners.remove(&user) {
                        pb.finish_and_clear();
                    }
                    println!(
                        "    {} {}({}ms) {}",
                        "✗".red(),
                        text,
                        duration_ms,
                        error.red()
                    );
                }

                LoadEvent::StepSkipped {
                    user,
                    index,
                    reason,
                } => {
                    if let Some(pb) = spinners.remove(&user) {
                        pb.finish_and_clear();
                    }
                    step_texts.remove(&user);
                    println!("    {} [{}] ({})", "○".yellow(), index, reason.dimmed());
                }

                LoadEvent::Log { message } => {
                    multi.println(format!("      {}", message)).ok();
                }
            }
        }
    }
}
