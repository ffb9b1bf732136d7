use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use authprobe::{report, runner, utils::config::LoadConfig};

#[derive(Parser)]
#[command(name = "authprobe")]
#[command(version = "0.1.0")]
#[command(about = "gRPC authentication service load-testing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the authentication scenario against a target endpoint
    Run {
        /// Target endpoint ("host:port" or URL). Config file/default if omitted
        target: Option<String>,

        /// Path to YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Encrypt the transport with TLS
        #[arg(long, default_value = "false")]
        tls: bool,

        /// Number of concurrent simulated users
        #[arg(short, long)]
        users: Option<u32>,

        /// Scenario iterations per user
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Known-good login email
        #[arg(long)]
        email: Option<String>,

        /// Known-good login password
        #[arg(long)]
        password: Option<String>,

        /// Output directory for results and reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Generate reports (HTML, JUnit)
        #[arg(long, default_value = "false")]
        report: bool,
    },

    /// Generate report from saved load test results
    Report {
        /// Path to results JSON
        results: PathBuf,

        /// Output format (json, html, junit)
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            target,
            config,
            tls,
            users,
            iterations,
            email,
            password,
            output,
            report,
        } => {
            let mut load_config = match config {
                Some(ref path) => LoadConfig::from_file(path)?,
                None => LoadConfig::default(),
            };

            // CLI flags override config file values
            if let Some(t) = target {
                load_config.target = t;
            }
            if tls {
                load_config.tls = true;
            }
            if let Some(u) = users {
                load_config.users = u;
            }
            if let Some(i) = iterations {
                load_config.iterations = i;
            }
            if let Some(e) = email {
                load_config.email = e;
            }
            if let Some(p) = password {
                load_config.password = p;
            }

            println!(
                "{} Running auth scenario against: {}",
                "▶".green().bold(),
                load_config.target.cyan()
            );
            println!(
                "  Transport: {}",
                if load_config.tls {
                    "TLS".green()
                } else {
                    "plaintext".yellow()
                }
            );
            println!("  Users: {}", load_config.users.to_string().cyan());
            println!(
                "  Iterations: {}",
                load_config.iterations.to_string().cyan()
            );
            println!("  Output: {}", output.display().to_string().cyan());
            if report {
                println!("  Reports: {}", "Enabled".green());
            }

            runner::run_load_test(&load_config, &output, report).await?;
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }
    }

    Ok(())
}
