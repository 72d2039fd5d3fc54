//! `todo-check`: run the HTTP checks against a todo service and print a report.

use std::process::ExitCode;

use clap::Parser;
use todo_check::{scenarios, Config, Fixture, Scenario, Suite, UreqTransport};
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "todo-check")]
#[command(about = "Black-box HTTP checks for a todo REST service")]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Print the available check names and exit.
    #[arg(long)]
    list: bool,

    /// Run only the named check (repeatable).
    #[arg(long = "only", value_name = "NAME")]
    only: Vec<String>,
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides `level`.
fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("todo_check={level},todo_check_runner={level}"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn select(only: &[String]) -> Result<Vec<Scenario>, String> {
    if only.is_empty() {
        return Ok(scenarios::all());
    }
    only.iter()
        .map(|name| scenarios::find(name).ok_or_else(|| format!("unknown check: {name}")))
        .collect()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list {
        for scenario in scenarios::all() {
            println!("{}", scenario.name);
        }
        return ExitCode::SUCCESS;
    }

    init_logging(&cli.config.log_level);

    let selected = match select(&cli.only) {
        Ok(selected) => selected,
        Err(msg) => {
            error!("{msg}");
            eprintln!("error: {msg}");
            return ExitCode::from(2);
        }
    };

    let fixture = Fixture::new();
    let timeout = cli.config.timeout();
    if let Err(err) = fixture.init(cli.config) {
        error!(%err, "bad configuration");
        eprintln!("error: {err}");
        return ExitCode::from(2);
    }

    let transport = UreqTransport::new(timeout);
    let report = Suite::new(&fixture, &transport).run(&selected);
    println!("{report}");

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
