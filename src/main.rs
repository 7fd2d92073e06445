use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use release_droid::cli::orchestration::{self, Gateways, RunArgs};
use release_droid::config;
use release_droid::ui;

#[derive(clap::Parser)]
#[command(
    name = "release-droid",
    version,
    about = "Validate a repository and release it on GitHub, Maven Central and the community portal"
)]
struct Args {
    #[arg(short = 'n', long = "name", help = "Repository name")]
    name: Option<String>,

    #[arg(short = 'o', long = "owner", default_value = "exasol", help = "Repository owner")]
    owner: String,

    #[arg(short = 'g', long = "goal", help = "validate or release")]
    goal: Option<String>,

    #[arg(
        short = 'p',
        long = "platforms",
        value_delimiter = ',',
        help = "Comma separated platforms: github,maven,community"
    )]
    platforms: Vec<String>,

    #[arg(short = 'b', long = "branch", help = "Branch to validate instead of the default branch")]
    branch: Option<String>,

    #[arg(short = 'l', long = "local", help = "Validate a local checkout at this path")]
    local: Option<String>,

    #[arg(short = 'c', long = "config", help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short = 'v', long = "verbose", help = "Log debug output")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let run_args = RunArgs {
        name: args.name,
        owner: Some(args.owner),
        goal: args.goal,
        platforms: args.platforms,
        branch: args.branch,
        local_path: args.local.map(Into::into),
    };
    let gateways = Gateways::from_config(&config);
    let today = config.behavior.date_timezone.today();

    let summary = match orchestration::run_release_droid(&run_args, &config, &gateways, today) {
        Ok(summary) => summary,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    ui::display_outcome(&summary.input, &summary.branch, &summary.outcome);
    if summary.outcome.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
