use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use xfsbench::cli::{Action, Cli};
use xfsbench::config::BenchConfig;
use xfsbench::{image, runner};

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load the config file (if any) and apply command-line overrides
fn load_config(args: &Cli) -> Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BenchConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    match args.action() {
        Some(Action::Prepare) => {
            image::prepare_image(&args.image, args.image_size_gb, args.force)?;
        }
        Some(Action::Mount) => {
            image::mount_image(&args.image, &args.mountpoint)?;
        }
        Some(Action::Unmount) => {
            image::unmount_image(&args.mountpoint, &args.image)?;
        }
        Some(Action::RunAll) => {
            let config = load_config(&args)?;
            tracing::debug!(?config, "starting full run");
            runner::run_all(&args.mountpoint, &config)?;
        }
        None => {
            println!("No action requested. Use --prepare, --mount, --unmount or --run-all.");
        }
    }

    Ok(())
}
