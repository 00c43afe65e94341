use clap::{Parser, Subcommand};
use filmstrip::config::{self, SiteConfig};
use filmstrip::deploy::{self, open_driver};
use filmstrip::imaging::RustBackend;
use filmstrip::{output, site};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that can skip unchanged work.
#[derive(clap::Args, Clone, Copy, Default)]
struct ForceArgs {
    /// Ignore fingerprints and redo everything
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
#[command(name = "filmstrip")]
#[command(version)]
#[command(about = "Photo gallery builder and object-store deployer")]
#[command(long_about = "\
Photo gallery builder and object-store deployer

Every directory under the source tree is a collection; JPEG files are its
photos. Collections nest as deep as you like: a collection with
sub-collections becomes a cover page, one without becomes a gallery.

Naming conventions (files and directories):

  _2_Harbour.jpg       ordered second, titled \"Harbour\"
  *Harbour.jpg         cover of its collection
  *_1_Harbour.jpg      both
  DSC_0042.jpg         untitled when auto_untitle is on

Without a subcommand, filmstrip builds the site and then deploys it.
Unchanged files are neither rewritten nor re-uploaded; set RUST_LOG=debug
to see every skip decision.

Run 'filmstrip gen-config' to generate a documented config.toml.")]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site from the source tree into the output directory
    Build(ForceArgs),
    /// Upload the output directory to remote storage and flush stale objects
    Deploy(ForceArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
        }
        Some(Command::Build(args)) => {
            let config = config::load_config(&cli.config)?;
            run_build(&config, args.force)?;
        }
        Some(Command::Deploy(args)) => {
            let config = config::load_config(&cli.config)?;
            run_deploy(&config, args.force)?;
        }
        None => {
            let config = config::load_config(&cli.config)?;
            run_build(&config, false)?;
            run_deploy(&config, false)?;
        }
    }

    Ok(())
}

fn run_build(config: &SiteConfig, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "==> Building {} → {}",
        config.source_dir.display(),
        config.output_dir.display()
    );
    let outcome = site::build(config, &RustBackend::new(), force)?;
    output::print_build_output(&outcome.root, &outcome.report);
    Ok(())
}

fn run_deploy(config: &SiteConfig, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "==> Deploying {} to {} bucket '{}'",
        config.output_dir.display(),
        config.storage.driver,
        config.storage.bucket
    );
    let driver = open_driver(&config.storage)?;
    let report = deploy::deploy(
        driver.as_ref(),
        &config.output_dir,
        config.effective_workers(),
        force,
    )?;
    output::print_deploy_report(&report);
    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
