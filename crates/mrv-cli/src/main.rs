//! # mrv CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// MRV Stack CLI for device keys and verifiable credentials.
///
/// Provisions and inspects device signing keys, issues credentials
/// offline, and verifies detached signatures.
#[derive(Parser, Debug)]
#[command(name = "mrv", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Provision a device key pair (idempotent).
    Keygen(mrv_cli::keys::KeyArgs),
    /// Show a device's public key and fingerprint.
    ShowKey(mrv_cli::keys::KeyArgs),
    /// Issue a credential offline for a usage fact.
    Issue(mrv_cli::issue::IssueArgs),
    /// Verify a detached hex signature.
    Verify(mrv_cli::verify::VerifyArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("mrv CLI starting");

    match cli.command {
        Commands::Keygen(args) => print!("{}", mrv_cli::keys::run_keygen(&args)?),
        Commands::ShowKey(args) => print!("{}", mrv_cli::keys::run_show_key(&args)?),
        Commands::Issue(args) => println!("{}", mrv_cli::issue::run_issue(&args)?),
        Commands::Verify(args) => {
            if mrv_cli::verify::run_verify(&args)? {
                println!("signature valid");
            } else {
                println!("signature invalid");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
