//! qbridge Command-Line Interface
//!
//! Runs one circuit on the configured provider and prints its receipt.
//! Every option can also be supplied through the environment, which is how
//! the runner is driven inside a job container.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

/// qbridge - run a quantum circuit and issue a verifiable receipt
#[derive(Parser, Debug)]
#[command(name = "qbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Caller-chosen job identifier recorded in the receipt
    #[arg(long, env = "ARTHA_JOB_ID", default_value = "quantum-job-unknown")]
    job_id: String,

    /// Provider to run on (simulator, ibm, google, ionq); overrides the
    /// config file, which defaults to the simulator
    #[arg(short, long, env = "QPU_PROVIDER")]
    provider: Option<String>,

    /// Circuit JSON file; the Bell circuit is used when it does not exist
    #[arg(short, long, env = "QUANTUM_CIRCUIT_JSON", default_value = "/data/circuit.json")]
    circuit: PathBuf,

    /// Number of shots (defaults to the configured default)
    #[arg(short, long)]
    shots: Option<u32>,

    /// Proof service base URL; receipts are not forwarded when unset
    #[arg(long, env = "PROOF_SERVICE_URL")]
    proof_url: Option<String>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full receipt as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = commands::run::RunOptions {
        job_id: cli.job_id,
        provider: cli.provider,
        circuit: cli.circuit,
        shots: cli.shots,
        proof_url: cli.proof_url,
        config: cli.config,
        json: cli.json,
    };

    let receipt = match commands::run::execute(&options).await {
        Ok(receipt) => receipt,
        Err(e) => {
            eprintln!("{} {:#}", console::style("Error:").red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    if receipt.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments() {
        let cli = Cli::try_parse_from([
            "qbridge",
            "--job-id",
            "job-7",
            "--provider",
            "ionq",
            "--circuit",
            "/tmp/c.json",
            "--shots",
            "500",
            "--json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.job_id, "job-7");
        assert_eq!(cli.provider.as_deref(), Some("ionq"));
        assert_eq!(cli.circuit, PathBuf::from("/tmp/c.json"));
        assert_eq!(cli.shots, Some(500));
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_provider_has_no_builtin_default() {
        use clap::CommandFactory;

        let command = Cli::command();
        let provider = command
            .get_arguments()
            .find(|arg| arg.get_id() == "provider")
            .unwrap();
        assert!(provider.get_default_values().is_empty());
    }

    #[test]
    fn test_shots_must_be_numeric() {
        assert!(Cli::try_parse_from(["qbridge", "--shots", "many"]).is_err());
    }
}
