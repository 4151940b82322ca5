//! Run command implementation.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use qbridge_core::{BridgeConfig, Provider, QuantumBridge, Receipt};

use super::common::{load_circuit, print_receipt};

/// Resolved command-line options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub job_id: String,
    pub provider: Option<String>,
    pub circuit: PathBuf,
    pub shots: Option<u32>,
    pub proof_url: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

/// Build the bridge configuration from the config file, the environment
/// and the command line, in increasing precedence.
pub fn resolve_config(options: &RunOptions) -> Result<BridgeConfig> {
    let mut config = BridgeConfig::load(options.config.as_deref())?;
    if let Some(provider) = options.provider.as_deref() {
        config.provider = provider.parse::<Provider>()?;
    }
    if let Some(url) = options.proof_url.as_deref().filter(|u| !u.is_empty()) {
        config.proof_service_url = Some(url.to_string());
    }
    if let Some(shots) = options.shots {
        config.default_shots = shots;
    }
    config.validate()?;
    Ok(config)
}

/// Execute the run command.
pub async fn execute(options: &RunOptions) -> Result<Receipt> {
    let config = resolve_config(options)?;
    let (circuit, fallback) = load_circuit(&options.circuit)?;
    let bridge = QuantumBridge::new(config)?;
    let shots = bridge.default_shots();

    if !options.json {
        println!(
            "{} Running {} on {} ({} shots)",
            style("→").cyan().bold(),
            style(&options.job_id).green(),
            style(bridge.provider()).yellow(),
            shots
        );
        let origin = if fallback {
            "built-in Bell circuit".to_string()
        } else {
            options.circuit.display().to_string()
        };
        println!(
            "  Loaded: {} qubits, {} gates ({})",
            circuit.num_qubits(),
            circuit.len(),
            origin
        );
    }

    let spinner = if options.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Executing job...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = bridge.run(&circuit, shots, &options.job_id).await;
    spinner.finish_and_clear();
    let receipt = outcome?;

    info!(
        job_id = %receipt.job_id,
        success = receipt.success,
        digest = %receipt.digest,
        "job finished"
    );

    if options.json {
        println!("{}", receipt.to_json_pretty()?);
    } else {
        print_receipt(&receipt);
    }

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options(provider: &str) -> RunOptions {
        RunOptions {
            job_id: "job-cli".into(),
            provider: Some(provider.into()),
            circuit: PathBuf::from("/nonexistent/circuit.json"),
            shots: Some(128),
            proof_url: None,
            config: None,
            json: true,
        }
    }

    #[test]
    fn test_provider_alias_resolves() {
        let config = resolve_config(&options("qiskit_simulator")).unwrap();
        assert_eq!(config.provider, Provider::Simulator);
        assert_eq!(config.default_shots, 128);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(resolve_config(&options("dwave")).is_err());
    }

    #[test]
    fn test_zero_shots_rejected() {
        let mut opts = options("simulator");
        opts.shots = Some(0);
        assert!(resolve_config(&opts).is_err());
    }

    #[test]
    fn test_config_file_and_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_shots: 64\nsimulator:\n  seed: 9").unwrap();

        let mut opts = options("simulator");
        opts.config = Some(file.path().to_path_buf());
        opts.shots = None;
        opts.proof_url = Some("http://proof.local:8085".into());

        let config = resolve_config(&opts).unwrap();
        assert_eq!(config.default_shots, 64);
        assert_eq!(config.simulator.seed, Some(9));
        assert_eq!(config.proof_service_url(), Some("http://proof.local:8085"));
    }

    #[test]
    fn test_config_file_provider_kept_without_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "provider: ionq\nionq:\n  api_key: k").unwrap();

        let mut opts = options("simulator");
        opts.provider = None;
        opts.config = Some(file.path().to_path_buf());
        let config = resolve_config(&opts).unwrap();
        assert_eq!(config.provider, Provider::Ionq);

        opts.provider = Some("simulator".into());
        let config = resolve_config(&opts).unwrap();
        assert_eq!(config.provider, Provider::Simulator);
    }

    #[tokio::test]
    async fn test_missing_circuit_runs_bell() {
        let receipt = execute(&options("simulator")).await.unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.job_id, "job-cli");
        assert_eq!(receipt.counts.total_shots(), 128);
        assert!(receipt.is_valid());
    }
}
