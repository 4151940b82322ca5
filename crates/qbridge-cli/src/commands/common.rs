//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::warn;

use qbridge_core::Receipt;
use qbridge_ir::Circuit;

/// Load a circuit from a JSON file, falling back to the Bell circuit when
/// the file does not exist.
///
/// Returns the circuit and whether the fallback was used.
pub fn load_circuit(path: &Path) -> Result<(Circuit, bool)> {
    if !path.exists() {
        warn!(path = %path.display(), "circuit file not found, using Bell circuit");
        return Ok((Circuit::bell(), true));
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read circuit file: {}", path.display()))?;
    let circuit = Circuit::from_json(&source)
        .with_context(|| format!("Failed to parse circuit file: {}", path.display()))?;
    Ok((circuit, false))
}

/// Print a human-readable receipt summary.
pub fn print_receipt(receipt: &Receipt) {
    if receipt.success {
        println!(
            "\n{} Results ({} shots):",
            style("✓").green().bold(),
            receipt.shots
        );
    } else {
        println!(
            "\n{} Execution failed: {}",
            style("✗").red().bold(),
            receipt.error.as_deref().unwrap_or("unknown error")
        );
    }

    let sorted = receipt.counts.sorted();
    let total = receipt.counts.total_shots() as f64;

    for (bitstring, count) in sorted.iter().take(16) {
        let prob = **count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }

    println!();
    println!("  Job:      {}", receipt.job_id);
    println!("  Provider: {}", style(receipt.provider).yellow());
    if let Some(backend) = &receipt.backend {
        println!("  Backend:  {backend}");
    }
    if let Some(vendor_job_id) = &receipt.vendor_job_id {
        println!("  Vendor job: {vendor_job_id}");
    }
    println!("  Digest:   {}", style(&receipt.digest).dim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_falls_back_to_bell() {
        let dir = tempfile::tempdir().unwrap();
        let (circuit, fallback) = load_circuit(&dir.path().join("absent.json")).unwrap();
        assert!(fallback);
        assert_eq!(circuit, Circuit::bell());
    }

    #[test]
    fn test_reads_circuit_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"num_qubits": 3, "gates": [{{"type": "h", "qubits": [2]}}]}}"#
        )
        .unwrap();

        let (circuit, fallback) = load_circuit(file.path()).unwrap();
        assert!(!fallback);
        assert_eq!(circuit.num_qubits, 3);
        assert_eq!(circuit.gates.len(), 1);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = load_circuit(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse circuit file"));
    }
}
