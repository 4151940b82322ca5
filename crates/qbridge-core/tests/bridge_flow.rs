//! Whole-pipeline runs: circuit in, receipt out.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use qbridge_core::{
    BridgeConfig, BridgeError, Circuit, ExecutionRequest, PollPolicy, Provider, QuantumBridge,
    Receipt,
};
use qbridge_ir::{Gate, GateKind};

fn simulator(seed: u64) -> QuantumBridge {
    let mut config = BridgeConfig::default();
    config.simulator.seed = Some(seed);
    QuantumBridge::new(config).unwrap()
}

#[tokio::test]
async fn bell_on_simulator_yields_verified_receipt() {
    let bridge = simulator(7);
    let receipt = bridge.run(&Circuit::bell(), 1024, "job-bell").await.unwrap();

    assert!(receipt.success);
    assert_eq!(receipt.job_id, "job-bell");
    assert_eq!(receipt.provider, Provider::Simulator);
    assert_eq!(receipt.shots, 1024);
    assert_eq!(receipt.counts.total_shots(), 1024);
    assert!(
        receipt.counts.iter().all(|(k, _)| k == "00" || k == "11"),
        "unexpected outcomes: {:?}",
        receipt.counts
    );
    assert!(receipt.counts.get("00") > 0);
    assert!(receipt.counts.get("11") > 0);
    assert!(receipt.error.is_none());
    assert!(receipt.verify().is_ok());

    let decoded = Receipt::from_json(&receipt.to_json().unwrap()).unwrap();
    assert_eq!(decoded.digest, receipt.digest);
    assert!(decoded.is_valid());
}

#[tokio::test]
async fn circuit_from_json_runs() {
    let json = r#"{"num_qubits": 3, "gates": [
        {"type": "x", "qubits": [0]},
        {"type": "x", "qubits": [2]}
    ]}"#;
    let circuit = Circuit::from_json(json).unwrap();
    let receipt = simulator(1).run(&circuit, 50, "job-json").await.unwrap();

    assert!(receipt.success);
    assert_eq!(receipt.counts.get("101"), 50);
}

#[tokio::test]
async fn empty_circuit_measures_all_zero() {
    let receipt = simulator(3)
        .run(&Circuit::new(1), 200, "job-empty")
        .await
        .unwrap();

    assert!(receipt.success);
    assert_eq!(receipt.counts.len(), 1);
    assert_eq!(receipt.counts.get("0"), 200);
}

#[tokio::test]
async fn unknown_gate_is_rejected_before_execution() {
    let mut circuit = Circuit::new(2);
    circuit.push(Gate::new(GateKind::Custom("swap".into()), [0, 1]));

    let err = simulator(1).run(&circuit, 10, "job-swap").await.unwrap_err();
    assert!(matches!(err, BridgeError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn out_of_range_qubit_is_rejected() {
    let mut circuit = Circuit::new(1);
    circuit.cx(0, 1);

    let err = simulator(1).run(&circuit, 10, "job-range").await.unwrap_err();
    assert!(matches!(err, BridgeError::Validation(_)));
}

#[tokio::test]
async fn simulator_width_limit_is_enforced() {
    let mut config = BridgeConfig::default();
    config.simulator.max_qubits = 2;
    let bridge = QuantumBridge::new(config).unwrap();

    let err = bridge.run(&Circuit::ghz(3), 10, "job-wide").await.unwrap_err();
    assert!(matches!(err, BridgeError::CircuitTooLarge(_)), "got {err:?}");
}

#[tokio::test]
async fn ionq_rejects_cz_without_network() {
    let mut config = BridgeConfig::for_provider(Provider::Ionq);
    // Nothing listens here; translation must fail before any request.
    config.ionq.endpoint = "http://127.0.0.1:1".into();
    config.ionq.api_key = Some("test-key".into());
    let bridge = QuantumBridge::new(config).unwrap();

    let mut circuit = Circuit::new(2);
    circuit.h(0).cz(0, 1);
    let err = bridge.run(&circuit, 100, "job-cz").await.unwrap_err();

    match err {
        BridgeError::UnsupportedGate { gate, provider } => {
            assert_eq!(gate, "cz");
            assert_eq!(provider, Provider::Ionq);
        }
        other => panic!("expected UnsupportedGate, got {other:?}"),
    }
}

#[tokio::test]
async fn ionq_without_key_is_unavailable() {
    let err = QuantumBridge::new(BridgeConfig::for_provider(Provider::Ionq)).unwrap_err();
    assert!(matches!(err, BridgeError::AdapterUnavailable(_)));
}

#[tokio::test]
async fn request_for_other_provider_is_refused() {
    let bridge = simulator(1);
    let request = ExecutionRequest::new(Circuit::bell(), 10, Provider::Google);
    let err = bridge.execute(&request).await.unwrap_err();
    assert!(matches!(err, BridgeError::AdapterUnavailable(_)));
}

#[derive(Clone, Default)]
struct StuckIonq {
    polls: Arc<AtomicU32>,
}

async fn submit(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({"id": "ionq-stuck", "status": "submitted"}))
}

async fn job(State(mock): State<StuckIonq>, Path(id): Path<String>) -> Json<Value> {
    mock.polls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"id": id, "status": "running"}))
}

async fn spawn_stuck_ionq(mock: StuckIonq) -> String {
    let app = Router::new()
        .route("/v0.3/jobs", post(submit))
        .route("/v0.3/jobs/:id", get(job))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn stuck_vendor_job_times_out_into_failed_receipt() {
    let mock = StuckIonq::default();
    let endpoint = spawn_stuck_ionq(mock.clone()).await;

    let mut config = BridgeConfig::for_provider(Provider::Ionq);
    config.poll = PollPolicy::intervals(Duration::from_millis(5), 10);
    config.ionq.endpoint = endpoint;
    config.ionq.api_key = Some("test-key".into());
    let bridge = QuantumBridge::new(config).unwrap();

    let receipt = bridge.run(&Circuit::bell(), 100, "job-stuck").await.unwrap();

    assert!(!receipt.success);
    assert_eq!(receipt.error.as_deref(), Some("timeout"));
    assert_eq!(receipt.vendor_job_id.as_deref(), Some("ionq-stuck"));
    assert!(receipt.counts.is_empty());
    assert!(receipt.verify().is_ok());
    assert_eq!(mock.polls.load(Ordering::SeqCst), 10);
}
