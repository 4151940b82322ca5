//! Cirq-style program documents and measurement records.
//!
//! Qubits live on a single-row grid (`GridQubit.rect(1, n)`), identified as
//! `0_i`. Operations are packed into moments with the earliest-insertion
//! rule, and a final moment measures the whole register under key `m`.

use qbridge_hal::{Counts, HalError, HalResult, NativeOp, Provider};
use qbridge_ir::{Circuit, GateKind};
use serde_json::{Value, json};

use crate::error::{GoogleError, GoogleResult};

/// Measurement key of the terminal register measurement.
pub const MEASUREMENT_KEY: &str = "m";

/// Grid identifier of a register index.
pub fn qubit_id(index: u32) -> String {
    format!("0_{index}")
}

/// Cirq gate name for a gate kind.
pub fn native_name(kind: &GateKind) -> Option<&'static str> {
    match kind {
        GateKind::H => Some("H"),
        GateKind::X => Some("X"),
        GateKind::CX => Some("CNOT"),
        GateKind::CZ => Some("CZ"),
        GateKind::Rz => Some("Rz"),
        GateKind::Ry => Some("Ry"),
        GateKind::Custom(_) => None,
    }
}

/// Gate kind of a Cirq gate name.
pub fn gate_kind(native: &str) -> Option<GateKind> {
    GateKind::STANDARD
        .into_iter()
        .find(|kind| native_name(kind) == Some(native))
}

/// One native op per gate.
pub fn to_ops(circuit: &Circuit) -> HalResult<Vec<NativeOp>> {
    circuit
        .gates
        .iter()
        .map(|gate| {
            let name = native_name(&gate.kind).ok_or_else(|| HalError::UnsupportedGate {
                gate: gate.name().to_string(),
                provider: Provider::Google,
            })?;
            let op = NativeOp::new(name, gate.qubits.clone());
            Ok(match gate.angle {
                Some(rads) => op.with_param(rads),
                None => op,
            })
        })
        .collect()
}

/// Build the program document submitted to the engine.
pub fn to_program(num_qubits: u32, ops: &[NativeOp]) -> Value {
    let mut moments: Vec<Vec<Value>> = Vec::new();
    let mut frontier = vec![0usize; num_qubits as usize];

    for op in ops {
        let slot = op
            .qubits
            .iter()
            .map(|&q| frontier.get(q as usize).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);
        if slot == moments.len() {
            moments.push(Vec::new());
        }
        moments[slot].push(operation(op));
        for &q in &op.qubits {
            if let Some(next) = frontier.get_mut(q as usize) {
                *next = slot + 1;
            }
        }
    }

    let register: Vec<String> = (0..num_qubits).map(qubit_id).collect();
    moments.push(vec![json!({
        "gate": "MeasurementGate",
        "key": MEASUREMENT_KEY,
        "qubits": register,
    })]);

    let qubits: Vec<Value> = (0..num_qubits)
        .map(|col| json!({"cirq_type": "GridQubit", "row": 0, "col": col}))
        .collect();
    let moments: Vec<Value> = moments
        .into_iter()
        .map(|operations| json!({ "operations": operations }))
        .collect();

    json!({
        "cirq_type": "Circuit",
        "qubits": qubits,
        "moments": moments,
    })
}

fn operation(op: &NativeOp) -> Value {
    let qubits: Vec<String> = op.qubits.iter().map(|&q| qubit_id(q)).collect();
    let mut value = json!({ "gate": op.name, "qubits": qubits });
    if let Some(rads) = op.params.first() {
        value["rads"] = json!(rads);
    }
    value
}

/// Normalize per-shot measurement records into counts.
///
/// Expects `{"measurements": {"m": [[b0, b1, ...], ...]}}` with one row per
/// shot and bit `i` belonging to qubit `0_i`.
pub fn counts_from_result(result: &Value, num_qubits: u32) -> GoogleResult<Counts> {
    let rows = result
        .get("measurements")
        .and_then(|m| m.get(MEASUREMENT_KEY))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            GoogleError::MalformedResult(format!("missing measurements for key '{MEASUREMENT_KEY}'"))
        })?;

    let mut counts = Counts::new();
    for (shot, row) in rows.iter().enumerate() {
        let bits = row
            .as_array()
            .filter(|bits| bits.len() == num_qubits as usize)
            .ok_or_else(|| {
                GoogleError::MalformedResult(format!(
                    "shot {shot} does not have {num_qubits} bits"
                ))
            })?;

        let mut bitstring = String::with_capacity(bits.len());
        for bit in bits.iter().rev() {
            match bit.as_u64() {
                Some(0) => bitstring.push('0'),
                Some(1) => bitstring.push('1'),
                _ => {
                    return Err(GoogleError::MalformedResult(format!(
                        "shot {shot} has a non-binary outcome {bit}"
                    )));
                }
            }
        }
        counts.insert(bitstring, 1);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in GateKind::STANDARD {
            let name = native_name(&kind).unwrap();
            assert_eq!(gate_kind(name), Some(kind));
        }
        assert!(native_name(&GateKind::Custom("swap".into())).is_none());
    }

    #[test]
    fn test_bell_program_layout() {
        let ops = to_ops(&Circuit::bell()).unwrap();
        let program = to_program(2, &ops);

        let moments = program["moments"].as_array().unwrap();
        assert_eq!(moments.len(), 3);
        assert_eq!(moments[0]["operations"][0]["gate"], "H");
        assert_eq!(moments[0]["operations"][0]["qubits"], json!(["0_0"]));
        assert_eq!(moments[1]["operations"][0]["gate"], "CNOT");
        assert_eq!(moments[1]["operations"][0]["qubits"], json!(["0_0", "0_1"]));

        let measure = &moments[2]["operations"][0];
        assert_eq!(measure["key"], "m");
        assert_eq!(measure["qubits"], json!(["0_0", "0_1"]));
        assert_eq!(program["qubits"][1]["col"], 1);
    }

    #[test]
    fn test_parallel_gates_share_a_moment() {
        let mut circuit = Circuit::new(3);
        circuit.h(0).h(1).rz(0.5, 2).cz(0, 1);
        let program = to_program(3, &to_ops(&circuit).unwrap());

        let moments = program["moments"].as_array().unwrap();
        assert_eq!(moments[0]["operations"].as_array().unwrap().len(), 3);
        assert_eq!(moments[0]["operations"][2]["rads"], 0.5);
        assert_eq!(moments[1]["operations"][0]["gate"], "CZ");
        assert_eq!(moments.len(), 3);
    }

    #[test]
    fn test_counts_qubit_zero_rightmost() {
        let result = json!({"measurements": {"m": [[1, 0], [1, 0], [1, 1], [0, 0]]}});
        let counts = counts_from_result(&result, 2).unwrap();
        assert_eq!(counts.get("01"), 2);
        assert_eq!(counts.get("11"), 1);
        assert_eq!(counts.get("00"), 1);
    }

    #[test]
    fn test_counts_reject_malformed() {
        assert!(counts_from_result(&json!({}), 2).is_err());
        assert!(counts_from_result(&json!({"measurements": {"m": [[1]]}}), 2).is_err());
        assert!(counts_from_result(&json!({"measurements": {"m": [[2, 0]]}}), 2).is_err());
    }
}
