//! Property tests for circuit validation.

use proptest::prelude::*;
use qbridge_ir::{Circuit, Gate, GateKind};

/// A gate that is valid on a register of `n` qubits.
fn valid_gate(n: u32) -> impl Strategy<Value = Gate> {
    let single = (0..n, 0usize..4, -10.0f64..10.0).prop_map(|(q, which, angle)| match which {
        0 => Gate::new(GateKind::H, [q]),
        1 => Gate::new(GateKind::X, [q]),
        2 => Gate::rotation(GateKind::Rz, q, angle),
        _ => Gate::rotation(GateKind::Ry, q, angle),
    });

    if n < 2 {
        return single.boxed();
    }

    let pair = (0..n, 1..n, any::<bool>()).prop_map(move |(a, offset, cz)| {
        let b = (a + offset) % n;
        let kind = if cz { GateKind::CZ } else { GateKind::CX };
        Gate::new(kind, [a, b])
    });

    prop_oneof![single, pair].boxed()
}

fn valid_circuit() -> impl Strategy<Value = Circuit> {
    (1u32..8).prop_flat_map(|n| {
        prop::collection::vec(valid_gate(n), 0..32).prop_map(move |gates| Circuit {
            num_qubits: n,
            gates,
        })
    })
}

proptest! {
    #[test]
    fn valid_circuits_are_accepted(circuit in valid_circuit()) {
        prop_assert!(circuit.validate().is_ok());
    }

    #[test]
    fn out_of_range_index_is_rejected(
        circuit in valid_circuit(),
        excess in 0u32..100,
        position in any::<prop::sample::Index>(),
    ) {
        let mut circuit = circuit;
        let bad = circuit.num_qubits + excess;
        let gate = Gate::new(GateKind::H, [bad]);
        let at = position.index(circuit.gates.len() + 1);
        circuit.gates.insert(at, gate);

        let err = circuit.validate().unwrap_err();
        prop_assert_eq!(err.gate, Some(at));
    }

    #[test]
    fn json_round_trip_keeps_validity(circuit in valid_circuit()) {
        let json = circuit.to_json().unwrap();
        let parsed = Circuit::from_json(&json).unwrap();
        prop_assert!(parsed.validate().is_ok());
        prop_assert_eq!(parsed.gates.len(), circuit.gates.len());
    }
}

#[test]
fn swap_scenario_is_a_validation_error() {
    let json = r#"{"num_qubits": 2, "gates": [{"type": "swap", "qubits": [0, 1]}]}"#;
    let circuit = Circuit::from_json(json).unwrap();
    assert!(circuit.validate().is_err());
}
