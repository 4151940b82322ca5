//! qbridge Circuit Intermediate Representation
//!
//! The vendor-neutral circuit description accepted by the bridge. A
//! [`Circuit`] is a qubit count plus an ordered list of [`Gate`]s; every
//! provider adapter translates from this form into its own wire format.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qbridge_ir::Circuit;
//!
//! let mut circuit = Circuit::new(2);
//! circuit.h(0).cx(0, 1);
//!
//! assert!(circuit.validate().is_ok());
//! assert_eq!(circuit, Circuit::bell());
//! ```
//!
//! # JSON wire format
//!
//! ```rust
//! use qbridge_ir::{Circuit, GateKind};
//!
//! let json = r#"{"num_qubits": 1, "gates": [{"type": "ry", "qubits": [0], "angle": 0.5}]}"#;
//! let circuit = Circuit::from_json(json).unwrap();
//! assert_eq!(circuit.gates[0].kind, GateKind::Ry);
//! ```
//!
//! Unknown gate names survive parsing as [`GateKind::Custom`] and are
//! rejected by [`validate`].
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Angle |
//! |------|--------|-------|
//! | `h` | 1 | no |
//! | `x` | 1 | no |
//! | `rz` | 1 | yes |
//! | `ry` | 1 | yes |
//! | `cx` | 2 (control, target) | no |
//! | `cz` | 2 | no |

pub mod circuit;
pub mod error;
pub mod gate;

pub use circuit::{Circuit, validate};
pub use error::{IrError, IrResult, ValidationError};
pub use gate::{Gate, GateKind};
