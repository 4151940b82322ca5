//! OpenQASM 3.0 emission for the Sampler primitive.

use qbridge_hal::NativeOp;

/// Emit a program applying `ops` to a `num_qubits` register, followed by a
/// full-register measurement into `c`.
///
/// Angles are written with shortest round-trip formatting so the program
/// carries exactly the source values.
pub fn emit(num_qubits: u32, ops: &[NativeOp]) -> String {
    let mut emitter = Emitter::default();
    emitter.writeln("OPENQASM 3.0;");
    emitter.writeln("include \"stdgates.inc\";");
    emitter.writeln("");
    emitter.writeln(&format!("qubit[{num_qubits}] q;"));
    emitter.writeln(&format!("bit[{num_qubits}] c;"));
    emitter.writeln("");

    for op in ops {
        emitter.emit_op(op);
    }

    emitter.writeln("c = measure q;");
    emitter.output
}

#[derive(Default)]
struct Emitter {
    output: String,
}

impl Emitter {
    fn emit_op(&mut self, op: &NativeOp) {
        let qubits = op
            .qubits
            .iter()
            .map(|q| format!("q[{q}]"))
            .collect::<Vec<_>>()
            .join(", ");

        if op.params.is_empty() {
            self.writeln(&format!("{} {qubits};", op.name));
        } else {
            let params = op
                .params
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            self.writeln(&format!("{}({params}) {qubits};", op.name));
        }
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}
