//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use qbridge_hal::NativeOp;

/// A statevector representing a quantum state.
///
/// Basis index bit `k` is the value of qubit `k`.
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Apply a native operation. Returns `false` for names the engine does
    /// not implement, leaving the state untouched.
    pub fn apply(&mut self, op: &NativeOp) -> bool {
        let qubit = |i: usize| op.qubits.get(i).map(|&q| q as usize);
        let angle = op.params.first().copied();
        match (op.name.as_str(), qubit(0), qubit(1), angle) {
            ("h", Some(t), _, _) => self.apply_h(t),
            ("x", Some(t), _, _) => self.apply_x(t),
            ("cx", Some(c), Some(t), _) => self.apply_cx(c, t),
            ("cz", Some(c), Some(t), _) => self.apply_cz(c, t),
            ("rz", Some(t), _, Some(theta)) => self.apply_rz(t, theta),
            ("ry", Some(t), _, Some(theta)) => self.apply_ry(t, theta),
            _ => return false,
        }
        true
    }

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = std::f64::consts::FRAC_1_SQRT_2;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let both = (1 << control) | (1 << target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & both == both {
                *amp = -*amp;
            }
        }
    }

    /// Measurement probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Convert a basis index to a bitstring, qubit 0 rightmost.
    pub fn outcome_to_bitstring(&self, outcome: usize) -> String {
        format!("{:0width$b}", outcome, width = self.num_qubits)
    }
}

/// Samples basis states from a fixed distribution.
pub struct Sampler {
    cumulative: Vec<f64>,
}

impl Sampler {
    /// Build a sampler over `probabilities`.
    pub fn new(probabilities: &[f64]) -> Self {
        let mut total = 0.0;
        let cumulative = probabilities
            .iter()
            .map(|p| {
                total += p;
                total
            })
            .collect();
        Self { cumulative }
    }

    /// Draw one basis index.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let total = self.cumulative.last().copied().unwrap_or(0.0);
        let r: f64 = rng.r#gen::<f64>() * total;
        // First index whose cumulative weight exceeds r; zero-probability
        // states share the previous cumulative value and are never chosen.
        let idx = self.cumulative.partition_point(|&c| c <= r);
        idx.min(self.cumulative.len().saturating_sub(1))
    }
}
