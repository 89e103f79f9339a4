//! Digital filters for recording cleanup
//!
//! Provides Butterworth high-pass design as a cascade of second-order
//! sections and zero-phase (forward-backward) filtering over whole signals.

use std::f64::consts::PI;

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;

use crate::error::{CoreError, CoreResult};

/// Biquad filter coefficients (second-order section)
///
/// A first-order section is stored with `b[2] == a[2] == 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoeffs {
    /// Numerator coefficients [b0, b1, b2]
    pub b: [f64; 3],
    /// Denominator coefficients [a0=1, a1, a2]
    pub a: [f64; 3],
}

impl BiquadCoeffs {
    /// Gain at DC (z = 1)
    #[must_use]
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    /// Filter state reached after a long run of unit input.
    #[must_use]
    pub fn steady_state(&self) -> [f64; 2] {
        let y = self.dc_gain();
        let z1 = self.b[2] - self.a[2] * y;
        let z0 = self.b[1] - self.a[1] * y + z1;
        [z0, z1]
    }

    /// Complex response at `z^-1 = w`.
    fn response(&self, w: Complex64) -> Complex64 {
        let num = self.b[0] + w * (self.b[1] + w * self.b[2]);
        let den = self.a[0] + w * (self.a[1] + w * self.a[2]);
        num / den
    }
}

/// Second-order section in transposed direct form II
#[derive(Clone, Debug)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    /// State: [z1, z2]
    state: [f64; 2],
}

impl Biquad {
    /// Create a section with zero state
    #[must_use]
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self { coeffs, state: [0.0, 0.0] }
    }

    /// Create a section with a given initial state
    #[must_use]
    pub fn with_state(coeffs: BiquadCoeffs, state: [f64; 2]) -> Self {
        Self { coeffs, state }
    }

    /// Process a single sample
    pub fn filter(&mut self, input: f64) -> f64 {
        let BiquadCoeffs { b, a } = self.coeffs;
        let output = b[0] * input + self.state[0];
        self.state[0] = b[1] * input - a[1] * output + self.state[1];
        self.state[1] = b[2] * input - a[2] * output;
        output
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.state = [0.0, 0.0];
    }
}

/// Butterworth high-pass filter as cascaded sections.
#[derive(Clone, Debug)]
pub struct ButterworthHighpass {
    order: usize,
    cutoff_hz: f64,
    sample_rate_hz: f64,
    sections: Vec<BiquadCoeffs>,
}

impl ButterworthHighpass {
    /// Design a high-pass filter.
    ///
    /// # Arguments
    ///
    /// * `order` - Filter order (number of poles)
    /// * `cutoff_hz` - -3 dB frequency
    /// * `sample_rate_hz` - Sampling frequency
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidParameter`] if the order is zero or the
    /// cutoff is not strictly between 0 and Nyquist.
    pub fn new(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> CoreResult<Self> {
        if order == 0 {
            return Err(CoreError::InvalidParameter {
                parameter: "order",
                reason: "filter order must be at least 1".into(),
            });
        }
        let nyquist = 0.5 * sample_rate_hz;
        if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
            return Err(CoreError::InvalidParameter {
                parameter: "cutoff_hz",
                reason: format!("cutoff {cutoff_hz} Hz must lie in (0, {nyquist}) Hz"),
            });
        }

        // Pre-warp the normalized cutoff for the bilinear transform (fs = 2)
        let normalized = cutoff_hz / nyquist;
        let warped = 4.0 * (PI * normalized / 2.0).tan();
        let bilinear = |s: Complex64| (4.0 + s) / (4.0 - s);

        let mut sections = Vec::with_capacity(order.div_ceil(2));

        // One pole of each conjugate pair of the analog low-pass prototype
        for k in 0..order / 2 {
            let m = (order - 1 - 2 * k) as f64;
            let prototype = -Complex64::from_polar(1.0, PI * m / (2 * order) as f64);
            let pole = bilinear(warped / prototype);

            let a1 = -2.0 * pole.re;
            let a2 = pole.norm_sqr();
            let gain = (1.0 - a1 + a2) / 4.0;
            sections.push(BiquadCoeffs {
                b: [gain, -2.0 * gain, gain],
                a: [1.0, a1, a2],
            });
        }

        if order % 2 == 1 {
            let pole = bilinear(Complex64::new(-warped, 0.0)).re;
            let gain = (1.0 + pole) / 2.0;
            sections.push(BiquadCoeffs {
                b: [gain, -gain, 0.0],
                a: [1.0, -pole, 0.0],
            });
        }

        Ok(Self { order, cutoff_hz, sample_rate_hz, sections })
    }

    /// Filter order
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Cutoff frequency in Hz
    #[must_use]
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    /// Sample rate in Hz
    #[must_use]
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Second-order sections of the cascade
    #[must_use]
    pub fn sections(&self) -> &[BiquadCoeffs] {
        &self.sections
    }

    /// Samples of odd-extension padding used by [`Self::filtfilt`].
    ///
    /// Three times the length of the equivalent transfer-function
    /// polynomials.
    #[must_use]
    pub fn pad_len(&self) -> usize {
        3 * (self.order + 1)
    }

    /// Magnitude of the frequency response at `freq_hz`
    #[must_use]
    pub fn magnitude(&self, freq_hz: f64) -> f64 {
        let w = Complex64::from_polar(1.0, -2.0 * PI * freq_hz / self.sample_rate_hz);
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(w))
            .norm()
    }

    /// Per-section initial states for a unit step, scaled through the
    /// cascade by each preceding section's DC gain.
    fn initial_states(&self) -> Vec<[f64; 2]> {
        let mut scale = 1.0;
        self.sections
            .iter()
            .map(|s| {
                let [z0, z1] = s.steady_state();
                let state = [z0 * scale, z1 * scale];
                scale *= s.dc_gain();
                state
            })
            .collect()
    }

    /// Run the cascade once over `signal`, starting from the steady state
    /// for a constant input equal to the first sample.
    fn run_cascade(&self, signal: &mut [f64], states: &[[f64; 2]]) {
        let Some(&x0) = signal.first() else {
            return;
        };
        let mut cascade: Vec<Biquad> = self
            .sections
            .iter()
            .zip(states)
            .map(|(&c, &[z0, z1])| Biquad::with_state(c, [z0 * x0, z1 * x0]))
            .collect();

        for sample in signal.iter_mut() {
            *sample = cascade.iter_mut().fold(*sample, |x, section| section.filter(x));
        }
    }

    /// Zero-phase filtering: forward pass, then backward pass.
    ///
    /// The signal is padded at both ends with its odd extension of
    /// [`Self::pad_len`] samples; the padding is removed afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SignalTooShort`] if the signal is not longer
    /// than the padding.
    pub fn filtfilt(&self, signal: ArrayView1<'_, f64>) -> CoreResult<Array1<f64>> {
        let n = signal.len();
        let edge = self.pad_len();
        if n <= edge {
            return Err(CoreError::SignalTooShort { got: n, need: edge });
        }

        let first = signal[0];
        let last = signal[n - 1];
        let mut extended = Vec::with_capacity(n + 2 * edge);
        extended.extend((1..=edge).rev().map(|i| 2.0 * first - signal[i]));
        extended.extend(signal.iter().copied());
        extended.extend((1..=edge).map(|i| 2.0 * last - signal[n - 1 - i]));

        let states = self.initial_states();
        self.run_cascade(&mut extended, &states);
        extended.reverse();
        self.run_cascade(&mut extended, &states);
        extended.reverse();

        Ok(Array1::from(extended[edge..edge + n].to_vec()))
    }
}
