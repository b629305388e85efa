//! Savitzky-Golay Filter
//!
//! Least-squares polynomial smoothing and differentiation over a sliding
//! window. Interior samples use the centred kernel; the first and last
//! `window / 2` samples are evaluated on a polynomial fitted to the first
//! (or last) full window, so the output has the same length as the input
//! and no missing values.

use nalgebra::DMatrix;

use crate::{Error, Result};

/// Savitzky-Golay filter with unit sample spacing
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window: usize,
    order: usize,
    deriv: usize,
}

impl SavitzkyGolay {
    /// Create a smoothing filter.
    ///
    /// `window` must be odd and strictly greater than `order`.
    pub fn new(window: usize, order: usize) -> Result<Self> {
        if window == 0 || window % 2 == 0 {
            return Err(Error::Config(format!(
                "Savitzky-Golay window must be a positive odd number, got {}", window
            )));
        }
        if order >= window {
            return Err(Error::Config(format!(
                "Savitzky-Golay order ({}) must be less than window ({})", order, window
            )));
        }
        Ok(Self { window, order, deriv: 0 })
    }

    /// Evaluate the `deriv`-th derivative instead of the smoothed value
    pub fn derivative(mut self, deriv: usize) -> Self {
        self.deriv = deriv;
        self
    }

    /// Filter a signal.
    ///
    /// Fails with a configuration error when the window is longer than the
    /// signal.
    pub fn apply(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let n = signal.len();
        if self.window > n {
            return Err(Error::Config(format!(
                "Savitzky-Golay window ({}) exceeds signal length ({})", self.window, n
            )));
        }

        let half = self.window / 2;
        let projection = self.projection()?;
        let interior = self.kernel(&projection, 0.0);

        let mut output = Vec::with_capacity(n);
        for i in 0..n {
            let (start, position) = if i < half {
                (0, i as f64 - half as f64)
            } else if i + half >= n {
                let start = n - self.window;
                (start, (i - start) as f64 - half as f64)
            } else {
                (i - half, 0.0)
            };

            let window = &signal[start..start + self.window];
            let value = if position == 0.0 {
                dot(&interior, window)
            } else {
                dot(&self.kernel(&projection, position), window)
            };
            output.push(value);
        }

        Ok(output)
    }

    /// `(AᵀA)⁻¹Aᵀ` for the Vandermonde matrix of the centred window positions
    fn projection(&self) -> Result<DMatrix<f64>> {
        let half = (self.window / 2) as f64;
        let a = DMatrix::from_fn(self.window, self.order + 1, |row, col| {
            (row as f64 - half).powi(col as i32)
        });
        let normal = a.transpose() * &a;
        let inverse = normal.try_inverse().ok_or_else(|| {
            Error::Config(format!(
                "Savitzky-Golay system is singular (window {}, order {})",
                self.window, self.order
            ))
        })?;
        Ok(inverse * a.transpose())
    }

    /// Weights that evaluate the fitted polynomial (or its derivative) at
    /// `position`, measured from the window centre
    fn kernel(&self, projection: &DMatrix<f64>, position: f64) -> Vec<f64> {
        let mut basis = vec![0.0; self.order + 1];
        for (k, b) in basis.iter_mut().enumerate().skip(self.deriv) {
            let falling: f64 = ((k - self.deriv + 1)..=k).map(|v| v as f64).product();
            *b = falling * position.powi((k - self.deriv) as i32);
        }

        (0..self.window)
            .map(|j| {
                basis
                    .iter()
                    .enumerate()
                    .map(|(k, b)| b * projection[(k, j)])
                    .sum()
            })
            .collect()
    }
}

fn dot(weights: &[f64], values: &[f64]) -> f64 {
    weights.iter().zip(values).map(|(w, v)| w * v).sum()
}
