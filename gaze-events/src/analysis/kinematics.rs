//! Angular Kinematics
//!
//! Projects pixel coordinates onto visual angles and derives angular
//! velocity and acceleration. Velocity is displacement divided by the
//! inter-sample time; displacement is either a plain finite difference or
//! the first derivative of a Savitzky-Golay filter. Degenerate arithmetic
//! (`NaN`, `±inf`, typically from a zero time delta) is rewritten to 0.

use tracing::debug;

use crate::app::config::{CommonConfig, VelocityConfig, VelocityType};
use crate::signal::savgol::SavitzkyGolay;
use crate::types::Sample;
use crate::{Error, Result};

/// Polynomial order of the analytical velocity filter
pub const ANALYTICAL_ORDER: usize = 2;

/// Pinhole projection from screen pixels to visual angle (degrees)
#[derive(Debug, Clone, Copy)]
pub struct VisualAngleProjection {
    /// Reference pixel (calibration point)
    pub reference: (f64, f64),
    /// Eye-to-screen distance expressed in pixels, per axis
    pub distance_px: (f64, f64),
}

impl VisualAngleProjection {
    pub fn from_config(common: &CommonConfig) -> Self {
        let [width, height] = common.size;
        let [res_x, res_y] = common.resolution;
        let reference = match common.reference_point {
            Some([x, y]) => (x, y),
            None => (res_x / 2.0, res_y / 2.0),
        };
        Self {
            reference,
            distance_px: (common.distance * res_x / width, common.distance * res_y / height),
        }
    }

    /// Visual angle of a pixel position
    pub fn project(&self, x: f64, y: f64) -> (f64, f64) {
        (
            ((x - self.reference.0) / self.distance_px.0).atan().to_degrees(),
            ((y - self.reference.1) / self.distance_px.1).atan().to_degrees(),
        )
    }
}

/// Replace `NaN` and infinities with 0
fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Angular coordinate, velocity and acceleration stage
pub struct AngularKinematics {
    projection: VisualAngleProjection,
    velocity_type: VelocityType,
    window: usize,
}

impl AngularKinematics {
    pub fn new(common: &CommonConfig, velocity: &VelocityConfig) -> Self {
        Self {
            projection: VisualAngleProjection::from_config(common),
            velocity_type: velocity.velocity_type,
            window: velocity.window,
        }
    }

    /// Fill angular coordinates, velocity and acceleration on every sample
    pub fn apply(&self, samples: &mut [Sample]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let angles: Vec<(f64, f64)> = samples
            .iter()
            .map(|s| self.projection.project(s.x, s.y))
            .collect();
        let displacement = self.displacements(&angles)?;

        // Raw velocity keeps NaN/inf so acceleration sees the same gaps
        let velocity: Vec<f64> = (0..samples.len())
            .map(|i| {
                let dt = if i == 0 { f64::NAN } else { samples[i].time - samples[i - 1].time };
                displacement[i] / dt
            })
            .collect();

        for i in 0..samples.len() {
            let acceleration = if i == 0 {
                f64::NAN
            } else {
                (velocity[i] - velocity[i - 1]) / (samples[i].time - samples[i - 1].time)
            };

            let s = &mut samples[i];
            s.angular_x = Some(angles[i].0);
            s.angular_y = Some(angles[i].1);
            s.angular_velocity = Some(sanitize(velocity[i]));
            s.angular_acceleration = Some(sanitize(acceleration));
        }

        let peak = samples.iter().map(Sample::velocity).fold(0.0, f64::max);
        debug!(
            samples = samples.len(),
            velocity_type = ?self.velocity_type,
            peak_velocity = peak,
            "Computed angular kinematics"
        );

        Ok(())
    }

    /// Angular displacement per sample (`NaN` where undefined)
    fn displacements(&self, angles: &[(f64, f64)]) -> Result<Vec<f64>> {
        match self.velocity_type {
            VelocityType::FiniteDifference => Ok(std::iter::once(f64::NAN)
                .chain(angles.windows(2).map(|w| {
                    let dx = w[1].0 - w[0].0;
                    let dy = w[1].1 - w[0].1;
                    (dx * dx + dy * dy).sqrt()
                }))
                .collect()),
            VelocityType::Analytical => {
                if self.window > angles.len() {
                    return Err(Error::Config(format!(
                        "velocity window ({}) exceeds sequence length ({})",
                        self.window,
                        angles.len()
                    )));
                }
                let filter = SavitzkyGolay::new(self.window, ANALYTICAL_ORDER)?.derivative(1);
                let xs: Vec<f64> = angles.iter().map(|a| a.0).collect();
                let ys: Vec<f64> = angles.iter().map(|a| a.1).collect();
                let dx = filter.apply(&xs)?;
                let dy = filter.apply(&ys)?;
                Ok(dx.iter().zip(&dy).map(|(a, b)| (a * a + b * b).sqrt()).collect())
            }
        }
    }
}
