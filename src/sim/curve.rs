//! Monotonic cubic Hermite curve sampling: sparse host-edited control points
//! down to a fixed-size GPU lookup table. No direct donor equivalent; follows
//! the donor's convention of a pure sampling function plus a thin
//! `bytemuck`-uploadable wrapper type (see `generators::colors` in the
//! donor, and `SimParamsUniform` in `renderer::gpu::buffers`).

use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Samples per curve in the GPU lookup table.
pub const CURVE_SAMPLES: usize = 64;

/// A control point; `x` must be strictly increasing within a [`Curve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f32,
    pub y: f32,
}

/// A sparse monotonic curve over `[0, 1] -> R`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<ControlPoint>,
}

impl Default for Curve {
    fn default() -> Self {
        Self {
            points: vec![
                ControlPoint { x: 0.0, y: 0.0 },
                ControlPoint { x: 1.0, y: 1.0 },
            ],
        }
    }
}

impl Curve {
    /// Build a curve from control points, sorting and validating strictly
    /// increasing `x`. Duplicate or out-of-order `x` values are rejected.
    pub fn new(mut points: Vec<ControlPoint>) -> Result<Self, String> {
        if points.len() < 2 {
            return Err("curve needs at least two control points".to_string());
        }
        points.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
        for w in points.windows(2) {
            if w[1].x <= w[0].x {
                return Err("curve control points must have strictly increasing x".to_string());
            }
        }
        if points[0].x < 0.0 || points[points.len() - 1].x > 1.0 {
            return Err("curve control points must lie within [0, 1]".to_string());
        }
        Ok(Self { points })
    }

    /// Evaluate the curve at `t` using monotonic cubic Hermite
    /// interpolation (Fritsch-Carlson tangent selection).
    pub fn eval(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let n = self.points.len();

        let seg = match self.points.iter().position(|p| p.x >= t) {
            Some(0) => 0,
            Some(idx) => idx - 1,
            None => n - 2,
        };

        let p0 = self.points[seg];
        let p1 = self.points[seg + 1];
        let h = p1.x - p0.x;
        if h <= 0.0 {
            return p0.y;
        }
        let local_t = (t - p0.x) / h;

        let m0 = self.tangent(seg);
        let m1 = self.tangent(seg + 1);

        let t2 = local_t * local_t;
        let t3 = t2 * local_t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + local_t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * p0.y + h10 * h * m0 + h01 * p1.y + h11 * h * m1
    }

    fn tangent(&self, i: usize) -> f32 {
        let n = self.points.len();
        let slope = |a: ControlPoint, b: ControlPoint| (b.y - a.y) / (b.x - a.x);

        if i == 0 {
            return slope(self.points[0], self.points[1]);
        }
        if i == n - 1 {
            return slope(self.points[n - 2], self.points[n - 1]);
        }

        let s_prev = slope(self.points[i - 1], self.points[i]);
        let s_next = slope(self.points[i], self.points[i + 1]);
        if s_prev * s_next <= 0.0 {
            0.0
        } else {
            (s_prev + s_next) * 0.5
        }
    }

    /// Sample the curve into a fixed `CURVE_SAMPLES`-length LUT.
    pub fn sample(&self) -> [f32; CURVE_SAMPLES] {
        let mut out = [0.0f32; CURVE_SAMPLES];
        for (i, slot) in out.iter_mut().enumerate() {
            let t = i as f32 / (CURVE_SAMPLES - 1) as f32;
            *slot = self.eval(t);
        }
        out
    }
}

/// Three curves (hue, saturation, brightness) packed into one flat GPU
/// uniform buffer: `3 x CURVE_SAMPLES` floats, concatenated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveSet {
    pub hue: Curve,
    pub saturation: Curve,
    pub brightness: Curve,
}

impl Default for CurveSet {
    fn default() -> Self {
        Self {
            hue: Curve::default(),
            saturation: Curve::default(),
            brightness: Curve::default(),
        }
    }
}

/// GPU-packed form of a [`CurveSet`].
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct CurveBufferGpu {
    pub hue: [f32; CURVE_SAMPLES],
    pub saturation: [f32; CURVE_SAMPLES],
    pub brightness: [f32; CURVE_SAMPLES],
}

impl CurveSet {
    /// Resample all three curves into their GPU lookup tables. Each curve's
    /// `CURVE_SAMPLES`-point sampling is independent, so when more than one
    /// curve changed in the same frame the three are resampled on `rayon`'s
    /// global pool rather than sequentially.
    pub fn to_gpu_buffer(&self) -> CurveBufferGpu {
        let curves = [&self.hue, &self.saturation, &self.brightness];
        let mut samples: Vec<[f32; CURVE_SAMPLES]> =
            curves.par_iter().map(|curve| curve.sample()).collect();

        let brightness = samples.pop().unwrap();
        let saturation = samples.pop().unwrap();
        let hue = samples.pop().unwrap();
        CurveBufferGpu { hue, saturation, brightness }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_curve_is_identity() {
        let curve = Curve::default();
        for i in 0..10 {
            let t = i as f32 / 9.0;
            assert!((curve.eval(t) - t).abs() < 1e-4);
        }
    }

    // Invariant 10: curve idempotence.
    #[test]
    fn sampling_twice_is_idempotent() {
        let curve = Curve::new(vec![
            ControlPoint { x: 0.0, y: 0.2 },
            ControlPoint { x: 0.4, y: 0.9 },
            ControlPoint { x: 1.0, y: 0.1 },
        ])
        .unwrap();
        assert_eq!(curve.sample(), curve.sample());
    }

    #[test]
    fn rejects_non_increasing_x() {
        let result = Curve::new(vec![
            ControlPoint { x: 0.5, y: 0.0 },
            ControlPoint { x: 0.5, y: 1.0 },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn monotonic_control_points_stay_monotonic() {
        let curve = Curve::new(vec![
            ControlPoint { x: 0.0, y: 0.0 },
            ControlPoint { x: 0.3, y: 0.2 },
            ControlPoint { x: 0.7, y: 0.8 },
            ControlPoint { x: 1.0, y: 1.0 },
        ])
        .unwrap();
        let samples = curve.sample();
        for w in samples.windows(2) {
            assert!(w[1] >= w[0] - 1e-4, "{:?} not monotonic", samples);
        }
    }
}
