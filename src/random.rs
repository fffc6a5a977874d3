//! Random sampling helpers shared by trait allocation and reproduction.

use rand::Rng;
use std::f64::consts::PI;

/// Sample a value in `[min, max]` from a normal distribution centred on the
/// midpoint with standard deviation `(max - min) / 6`.
///
/// Uses the Box-Muller transform and clamps the result into the range, so
/// values cluster around the middle and the edges stay rare.
pub fn normal_in_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let range = max - min;
    // 1 - [0, 1) keeps u1 away from zero for the logarithm
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = 1.0 - rng.gen::<f64>();
    let std_dev = range / 6.0;
    let mean = min + range / 2.0;

    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    let value = mean + z0 * std_dev;

    value.max(min).min(max)
}

/// Uniformly random unit-length heading
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let angle = rng.gen_range(0.0..(2.0 * PI));
    (angle.cos(), angle.sin())
}
