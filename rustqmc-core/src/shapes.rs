//! Cheap 2-D test integrands with analytically known integrals over
//! the unit square. Deviation of a Monte-Carlo estimate from the known
//! value is then attributable to sampling pattern quality alone, which
//! is what the optimiser scores.

use std::f32::consts::{FRAC_PI_4, PI};

use rng::RNG;

/// A test integrand over [0, 1)^2 with a known reference value.
pub trait Shape {
    fn evaluate(&self, x: f32, y: f32) -> f32;
    fn integral(&self) -> f32;
}

/// Quarter disk centred on the origin, area one half.
#[derive(Debug, Copy, Clone)]
pub struct QuarterDisk;

impl Shape for QuarterDisk {
    fn evaluate(&self, x: f32, y: f32) -> f32 {
        if x * x + y * y < 2.0 / PI {
            1.0
        } else {
            0.0
        }
    }

    fn integral(&self) -> f32 {
        0.5
    }
}

/// Disk centred in the middle of the domain, area one half.
#[derive(Debug, Copy, Clone)]
pub struct FullDisk;

impl Shape for FullDisk {
    fn evaluate(&self, x: f32, y: f32) -> f32 {
        let x = x - 0.5;
        let y = y - 0.5;

        if x * x + y * y < 1.0 / (2.0 * PI) {
            1.0
        } else {
            0.0
        }
    }

    fn integral(&self) -> f32 {
        0.5
    }
}

/// Gaussian falloff from the origin. The optimiser's reference
/// integrand: smooth, cheap, and sensitive to stratification quality.
#[derive(Debug, Copy, Clone)]
pub struct QuarterGaussian;

impl Shape for QuarterGaussian {
    fn evaluate(&self, x: f32, y: f32) -> f32 {
        (-(x * x + y * y)).exp()
    }

    fn integral(&self) -> f32 {
        FRAC_PI_4 * erf(1.0).powi(2)
    }
}

/// Gaussian falloff from the centre of the domain.
#[derive(Debug, Copy, Clone)]
pub struct FullGaussian;

impl Shape for FullGaussian {
    fn evaluate(&self, x: f32, y: f32) -> f32 {
        let x = x - 0.5;
        let y = y - 0.5;

        (-(x * x + y * y)).exp()
    }

    fn integral(&self) -> f32 {
        PI * erf(0.5).powi(2)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Bilinear;

impl Shape for Bilinear {
    fn evaluate(&self, x: f32, y: f32) -> f32 {
        x * y
    }

    fn integral(&self) -> f32 {
        0.25
    }
}

#[derive(Debug, Copy, Clone)]
pub struct LinearX;

impl Shape for LinearX {
    fn evaluate(&self, x: f32, _y: f32) -> f32 {
        x
    }

    fn integral(&self) -> f32 {
        0.5
    }
}

#[derive(Debug, Copy, Clone)]
pub struct LinearY;

impl Shape for LinearY {
    fn evaluate(&self, _x: f32, y: f32) -> f32 {
        y
    }

    fn integral(&self) -> f32 {
        0.5
    }
}

/// A randomly oriented and positioned step function. A bank of these
/// gives each pixel an error signature that discriminates between
/// scramble parameters much better than a single smooth integrand.
#[derive(Debug, Copy, Clone)]
pub struct OrientedHeaviside {
    pos: (f32, f32),
    normal: (f32, f32),
}

impl OrientedHeaviside {
    pub fn new(orientation: f32, x: f32, y: f32) -> OrientedHeaviside {
        let theta = 2.0 * PI * orientation;

        OrientedHeaviside {
            pos: (x, y),
            normal: (theta.cos(), theta.sin()),
        }
    }

    /// Deterministic bank of heavisides. The fixed seed keeps the
    /// optimisation objective reproducible between runs.
    pub fn build(size: usize) -> Vec<OrientedHeaviside> {
        let mut rng = RNG::with_seed(12345);

        (0..size)
            .map(|_| {
                let orientation = rng.uniform_f32();
                let x = rng.uniform_f32();
                let y = rng.uniform_f32();
                OrientedHeaviside::new(orientation, x, y)
            })
            .collect()
    }
}

impl Shape for OrientedHeaviside {
    fn evaluate(&self, x: f32, y: f32) -> f32 {
        let x = x - self.pos.0;
        let y = y - self.pos.1;

        if x * self.normal.0 + y * self.normal.1 < 0.0 {
            1.0
        } else {
            0.0
        }
    }

    /// Exact covered area of the half plane clipped to the unit
    /// square, by case analysis on which edges the boundary line
    /// crosses.
    fn integral(&self) -> f32 {
        let (nx, ny) = self.normal;

        // A horizontal normal makes the boundary vertical, which the
        // slope-intercept cases below cannot represent.
        if ny == 0.0 {
            let covered = self.pos.0.max(0.0).min(1.0);
            return if nx > 0.0 { covered } else { 1.0 - covered };
        }

        let line = SlopeIntercept::new(self);

        let x0 = line.inverse(0.0);
        let x1 = line.inverse(1.0);
        let y0 = line.forward(0.0);
        let y1 = line.forward(1.0);

        let in_segment = |t: f32| t >= 0.0 && t < 1.0;
        let triangle = |a: f32, b: f32| a * b / 2.0;
        let trapezoid = |a: f32, h1: f32, h2: f32| a * (h1 + h2) / 2.0;

        if in_segment(x0) && in_segment(x1) {
            let area = trapezoid(1.0, x0, x1);
            return if nx < 0.0 { 1.0 - area } else { area };
        }

        if in_segment(y0) && in_segment(y1) {
            let area = trapezoid(1.0, y0, y1);
            return if ny < 0.0 { 1.0 - area } else { area };
        }

        if in_segment(x0) && in_segment(y0) {
            let area = triangle(x0, y0);
            return if nx < 0.0 || ny < 0.0 { 1.0 - area } else { area };
        }

        if in_segment(x1) && in_segment(y1) {
            let area = triangle(1.0 - x1, 1.0 - y1);
            return if nx > 0.0 || ny > 0.0 { 1.0 - area } else { area };
        }

        if in_segment(x0) && in_segment(y1) {
            let area = triangle(1.0 - x0, y1);
            return if nx > 0.0 || ny < 0.0 { 1.0 - area } else { area };
        }

        if in_segment(x1) && in_segment(y0) {
            let area = triangle(x1, 1.0 - y0);
            return if nx < 0.0 || ny > 0.0 { 1.0 - area } else { area };
        }

        0.0
    }
}

/// Boundary line of a heaviside in slope-intercept form.
struct SlopeIntercept {
    a: f32,
    b: f32,
}

impl SlopeIntercept {
    fn new(heaviside: &OrientedHeaviside) -> SlopeIntercept {
        let (nx, ny) = heaviside.normal;
        // Orthogonal to the normal, so along the boundary line.
        let a = nx / -ny;
        let b = a * -heaviside.pos.0 + heaviside.pos.1;

        SlopeIntercept {
            a,
            b,
        }
    }

    fn forward(&self, x: f32) -> f32 {
        self.a * x + self.b
    }

    fn inverse(&self, y: f32) -> f32 {
        (y - self.b) / self.a
    }
}

/// Abramowitz and Stegun 7.1.26 approximation, accurate to 1.5e-7.
/// Only used for the gaussian reference integrals.
fn erf(x: f32) -> f32 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs() as f64;

    let t = 1.0 / (1.0 + 0.3275911 * x);
    let y = 1.0
        - (((((1.061405429 * t - 1.453152027) * t) + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-x * x).exp();

    sign * y as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force<S: Shape>(shape: &S, n: u32) -> f32 {
        let mut rng = StdRng::seed_from_u64(987);
        let mut mean = 0.0;
        for i in 0..n {
            let v = shape.evaluate(rng.gen(), rng.gen());
            mean += (v - mean) / (i + 1) as f32;
        }
        mean
    }

    #[test]
    fn disk_integrals() {
        assert_relative_eq!(brute_force(&QuarterDisk, 200_000), 0.5, epsilon = 5e-3);
        assert_relative_eq!(brute_force(&FullDisk, 200_000), 0.5, epsilon = 5e-3);
    }

    #[test]
    fn gaussian_integrals() {
        let q = QuarterGaussian;
        assert_relative_eq!(brute_force(&q, 200_000), q.integral(), epsilon = 5e-3);
        let f = FullGaussian;
        assert_relative_eq!(brute_force(&f, 200_000), f.integral(), epsilon = 5e-3);
    }

    #[test]
    fn linear_integrals() {
        assert_eq!(Bilinear.integral(), 0.25);
        assert_relative_eq!(brute_force(&Bilinear, 100_000), 0.25, epsilon = 5e-3);
        assert_relative_eq!(brute_force(&LinearX, 100_000), 0.5, epsilon = 5e-3);
        assert_relative_eq!(brute_force(&LinearY, 100_000), 0.5, epsilon = 5e-3);
    }

    #[test]
    fn heaviside_integral_matches_brute_force() {
        for heaviside in OrientedHeaviside::build(16) {
            let expected = heaviside.integral();
            let actual = brute_force(&heaviside, 200_000);
            assert_relative_eq!(expected, actual, epsilon = 1e-2);
        }
    }

    #[test]
    fn horizontal_normals_split_the_square_vertically() {
        // Orientation zero gives the exactly axis-aligned normal (1, 0),
        // so the boundary line is vertical.
        let heaviside = OrientedHeaviside::new(0.0, 0.3, 0.7);
        assert_relative_eq!(heaviside.integral(), 0.3, epsilon = 1e-6);
        assert_relative_eq!(
            brute_force(&heaviside, 200_000),
            heaviside.integral(),
            epsilon = 1e-2
        );

        // A boundary outside the square covers all of it or none.
        assert_eq!(OrientedHeaviside::new(0.0, 1.5, 0.5).integral(), 1.0);
        assert_eq!(OrientedHeaviside::new(0.0, -0.5, 0.5).integral(), 0.0);
    }
}
