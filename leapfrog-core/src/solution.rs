use std::f64::consts::PI;

/// Closed-form standing wave used to seed, drive and check the solver:
///
/// `f(x, y, z, t) = sin(pi x / Lx) sin(2 pi y / Ly) sin(3 pi z / Lz) cos(omega t)`
///
/// with `omega = (pi / 2) sqrt(1/Lx^2 + 4/Ly^2 + 9/Lz^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticSolution {
    lx: f64,
    ly: f64,
    lz: f64,
    omega: f64,
}

impl AnalyticSolution {
    /// Builds the mode for a box with edge lengths `lx`, `ly`, `lz`.
    #[must_use]
    pub fn new(lx: f64, ly: f64, lz: f64) -> Self {
        let omega = PI / 2.0 * (1.0 / (lx * lx) + 4.0 / (ly * ly) + 9.0 / (lz * lz)).sqrt();
        Self { lx, ly, lz, omega }
    }

    /// Builds the mode for a cube of edge `length`.
    #[must_use]
    pub fn cube(length: f64) -> Self {
        Self::new(length, length, length)
    }

    /// Angular frequency of the mode.
    #[must_use]
    pub const fn omega(&self) -> f64 {
        self.omega
    }

    /// Extent of the domain along y (location of the far periodic face).
    #[must_use]
    pub const fn ly(&self) -> f64 {
        self.ly
    }

    /// Evaluates the field at a physical point and time.
    #[inline]
    #[must_use]
    pub fn eval(&self, x: f64, y: f64, z: f64, t: f64) -> f64 {
        (PI * x / self.lx).sin()
            * (2.0 * PI * y / self.ly).sin()
            * (3.0 * PI * z / self.lz).sin()
            * (self.omega * t).cos()
    }

    /// Exact `d^2 f / dt^2`, i.e. `-omega^2 f`.
    #[must_use]
    pub fn second_time_derivative(&self, x: f64, y: f64, z: f64, t: f64) -> f64 {
        -self.omega * self.omega * self.eval(x, y, z, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omega_unit_cube() {
        let f = AnalyticSolution::cube(1.0);
        let expected = PI / 2.0 * 14f64.sqrt();
        assert!((f.omega() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_vanishes_on_faces() {
        let f = AnalyticSolution::cube(2.0);
        for &(x, y, z) in &[(0.0, 0.3, 0.7), (2.0, 0.3, 0.7), (0.4, 0.0, 0.7), (0.4, 0.3, 0.0)] {
            assert!(f.eval(x, y, z, 0.5).abs() < 1e-12);
        }
        assert!(f.eval(0.4, 2.0, 0.7, 0.5).abs() < 1e-12);
        assert!(f.eval(0.4, 0.3, 2.0, 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_peak_value() {
        // x = L/2, y = L/4, z = L/6 puts every factor at +1.
        let f = AnalyticSolution::cube(1.0);
        assert!((f.eval(0.5, 0.25, 1.0 / 6.0, 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_second_time_derivative() {
        let f = AnalyticSolution::cube(1.0);
        let (x, y, z, t) = (0.3, 0.1, 0.2, 0.4);
        let dt = 1e-4;
        let fd = (f.eval(x, y, z, t + dt) - 2.0 * f.eval(x, y, z, t) + f.eval(x, y, z, t - dt))
            / (dt * dt);
        assert!((fd - f.second_time_derivative(x, y, z, t)).abs() < 1e-4);
    }
}
