use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div};

use fsim_core::Complex64;

/// Numeric observable value handled by an estimator.
///
/// A sample is a fixed number of real components; the trimmed-range error
/// analysis runs independently on each of them.
pub trait Sample:
    Copy + Debug + Default + PartialEq + Add<Output = Self> + AddAssign + Div<f64, Output = Self>
{
    /// Number of real components.
    const COMPONENTS: usize;

    /// Real component `index` of the value.
    fn component(&self, index: usize) -> f64;

    /// Rebuilds a value from exactly `COMPONENTS` reals.
    fn from_components(parts: &[f64]) -> Self;

    /// Renders a mean/error pair.
    fn render_estimate(mean: &Self, error: &Self) -> String;
}

impl Sample for f64 {
    const COMPONENTS: usize = 1;

    fn component(&self, _index: usize) -> f64 {
        *self
    }

    fn from_components(parts: &[f64]) -> Self {
        parts[0]
    }

    fn render_estimate(mean: &Self, error: &Self) -> String {
        format!("{mean}+/-{error}")
    }
}

impl Sample for Complex64 {
    const COMPONENTS: usize = 2;

    fn component(&self, index: usize) -> f64 {
        if index == 0 {
            self.re
        } else {
            self.im
        }
    }

    fn from_components(parts: &[f64]) -> Self {
        Complex64::new(parts[0], parts[1])
    }

    fn render_estimate(mean: &Self, error: &Self) -> String {
        format!("({}+/-{},{}+/-{})", mean.re, error.re, mean.im, error.im)
    }
}
