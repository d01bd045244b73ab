use std::f64::consts::PI;

use super::{validate_bounds, Distribution, Revision};
use crate::error::{Result, SamplingError};

/// Offset of the mode along the second axis, relative to the origin.
const MODE_SHIFT: f64 = -0.25;

/// A Gaussian bent along a parabola:
///
/// `pdf(x, y) = exp(-x'²/var_x) · exp(-(y' - bend·x'² + 0.25)²/var_y) / √(2π·var_x·var_y)`
///
/// where `(x', y') = (x, y) - origin`. The peak sits at `origin + (0, -0.25)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Banana2D {
    var_x: f64,
    var_y: f64,
    bend: f64,
    origin: Vec<f64>,
    min_coords: Vec<f64>,
    max_coords: Vec<f64>,
    revision: Revision,
}

impl Banana2D {
    pub fn new(var_x: f64, var_y: f64, bend: f64) -> Result<Self> {
        Ok(Self {
            var_x: positive("var_x", var_x)?,
            var_y: positive("var_y", var_y)?,
            bend: finite("bend", bend)?,
            ..Self::default()
        })
    }

    pub fn with_bounds(mut self, min_coords: Vec<f64>, max_coords: Vec<f64>) -> Result<Self> {
        self.set_bounds(min_coords, max_coords)?;
        Ok(self)
    }

    pub fn var_x(&self) -> f64 {
        self.var_x
    }

    pub fn var_y(&self) -> f64 {
        self.var_y
    }

    pub fn bend(&self) -> f64 {
        self.bend
    }

    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    /// Location of the density peak.
    pub fn mode(&self) -> [f64; 2] {
        [self.origin[0], self.origin[1] + MODE_SHIFT]
    }

    pub fn set_var_x(&mut self, var_x: f64) -> Result<()> {
        self.var_x = positive("var_x", var_x)?;
        self.revision.bump();
        Ok(())
    }

    pub fn set_var_y(&mut self, var_y: f64) -> Result<()> {
        self.var_y = positive("var_y", var_y)?;
        self.revision.bump();
        Ok(())
    }

    /// Sets the x standard deviation, i.e. `var_x = std²`.
    pub fn set_std_x(&mut self, std: f64) -> Result<()> {
        self.set_var_x(std * std)
    }

    pub fn set_std_y(&mut self, std: f64) -> Result<()> {
        self.set_var_y(std * std)
    }

    pub fn set_bend(&mut self, bend: f64) -> Result<()> {
        self.bend = finite("bend", bend)?;
        self.revision.bump();
        Ok(())
    }

    pub fn set_origin(&mut self, origin: [f64; 2]) {
        self.origin = origin.to_vec();
        self.revision.bump();
    }

    pub fn set_bounds(&mut self, min_coords: Vec<f64>, max_coords: Vec<f64>) -> Result<()> {
        validate_bounds(2, &min_coords, &max_coords)?;
        self.min_coords = min_coords;
        self.max_coords = max_coords;
        self.revision.bump();
        Ok(())
    }
}

impl Default for Banana2D {
    fn default() -> Self {
        Self {
            var_x: 0.2,
            var_y: 0.05,
            bend: 0.5,
            origin: vec![0.0, 0.0],
            min_coords: vec![-1.0, -1.0],
            max_coords: vec![1.0, 1.0],
            revision: Revision::default(),
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(SamplingError::invalid(
            name,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SamplingError::invalid(name, format!("must be finite, got {value}")))
    }
}

impl Distribution for Banana2D {
    fn dim(&self) -> usize {
        2
    }

    fn pdf(&self, x: &[f64]) -> f64 {
        let dx = x[0] - self.origin[0];
        let dy = x[1] - self.origin[1];
        let p_x = (-dx * dx / self.var_x).exp();
        let r = dy - self.bend * dx * dx - MODE_SHIFT;
        let p_y_given_x = (-r * r / self.var_y).exp();
        p_x * p_y_given_x / (2.0 * PI * self.var_x * self.var_y).sqrt()
    }

    fn min_coords(&self) -> Vec<f64> {
        self.min_coords.clone()
    }

    fn max_coords(&self) -> Vec<f64> {
        self.max_coords.clone()
    }

    fn e_min(&self) -> f64 {
        self.energy(&self.mode())
    }

    fn version(&self) -> u64 {
        self.revision.get()
    }
}
