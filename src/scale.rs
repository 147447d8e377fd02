//! Value ↔ ratio mapping for the gauge axis.

/// Maps data values onto the [0, 1] track ratio and back.
pub trait Scale {
    fn transform(&self, value: f64) -> f64;
    fn inverse_transform(&self, ratio: f64) -> f64;
    fn minimum(&self) -> f64;
    fn maximum(&self) -> f64;
    fn inverted(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub minimum: f64,
    pub maximum: f64,
    pub inverted: bool,
}

impl LinearScale {
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum: minimum.min(maximum),
            maximum: minimum.max(maximum),
            inverted: false,
        }
    }

    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    fn range(&self) -> f64 {
        self.maximum - self.minimum
    }
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new(0.0, 100.0)
    }
}

impl Scale for LinearScale {
    fn transform(&self, value: f64) -> f64 {
        let range = self.range();
        let ratio = if range == 0.0 {
            0.0
        } else {
            (value - self.minimum) / range
        };
        if self.inverted {
            1.0 - ratio
        } else {
            ratio
        }
    }

    fn inverse_transform(&self, ratio: f64) -> f64 {
        let ratio = if self.inverted { 1.0 - ratio } else { ratio };
        self.minimum + ratio * self.range()
    }

    fn minimum(&self) -> f64 {
        self.minimum
    }

    fn maximum(&self) -> f64 {
        self.maximum
    }

    fn inverted(&self) -> bool {
        self.inverted
    }
}
