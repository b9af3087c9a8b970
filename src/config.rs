use std::time::Duration;

use crate::ConfigError;

/// Construction parameters of a board: side length, seeding density and
/// the delay between timer-driven generations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub size: usize,
    pub density: f64,
    pub delay: Duration,
    /// Seed for reproducible boards; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 16,
            density: 0.1,
            delay: Duration::from_millis(1000),
            seed: None,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::SizeZero);
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(ConfigError::DensityOutOfRange(self.density));
        }
        if self.delay.is_zero() {
            return Err(ConfigError::DelayZero);
        }
        Ok(())
    }
}
