//! Reach distance remapping
//!
//! Maps how far the fitted center sits from the hand root to how far the
//! pointer travels. With `u = d/near` and `v = d/far`:
//!
//! ```text
//! map(d) = (u + u² + v⁵) · near
//! ```
//!
//! Near zero this is the identity, so small motions stay 1:1. It then grows
//! quadratically and finally with the fifth power, so reaching a little
//! further throws the pointer across the room.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Characteristic length dominating close to the hand (meters)
pub const DEFAULT_NEAR: f32 = 0.03;
/// Characteristic length dominating far from the hand (meters)
pub const DEFAULT_FAR: f32 = 0.04;

/// Stateless distance remapper
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeMapper {
    pub near: f32,
    pub far: f32,
}

impl RangeMapper {
    pub fn new(near: f32, far: f32) -> Result<Self, ConfigError> {
        let mapper = Self { near, far };
        mapper.validate()?;
        Ok(mapper)
    }

    /// Both characteristic lengths must be positive. That alone keeps the
    /// map strictly increasing on `d >= 0`: every term has a non-negative
    /// derivative and the linear term's is `1`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.near > 0.0) {
            return Err(ConfigError::NonPositive("range.near"));
        }
        if !(self.far > 0.0) {
            return Err(ConfigError::NonPositive("range.far"));
        }
        Ok(())
    }

    pub fn map(&self, distance: f32) -> f32 {
        let u = distance / self.near;
        let v = distance / self.far;
        (u + u * u + v.powi(5)) * self.near
    }
}

impl Default for RangeMapper {
    fn default() -> Self {
        Self {
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}
