use serde::{Deserialize, Serialize};

/// Errors produced when building or editing [`ShadingParams`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f32 },
}

/// Inclusive range and slider step for one tunable parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamRange {
    pub const fn new(name: &'static str, min: f32, max: f32, step: f32) -> Self {
        Self {
            name,
            min,
            max,
            step,
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Check `value` against the range, returning it unchanged when accepted.
    pub fn check(&self, value: f32) -> Result<f32, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite {
                name: self.name,
                value,
            });
        }
        if !self.contains(value) {
            return Err(ParamError::OutOfRange {
                name: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }

    /// Round `value` to the nearest step and clamp it into range.
    ///
    /// Steps are decimal fractions (`1/n`), so rounding goes through the step
    /// count per unit in f64 to land exactly on values like `0.012`.
    pub fn snap(&self, value: f32) -> f32 {
        let per_unit = (1.0 / f64::from(self.step)).round();
        let snapped = (f64::from(value) * per_unit).round() / per_unit;
        (snapped as f32).clamp(self.min, self.max)
    }
}

/// The four user-tunable inputs of the knot shader.
///
/// Owned by the host scene and pushed read-only into the shading model once
/// per frame. Elapsed time is not part of this struct; it comes from the
/// host's clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadingParams {
    /// Vertical threshold of the fade; fragments below it become transparent.
    pub progress: f32,
    /// Exponent of the fresnel falloff. Zero and negative values are allowed.
    pub fresnel_amount: f32,
    /// Width of the shine band.
    pub shine_size: f32,
    /// Scroll rate of the shine band.
    pub shine_speed: f32,
}

impl ShadingParams {
    pub const PROGRESS: ParamRange = ParamRange::new("progress", 0.0, 1.0, 0.001);
    pub const FRESNEL_AMOUNT: ParamRange = ParamRange::new("fresnelAmount", -3.0, 3.0, 0.0001);
    pub const SHINE_SIZE: ParamRange = ParamRange::new("shineSize", 0.0, 1.0, 0.001);
    pub const SHINE_SPEED: ParamRange = ParamRange::new("shineSpeed", 1.0, 20.0, 0.001);

    /// Build a parameter set, rejecting any value outside its declared range.
    pub fn new(
        progress: f32,
        fresnel_amount: f32,
        shine_size: f32,
        shine_speed: f32,
    ) -> Result<Self, ParamError> {
        Ok(Self {
            progress: Self::PROGRESS.check(progress)?,
            fresnel_amount: Self::FRESNEL_AMOUNT.check(fresnel_amount)?,
            shine_size: Self::SHINE_SIZE.check(shine_size)?,
            shine_speed: Self::SHINE_SPEED.check(shine_speed)?,
        })
    }

    /// Re-check every field. Useful after deserializing or direct field writes.
    pub fn validate(&self) -> Result<(), ParamError> {
        Self::new(
            self.progress,
            self.fresnel_amount,
            self.shine_size,
            self.shine_speed,
        )
        .map(|_| ())
    }

    /// Copy with every field rounded onto its slider grid.
    pub fn snapped(&self) -> Self {
        Self {
            progress: Self::PROGRESS.snap(self.progress),
            fresnel_amount: Self::FRESNEL_AMOUNT.snap(self.fresnel_amount),
            shine_size: Self::SHINE_SIZE.snap(self.shine_size),
            shine_speed: Self::SHINE_SPEED.snap(self.shine_speed),
        }
    }

    pub fn set_progress(&mut self, value: f32) -> Result<(), ParamError> {
        self.progress = Self::PROGRESS.check(value)?;
        Ok(())
    }

    pub fn set_fresnel_amount(&mut self, value: f32) -> Result<(), ParamError> {
        self.fresnel_amount = Self::FRESNEL_AMOUNT.check(value)?;
        Ok(())
    }

    pub fn set_shine_size(&mut self, value: f32) -> Result<(), ParamError> {
        self.shine_size = Self::SHINE_SIZE.check(value)?;
        Ok(())
    }

    pub fn set_shine_speed(&mut self, value: f32) -> Result<(), ParamError> {
        self.shine_speed = Self::SHINE_SPEED.check(value)?;
        Ok(())
    }
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            progress: 0.0,
            fresnel_amount: 1.0,
            shine_size: 0.012,
            shine_speed: 3.0,
        }
    }
}
