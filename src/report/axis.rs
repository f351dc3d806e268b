//! # Axis Normalizer Module
//!
//! Maps raw unsigned axis bytes (0–255, 128 = logical center) to
//! deadzone-corrected signed 16-bit stick values.
//!
//! ## Deadzone
//!
//! A deadzone forces a band around the stick center to exactly zero to
//! suppress sensor noise and drift. Values outside the band are rescaled
//! linearly so the output is continuous at the boundary: there is no jump
//! from zero to a nonzero floor as the stick leaves the band.
//!
//! ## Usage
//!
//! ```
//! use gamepad_bridge::report::AxisNormalizer;
//!
//! let axis = AxisNormalizer::new(0.08);
//!
//! // Centered input maps to zero
//! assert_eq!(axis.normalize(128), 0);
//!
//! // Full deflection maps to the output extremes. Centering on 128
//! // makes the raw range slightly asymmetric: 0 clamps to the full
//! // negative scale while 255 lands just short of the positive one.
//! assert_eq!(axis.normalize(0), -32767);
//! assert!(axis.normalize(255) > 32000);
//! ```

/// Maximum stick output magnitude (signed 16-bit range)
pub const STICK_MAX: i16 = i16::MAX;

/// Raw axis center value
const RAW_CENTER: f32 = 128.0;

/// Half-width of the raw axis range used for centering
const RAW_HALF_RANGE: f32 = 127.5;

/// Deadzone-corrected mapping from a raw axis byte to signed output.
///
/// The mapping is a pure function of the raw byte: nothing is accumulated
/// across calls. The deadzone is configuration, clamped to a sane range at
/// construction.
#[derive(Debug, Clone, Copy)]
pub struct AxisNormalizer {
    /// Deadzone as a fraction of the centered range (0.0 to 0.25)
    deadzone: f32,
    /// Negate the final output for axes with opposite raw polarity
    inverted: bool,
}

impl Default for AxisNormalizer {
    fn default() -> Self {
        Self {
            deadzone: 0.08,
            inverted: false,
        }
    }
}

impl AxisNormalizer {
    /// Creates a normalizer with the given deadzone.
    ///
    /// # Arguments
    ///
    /// * `deadzone` - Deadzone fraction (0.0 to 0.25). Values outside this range are clamped.
    #[must_use]
    pub fn new(deadzone: f32) -> Self {
        Self {
            deadzone: deadzone.clamp(0.0, 0.25),
            inverted: false,
        }
    }

    /// Creates an inverted normalizer: the final output is negated.
    ///
    /// Used for axes whose raw polarity is opposite the target convention,
    /// such as stick Y axes where raw "up" is a low byte value.
    #[must_use]
    pub fn inverted(deadzone: f32) -> Self {
        Self {
            deadzone: deadzone.clamp(0.0, 0.25),
            inverted: true,
        }
    }

    /// Returns the configured deadzone value.
    #[must_use]
    pub fn deadzone(&self) -> f32 {
        self.deadzone
    }

    /// Returns whether this normalizer negates its output.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Maps a raw axis byte to a signed 16-bit output value.
    ///
    /// Steps, in order: center to approximately -1.0..1.0, zero the
    /// deadzone band, rescale the remaining magnitude so the output is
    /// continuous at the boundary, scale to the signed output range, and
    /// negate if inverted.
    ///
    /// # Examples
    ///
    /// ```
    /// use gamepad_bridge::report::AxisNormalizer;
    ///
    /// let axis = AxisNormalizer::new(0.08);
    /// let inv = AxisNormalizer::inverted(0.08);
    ///
    /// assert_eq!(axis.normalize(128), 0);
    /// assert_eq!(inv.normalize(128), 0);
    /// assert_eq!(inv.normalize(0), 32767);
    /// ```
    #[must_use]
    pub fn normalize(&self, raw: u8) -> i16 {
        let centered = (raw as f32 - RAW_CENTER) / RAW_HALF_RANGE;
        let scaled = self.apply_deadzone(centered);
        let output = (scaled * STICK_MAX as f32) as i16;

        if self.inverted {
            -output
        } else {
            output
        }
    }

    /// Zeroes the deadzone band and rescales the remainder to -1.0..1.0.
    #[inline]
    fn apply_deadzone(&self, centered: f32) -> f32 {
        if centered.abs() < self.deadzone {
            0.0
        } else {
            let rescaled = (centered.abs() - self.deadzone) / (1.0 - self.deadzone);
            centered.signum() * rescaled.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_zero() {
        assert_eq!(AxisNormalizer::new(0.08).normalize(128), 0);
        assert_eq!(AxisNormalizer::inverted(0.08).normalize(128), 0);
    }

    #[test]
    fn test_full_deflection_maps_to_extremes() {
        let axis = AxisNormalizer::new(0.08);

        // Raw 0 centers past -1.0 and clamps to the full negative scale
        assert_eq!(axis.normalize(0), -STICK_MAX);

        // Raw 255 centers just below 1.0, so the positive extreme sits
        // slightly inside the scale; it is still the maximum output
        let max = axis.normalize(255);
        assert!(max > 32000, "positive extreme too small: {}", max);
        for raw in 0..=255u8 {
            assert!(axis.normalize(raw) <= max, "raw {} exceeds normalize(255)", raw);
        }
    }

    #[test]
    fn test_inverted_swaps_signs() {
        let axis = AxisNormalizer::new(0.08);
        let inv = AxisNormalizer::inverted(0.08);

        for raw in [0u8, 10, 100, 128, 200, 255] {
            assert_eq!(inv.normalize(raw), -axis.normalize(raw), "raw {}", raw);
        }
    }

    #[test]
    fn test_deadzone_band_is_exactly_zero() {
        let axis = AxisNormalizer::new(0.08);

        // 0.08 * 127.5 = 10.2, so raws 118..=138 center within the band
        for raw in 118..=138u8 {
            assert_eq!(axis.normalize(raw), 0, "raw {} should be in deadzone", raw);
        }
    }

    #[test]
    fn test_output_continuous_at_deadzone_boundary() {
        let axis = AxisNormalizer::new(0.08);

        // First raw value past the band: no discontinuous jump to a floor
        let just_outside = axis.normalize(139);
        assert!(just_outside > 0, "139 should be past the deadzone");
        assert!(
            just_outside < 500,
            "output just outside the deadzone should be near zero, got {}",
            just_outside
        );

        let just_outside_neg = axis.normalize(117);
        assert!(just_outside_neg < 0);
        assert!(just_outside_neg > -500);
    }

    #[test]
    fn test_output_monotonic_outside_deadzone() {
        let axis = AxisNormalizer::new(0.08);

        let mut previous = axis.normalize(139);
        for raw in 140..=255u8 {
            let current = axis.normalize(raw);
            assert!(
                current >= previous,
                "output should not decrease: raw {} gave {}, raw {} gave {}",
                raw - 1,
                previous,
                raw,
                current
            );
            previous = current;
        }
    }

    #[test]
    fn test_zero_deadzone_passes_through() {
        let axis = AxisNormalizer::new(0.0);

        assert_eq!(axis.normalize(0), -STICK_MAX);
        assert!(axis.normalize(255) > 32000);
        // Slightly off-center values map to small nonzero outputs
        assert!(axis.normalize(130) > 0);
        assert!(axis.normalize(126) < 0);
    }

    #[test]
    fn test_deadzone_clamped_at_construction() {
        assert_eq!(AxisNormalizer::new(0.5).deadzone(), 0.25);
        assert_eq!(AxisNormalizer::new(-0.1).deadzone(), 0.0);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let axis = AxisNormalizer::new(0.08);
        for raw in 0..=255u8 {
            assert_eq!(axis.normalize(raw), axis.normalize(raw));
        }
    }

    #[test]
    fn test_output_never_exceeds_range() {
        let axis = AxisNormalizer::new(0.08);
        let inv = AxisNormalizer::inverted(0.08);

        for raw in 0..=255u8 {
            assert!(axis.normalize(raw).abs() <= STICK_MAX);
            assert!(inv.normalize(raw).abs() <= STICK_MAX);
        }
    }
}
