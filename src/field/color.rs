//! Heatmap colour ramp
//!
//! Six anchor colours with break points concentrated in the middle of the
//! load range, where small differences matter most.

use super::MAX_LOAD;

/// 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Channels normalised to `0.0..=1.0`.
    pub fn to_array(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.to_array();
        [r, g, b, alpha]
    }

    /// Per-channel linear interpolation, rounded back to 8 bits.
    pub fn lerp(self, other: Rgb, factor: f32) -> Rgb {
        let channel = |a: u8, b: u8| {
            let value = a as f32 + (b as f32 - a as f32) * factor;
            value.round().clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

pub const LOW: Rgb = Rgb::from_hex(0x2563eb);
pub const MEDIUM_LOW: Rgb = Rgb::from_hex(0x06b6d4);
pub const MEDIUM: Rgb = Rgb::from_hex(0x10b981);
pub const MEDIUM_HIGH: Rgb = Rgb::from_hex(0xf59e0b);
pub const HIGH: Rgb = Rgb::from_hex(0xef4444);
pub const CRITICAL: Rgb = Rgb::from_hex(0xdc2626);

/// Normalised load values where the ramp switches anchor pairs.
pub const BREAK_POINTS: [f32; 4] = [0.12, 0.28, 0.48, 0.7];

const ANCHORS: [Rgb; 6] = [LOW, MEDIUM_LOW, MEDIUM, MEDIUM_HIGH, HIGH, CRITICAL];

/// Maps a load onto the heatmap ramp.
///
/// Loads are normalised against [`MAX_LOAD`] and clamped to `[0, 1]`, so the
/// function is total: negative and NaN inputs map to the low anchor.
pub fn color_for(load: f32) -> Rgb {
    let n = if load > 0.0 {
        (load / MAX_LOAD).min(1.0)
    } else {
        0.0
    };

    let segment = BREAK_POINTS
        .iter()
        .position(|&edge| n < edge)
        .unwrap_or(BREAK_POINTS.len());
    let start = if segment == 0 {
        0.0
    } else {
        BREAK_POINTS[segment - 1]
    };
    let end = BREAK_POINTS.get(segment).copied().unwrap_or(1.0);

    ANCHORS[segment].lerp(ANCHORS[segment + 1], (n - start) / (end - start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_gap(a: Rgb, b: Rgb) -> u8 {
        a.r.abs_diff(b.r).max(a.g.abs_diff(b.g)).max(a.b.abs_diff(b.b))
    }

    #[test]
    fn extremes_hit_the_end_anchors() {
        assert_eq!(color_for(0.0), LOW);
        assert_eq!(color_for(MAX_LOAD), CRITICAL);
        assert_eq!(color_for(MAX_LOAD * 3.0), CRITICAL);
    }

    #[test]
    fn out_of_domain_inputs_map_to_low() {
        assert_eq!(color_for(-25.0), LOW);
        assert_eq!(color_for(f32::NAN), LOW);
    }

    #[test]
    fn break_points_land_on_anchor_colours() {
        for (i, edge) in BREAK_POINTS.iter().enumerate() {
            let color = color_for(edge * MAX_LOAD);
            assert!(
                channel_gap(color, ANCHORS[i + 1]) <= 1,
                "break {edge} gave {color:?}"
            );
        }
    }

    #[test]
    fn ramp_is_continuous_across_break_points() {
        // small enough that the steepest segment moves well under one channel step
        let epsilon = 1e-5;
        for edge in BREAK_POINTS {
            let at = color_for(edge * MAX_LOAD);
            let below = color_for((edge - epsilon) * MAX_LOAD);
            let above = color_for((edge + epsilon) * MAX_LOAD);
            assert!(channel_gap(below, at) <= 1, "below {edge}: {below:?} vs {at:?}");
            assert!(channel_gap(above, at) <= 1, "above {edge}: {above:?} vs {at:?}");
        }
    }

    #[test]
    fn lerp_rounds_half_channels_away_from_zero() {
        assert_eq!(LOW.lerp(MEDIUM_LOW, 0.5), Rgb::from_hex(0x168de0));
        assert_eq!(LOW.lerp(MEDIUM_LOW, 0.0), LOW);
        assert_eq!(LOW.lerp(MEDIUM_LOW, 1.0), MEDIUM_LOW);
    }

    #[test]
    fn ramp_warms_as_load_grows() {
        let cool = color_for(20.0);
        let hot = color_for(420.0);
        assert!(hot.r > cool.r);
        assert!(hot.b < cool.b);
    }

    #[test]
    fn hex_packs_channels_big_endian() {
        assert_eq!(HIGH.to_hex(), 0xef4444);
        assert_eq!((HIGH.r, HIGH.g, HIGH.b), (0xef, 0x44, 0x44));
    }
}
