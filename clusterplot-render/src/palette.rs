//! Palette definitions and application logic.

use clusterplot_core::Rgb;
use plotters::style::RGBColor;

/// Available palettes for 2D histograms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Palette {
    /// Rainbow - blue to cyan to green to yellow to red.
    #[default]
    Rainbow,
    /// Viridis (approximate) - blue to teal to green to yellow.
    Viridis,
    /// Hot (Thermal) - red to yellow to white.
    Hot,
    /// Grayscale - black to white.
    Grayscale,
}

impl std::fmt::Display for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Palette::Rainbow => write!(f, "Rainbow"),
            Palette::Viridis => write!(f, "Viridis"),
            Palette::Hot => write!(f, "Hot (Thermal)"),
            Palette::Grayscale => write!(f, "Grayscale"),
        }
    }
}

impl Palette {
    /// Maps a normalized value in `[0, 1]` to a colour.
    ///
    /// Values outside the interval are clamped.
    #[must_use]
    pub fn apply(self, val: f64) -> Rgb {
        let val = if val.is_nan() { 0.0 } else { val.clamp(0.0, 1.0) };
        match self {
            Palette::Rainbow => {
                let four = 4.0 * val;
                let r = (1.5 - (four - 3.0).abs()).clamp(0.0, 1.0);
                let g = (1.5 - (four - 2.0).abs()).clamp(0.0, 1.0);
                let b = (1.5 - (four - 1.0).abs()).clamp(0.0, 1.0);
                Rgb(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b))
            }
            Palette::Grayscale => {
                let v = unit_to_u8(val);
                Rgb(v, v, v)
            }
            Palette::Hot => {
                if val < 0.5 {
                    Rgb(255, unit_to_u8(val * 2.0), 0)
                } else {
                    Rgb(255, 255, unit_to_u8((val - 0.5) * 2.0))
                }
            }
            Palette::Viridis => Rgb(
                unit_to_u8(val.powi(2)),
                unit_to_u8(val),
                unit_to_u8(1.0 - val),
            ),
        }
    }
}

/// Scales a `[0, 1]` channel to a byte, clamping.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_u8(value: f64) -> u8 {
    (value * 255.0).clamp(0.0, 255.0).round() as u8
}

/// Converts a display colour to the plotters colour type.
#[must_use]
pub fn to_rgb_color(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}
