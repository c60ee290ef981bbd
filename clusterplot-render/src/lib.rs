//! clusterplot-render: PNG rendering of histograms and profiles.
//!
//! This crate draws the aggregates of `clusterplot-core` with plotters:
//! - **2D histograms** - coloured cells, optional log colour and y scales,
//!   and a colour bar
//! - **Profiles** - markers with error bars, optionally several overlaid
//!   profiles with a legend
//!
//! Text uses a bundled face, so rendering needs no system fonts.

mod error;
mod fonts;
mod heatmap;
mod options;
mod palette;
mod profile;
mod scale;

pub use error::{Error, Result};
pub use heatmap::{colored_cells, ColoredCell};
pub use options::{Overlay, Plot, RenderOptions, DEFAULT_CONTOURS, DEFAULT_SIZE};
pub use palette::{to_rgb_color, Palette};
pub use profile::value_extent;
pub use scale::{format_content, ColorScale};

use error::drawing_error;
use plotters::prelude::*;

/// Renders a plot to the PNG file named in `options`.
///
/// The input is only read. An empty histogram or profile yields an empty
/// frame.
///
/// # Errors
/// Returns [`Error::InvalidOptions`] for unusable options,
/// [`Error::Font`] if the bundled face cannot be loaded and
/// [`Error::Drawing`] if drawing or writing the file fails.
pub fn render(plot: Plot<'_>, options: &RenderOptions) -> Result<()> {
    options.validate()?;
    fonts::ensure_registered()?;
    let root = BitMapBackend::new(&options.output_path, options.size).into_drawing_area();
    match plot {
        Plot::Histogram(hist) => heatmap::draw(&root, hist, options),
        Plot::Profile(mean_profile) => profile::draw(&root, mean_profile, options),
    }
    .map_err(drawing_error)?;
    root.present().map_err(drawing_error)?;
    log::debug!("wrote {}", options.output_path.display());
    Ok(())
}
