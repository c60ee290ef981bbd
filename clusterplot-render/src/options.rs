//! Render configuration.

use crate::palette::Palette;
use crate::{Error, Result};
use clusterplot_core::{Hist2D, Profile1D, Rgb};
use std::path::PathBuf;

/// Default image size in pixels.
pub const DEFAULT_SIZE: (u32, u32) = (800, 600);

/// Default number of colour levels.
pub const DEFAULT_CONTOURS: usize = 100;

/// Something that can be rendered.
#[derive(Debug, Clone, Copy)]
pub enum Plot<'a> {
    /// 2D histogram drawn as coloured cells.
    Histogram(&'a Hist2D),
    /// Profile drawn as markers with error bars.
    Profile(&'a Profile1D),
}

/// A profile drawn on top of the plot frame, with a legend entry.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Profile to draw.
    pub profile: Profile1D,
    /// Marker colour.
    pub color: Rgb,
    /// Legend label.
    pub label: String,
}

impl Overlay {
    /// Creates an overlay drawn in the profile's own colour.
    pub fn new(profile: Profile1D, label: impl Into<String>) -> Self {
        let color = profile.color();
        Self {
            profile,
            color,
            label: label.into(),
        }
    }
}

/// Options of one rendered image.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Destination PNG file.
    pub output_path: PathBuf,
    /// Image size in pixels.
    pub size: (u32, u32),
    /// Palette of 2D histograms.
    pub palette: Palette,
    /// Logarithmic vertical axis (2D histograms only).
    pub log_scale_y: bool,
    /// Logarithmic colour scale (2D histograms only).
    pub log_scale_z: bool,
    /// Number of colour levels.
    pub contours: usize,
    /// Title override; the plot's own title otherwise.
    pub title: Option<String>,
    /// Profiles drawn in place of the plot's own content.
    pub overlay: Vec<Overlay>,
}

impl RenderOptions {
    /// Default options writing to `output_path`.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            size: DEFAULT_SIZE,
            palette: Palette::default(),
            log_scale_y: false,
            log_scale_z: false,
            contours: DEFAULT_CONTOURS,
            title: None,
            overlay: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_log_y(mut self, log: bool) -> Self {
        self.log_scale_y = log;
        self
    }

    #[must_use]
    pub fn with_log_z(mut self, log: bool) -> Self {
        self.log_scale_z = log;
        self
    }

    #[must_use]
    pub fn with_contours(mut self, contours: usize) -> Self {
        self.contours = contours;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds a profile overlay.
    #[must_use]
    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay.push(overlay);
        self
    }

    /// Checks the options.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOptions`] for a degenerate image or no levels.
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.size;
        if width < 200 || height < 150 {
            return Err(Error::InvalidOptions(format!(
                "image size {width}x{height} is too small"
            )));
        }
        if self.contours == 0 {
            return Err(Error::InvalidOptions(
                "at least one colour level is required".to_string(),
            ));
        }
        Ok(())
    }
}
