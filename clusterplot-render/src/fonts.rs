//! Embedded text face.
//!
//! Plots are rendered without looking up system fonts: the `sans-serif`
//! family used by every chart is registered from a bundled DejaVu Sans.

use crate::{Error, Result};
use plotters::style::{register_font, FontStyle};
use std::sync::OnceLock;

const SANS_SERIF: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

static REGISTERED: OnceLock<bool> = OnceLock::new();

/// Registers the bundled face once per process.
pub(crate) fn ensure_registered() -> Result<()> {
    let registered = *REGISTERED
        .get_or_init(|| register_font("sans-serif", FontStyle::Normal, SANS_SERIF).is_ok());
    if registered {
        Ok(())
    } else {
        Err(Error::Font(
            "bundled sans-serif face could not be parsed".to_string(),
        ))
    }
}
