//! 2D histograms as coloured cells with a colour bar.

use crate::options::RenderOptions;
use crate::palette::{to_rgb_color, Palette};
use crate::scale::{format_content, ColorScale};
use clusterplot_core::{Hist2D, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;

/// Width reserved for the colour bar.
const COLOR_BAR_WIDTH: u32 = 110;

/// One filled bin in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredCell {
    /// Lower and upper x edge.
    pub x: (f64, f64),
    /// Lower and upper y edge.
    pub y: (f64, f64),
    /// Fill colour.
    pub color: Rgb,
}

impl ColoredCell {
    fn rectangle(&self) -> Rectangle<(f64, f64)> {
        Rectangle::new(
            [(self.x.0, self.y.0), (self.x.1, self.y.1)],
            to_rgb_color(self.color).filled(),
        )
    }
}

/// Colours every non-empty in-range bin. Empty bins are left out.
#[must_use]
pub fn colored_cells(
    hist: &Hist2D,
    scale: Option<&ColorScale>,
    palette: Palette,
) -> Vec<ColoredCell> {
    let Some(scale) = scale else {
        return Vec::new();
    };
    hist.in_range()
        .filter_map(|(ix, iy, value)| {
            let t = scale.level(value)?;
            let x = hist.x_axis().bin_range(ix)?;
            let y = hist.y_axis().bin_range(iy)?;
            Some(ColoredCell {
                x,
                y,
                color: palette.apply(t),
            })
        })
        .collect()
}

pub(crate) fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    hist: &Hist2D,
    options: &RenderOptions,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    let (plot_area, bar_area) = root.split_horizontally(width.saturating_sub(COLOR_BAR_WIDTH));

    let meta = hist.meta();
    let title = options.title.as_deref().unwrap_or(&meta.title);
    let scale = ColorScale::for_histogram(hist, options.log_scale_z, options.contours);
    let cells = colored_cells(hist, scale.as_ref(), options.palette);
    let x_axis = hist.x_axis();
    let y_axis = hist.y_axis();

    if options.log_scale_y && y_axis.min() > 0.0 {
        let mut chart = ChartBuilder::on(&plot_area)
            .caption(title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(65)
            .build_cartesian_2d(
                x_axis.min()..x_axis.max(),
                (y_axis.min()..y_axis.max()).log_scale(),
            )?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(meta.x_label.as_str())
            .y_desc(meta.y_label.as_str())
            .label_style(("sans-serif", 14))
            .axis_desc_style(("sans-serif", 16))
            .draw()?;
        chart.draw_series(cells.iter().map(ColoredCell::rectangle))?;
    } else {
        if options.log_scale_y {
            log::warn!(
                "{}: y axis starts at {}, drawing it linearly",
                meta.name,
                y_axis.min()
            );
        }
        let mut chart = ChartBuilder::on(&plot_area)
            .caption(title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(65)
            .build_cartesian_2d(x_axis.min()..x_axis.max(), y_axis.min()..y_axis.max())?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(meta.x_label.as_str())
            .y_desc(meta.y_label.as_str())
            .label_style(("sans-serif", 14))
            .axis_desc_style(("sans-serif", 16))
            .draw()?;
        chart.draw_series(cells.iter().map(ColoredCell::rectangle))?;
    }

    if let Some(scale) = scale {
        draw_color_bar(&bar_area, &scale, options.palette)?;
    }
    Ok(())
}

fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scale: &ColorScale,
    palette: Palette,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    // The bar is drawn in palette space; labels map back to contents.
    let mut chart = ChartBuilder::on(area)
        .margin_top(45)
        .margin_bottom(55)
        .margin_right(15)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_label_formatter(&|t: &f64| format_content(scale.value_at(*t)))
        .label_style(("sans-serif", 12))
        .draw()?;

    let levels = scale.levels();
    let n = usize_to_f64(levels);
    chart.draw_series((0..levels).map(|i| {
        let lo = usize_to_f64(i) / n;
        let hi = usize_to_f64(i + 1) / n;
        let color = palette.apply(scale.quantise(0.5 * (lo + hi)));
        Rectangle::new([(0.0, lo), (1.0, hi)], to_rgb_color(color).filled())
    }))?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn usize_to_f64(value: usize) -> f64 {
    value as f64
}
