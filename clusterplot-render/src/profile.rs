//! Profiles as markers with vertical error bars.

use crate::options::RenderOptions;
use crate::palette::to_rgb_color;
use clusterplot_core::{Profile1D, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;

/// Vertical range covering every `mean ± error` of the given profiles.
///
/// Falls back to `[-1, 1]` when there are no points and pads the range by 5%
/// otherwise.
#[must_use]
pub fn value_extent<'a, I>(profiles: I) -> (f64, f64)
where
    I: IntoIterator<Item = &'a Profile1D>,
{
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for profile in profiles {
        for (_, mean, error) in profile.points() {
            lo = lo.min(mean - error);
            hi = hi.max(mean + error);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let span = hi - lo;
    if span > 0.0 {
        (lo - 0.05 * span, hi + 0.05 * span)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

pub(crate) fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    profile: &Profile1D,
    options: &RenderOptions,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    // Overlays replace the plot's own content; the plot keeps the frame.
    let series: Vec<(&Profile1D, Rgb, Option<&str>)> = if options.overlay.is_empty() {
        vec![(profile, profile.color(), None)]
    } else {
        options
            .overlay
            .iter()
            .map(|overlay| (&overlay.profile, overlay.color, Some(overlay.label.as_str())))
            .collect()
    };

    let meta = profile.meta();
    let title = options.title.as_deref().unwrap_or(&meta.title);
    let axis = profile.axis();
    let (y_lo, y_hi) = value_extent(series.iter().map(|(p, _, _)| *p));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(axis.min()..axis.max(), y_lo..y_hi)?;
    chart
        .configure_mesh()
        .x_desc(meta.x_label.as_str())
        .y_desc(meta.y_label.as_str())
        .label_style(("sans-serif", 14))
        .axis_desc_style(("sans-serif", 16))
        .light_line_style(&WHITE.mix(0.0))
        .draw()?;

    for &(points, color, label) in &series {
        let color = to_rgb_color(color);
        let style = color.filled();
        chart.draw_series(points.points().map(|(x, mean, error)| {
            ErrorBar::new_vertical(x, mean - error, mean, mean + error, style, 6)
        }))?;
        let anno = chart.draw_series(
            points
                .points()
                .map(|(x, mean, _)| Circle::new((x, mean), 3, style)),
        )?;
        if let Some(label) = label {
            anno.label(label)
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
        }
    }

    if series.iter().any(|(_, _, label)| label.is_some()) {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", 14))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clusterplot_core::{Axis, HistMeta};

    fn profile() -> Profile1D {
        Profile1D::new(
            HistMeta::new("p", "p", "t", "<y>"),
            Axis::linear(10, 0.0, 100.0).unwrap(),
        )
    }

    #[test]
    fn test_extent_of_empty_profiles() {
        assert_eq!(value_extent([&profile()]), (-1.0, 1.0));
        assert_eq!(value_extent(std::iter::empty()), (-1.0, 1.0));
    }

    #[test]
    fn test_extent_covers_error_bars() {
        let mut a = profile();
        a.fill(5.0, 0.0);
        a.fill(5.0, 2.0);
        let mut b = profile();
        b.fill(55.0, 10.0);
        let (lo, hi) = value_extent([&a, &b]);
        // a: mean 1, error 1/sqrt(2); b: mean 10, error 0
        let a_lo = 1.0 - 1.0 / 2f64.sqrt();
        let span = 10.0 - a_lo;
        assert_relative_eq!(lo, a_lo - 0.05 * span, epsilon = 1e-12);
        assert_relative_eq!(hi, 10.0 + 0.05 * span, epsilon = 1e-12);
    }

    #[test]
    fn test_extent_of_single_value() {
        let mut a = profile();
        a.fill(5.0, 3.0);
        assert_eq!(value_extent([&a]), (2.0, 4.0));
    }
}
