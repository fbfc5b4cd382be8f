use std::ops::Range;

use itertools::{Itertools, MinMaxResult};
use plotters::prelude::*;

use crate::{
    core::sizing::{Segment, TradeoffCurve},
    prelude::*,
};

/// Relative padding around the plotted points.
const PADDING: f64 = 0.05;

/// Render the trade-off curve as an SVG line chart: heat pump capacity on X and storage size on Y.
pub fn render_svg(curve: &TradeoffCurve, width: u32, height: u32) -> Result<String> {
    let segments: [(&str, &Segment, RGBColor); 3] = [
        ("Bottom", &curve.bottom, BLUE),
        ("Top", &curve.top, RED),
        ("Right", &curve.right, RGBColor(76, 175, 80)),
    ];
    let points = || segments.iter().flat_map(|(_, segment, _)| segment.iter());
    let x_range = padded_range(points().map(|point| point.hp_capacity.0));
    let y_range = padded_range(points().map(|point| point.tes_capacity.0));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Heat pump and storage trade-off", ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;
        chart
            .configure_mesh()
            .x_desc("HP capacity (kW)")
            .y_desc("TES size (kWh)")
            .label_style(("sans-serif", 12))
            .draw()?;

        for (label, segment, color) in segments {
            chart
                .draw_series(LineSeries::new(
                    segment.iter().map(|point| (point.hp_capacity.0, point.tes_capacity.0)),
                    color.stroke_width(2),
                ))?
                .label(label)
                .legend(move |(x, y)| PathElement::new([(x, y), (x + 20, y)], color));
        }
        chart
            .draw_series([curve.point_1, curve.point_2].into_iter().map(|point| {
                Circle::new((point.hp_capacity.0, point.tes_capacity.0), 4, BLACK.filled())
            }))?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
    }
    Ok(svg)
}

fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = match values.minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => return 0.0..1.0,
        MinMaxResult::OneElement(value) => (value, value),
        MinMaxResult::MinMax(min, max) => (min, max),
    };
    let padding = if max > min { (max - min) * PADDING } else { 1.0 };
    (min - padding)..(max + padding)
}
