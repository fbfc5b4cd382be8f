use chrono::NaiveDate;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{
    day::DailyStats,
    sizing::{CurvePoint, Segment, TradeoffCurve},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

#[must_use]
pub fn render_trade_off(curve: &TradeoffCurve) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Points", "HP capacity", "TES capacity"]);
    table.add_row(vec![
        Cell::new("Peak energy"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(curve.peak_energy).set_alignment(CellAlignment::Right),
    ]);
    for (name, point, color) in
        [("Point 1", curve.point_1, Color::Reset), ("Point 2 (knee)", curve.point_2, Color::Green)]
    {
        table.add_row(vec![
            Cell::new(name).fg(color),
            Cell::new(""),
            Cell::new(point.hp_capacity).set_alignment(CellAlignment::Right).fg(color),
            Cell::new(point.tes_capacity).set_alignment(CellAlignment::Right).fg(color),
        ]);
    }
    for (name, segment) in [("Bottom", &curve.bottom), ("Top", &curve.top), ("Right", &curve.right)] {
        table.add_row(segment_row(name, segment));
    }
    table
}

fn segment_row(name: &str, segment: &Segment) -> Vec<Cell> {
    let span = |f: fn(&CurvePoint) -> String| match (segment.first(), segment.last()) {
        (Some(first), Some(last)) => format!("{} → {}", f(first), f(last)),
        _ => String::new(),
    };
    vec![
        Cell::new(name).add_attribute(Attribute::Bold),
        Cell::new(segment.len()).set_alignment(CellAlignment::Right),
        Cell::new(span(|point| point.hp_capacity.to_string())).set_alignment(CellAlignment::Right),
        Cell::new(span(|point| point.tes_capacity.to_string())).set_alignment(CellAlignment::Right),
    ]
}

/// Daily statistics, marking the days picked by the selection strategies.
#[must_use]
pub fn render_daily_stats(stats: &[DailyStats], marks: &[(NaiveDate, &str)]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Samples", "Mean", "Peak", "Selected by"]);
    for day in stats {
        let selected_by =
            marks.iter().filter(|(date, _)| *date == day.date).map(|(_, mark)| *mark).collect::<Vec<_>>();
        table.add_row(vec![
            Cell::new(day.date),
            Cell::new(day.n_samples).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
            Cell::new(day.mean).set_alignment(CellAlignment::Right),
            Cell::new(day.peak).set_alignment(CellAlignment::Right),
            Cell::new(selected_by.join(", ")).fg(if selected_by.is_empty() {
                Color::Reset
            } else {
                Color::Green
            }),
        ]);
    }
    table
}
