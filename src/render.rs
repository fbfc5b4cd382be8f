mod svg;
mod table;

pub use self::{
    svg::render_svg,
    table::{render_daily_stats, render_trade_off},
};
use crate::{core::sizing::TradeoffCurve, prelude::*};

/// Output format of the trade-off curve.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Format {
    /// Summary table.
    #[default]
    Table,

    /// All the curve points as JSON.
    Json,

    /// SVG chart.
    Svg,
}

impl Format {
    pub fn render(self, curve: &TradeoffCurve, (width, height): (u32, u32)) -> Result<String> {
        match self {
            Self::Table => Ok(render_trade_off(curve).to_string()),
            Self::Json => Ok(serde_json::to_string_pretty(curve)?),
            Self::Svg => render_svg(curve, width, height),
        }
    }
}
