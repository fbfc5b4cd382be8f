use std::{fs, path::PathBuf};

use chrono::NaiveDate;
use clap::Parser;

use crate::{
    cli::input::InputArgs,
    core::{
        day::{DaySelection, select_day},
        period::Period,
        sizing::{DEFAULT_MAX_ITERATIONS, PeakDemand, SearchOptions, Sizing, StepSchedule},
    },
    load::read_load_file,
    prelude::*,
    quantity::power::Kilowatts,
    render::Format,
};

#[derive(Parser)]
pub struct SizeArgs {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Hours when the heat pump charges the storage, for example `0-6`.
    /// A period whose start is after its end wraps around midnight, for example `22-6`.
    #[clap(long, env = "CHARGE_PERIOD")]
    pub charge_period: Period,

    /// Hours when the storage covers the peak load, for example `17-21`.
    #[clap(long, env = "DISCHARGE_PERIOD")]
    pub discharge_period: Period,

    /// Size for this specific day, overrides `--selection`.
    #[clap(long, env = "SIZING_DAY")]
    pub day: Option<NaiveDate>,

    /// How to pick the day to size for.
    #[clap(long, env = "DAY_SELECTION", default_value = "highest-ave")]
    pub selection: DaySelection,

    #[clap(flatten)]
    pub search: SearchArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Copy, Clone, Parser)]
pub struct SearchArgs {
    /// How the candidate heat pump capacity goes down between the iterations.
    #[clap(long, env = "STEP_SCHEDULE", default_value = "fixed")]
    pub schedule: StepSchedule,

    /// Capacity step in kilowatts, defaults to a schedule-specific value.
    #[clap(long = "step-kilowatts", env = "STEP_KILOWATTS")]
    pub step: Option<Kilowatts>,

    /// What the storage has to cover during the discharge period.
    #[clap(long, env = "PEAK_DEMAND", default_value = "excess")]
    pub peak_demand: PeakDemand,

    /// Give up on a curve after this many iterations.
    #[clap(long, env = "MAX_ITERATIONS", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,
}

impl From<SearchArgs> for SearchOptions {
    fn from(args: SearchArgs) -> Self {
        Self::builder()
            .schedule(args.schedule)
            .maybe_step(args.step)
            .peak_demand(args.peak_demand)
            .max_iterations(args.max_iterations)
            .build()
    }
}

#[derive(Parser)]
pub struct OutputArgs {
    #[clap(long, env = "OUTPUT_FORMAT", default_value = "table")]
    pub format: Format,

    /// Write to the file instead of stdout.
    #[clap(long = "output", env = "OUTPUT_PATH")]
    pub path: Option<PathBuf>,

    /// Chart width in pixels.
    #[clap(long, env = "CHART_WIDTH", default_value = "1024")]
    pub width: u32,

    /// Chart height in pixels.
    #[clap(long, env = "CHART_HEIGHT", default_value = "768")]
    pub height: u32,
}

impl OutputArgs {
    fn write(&self, rendered: &str) -> Result {
        match &self.path {
            Some(path) => {
                fs::write(path, rendered)
                    .with_context(|| format!("failed to write `{}`", path.display()))?;
                info!(path = %path.display(), "written");
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}

#[instrument(skip_all)]
pub fn size(args: &SizeArgs) -> Result {
    let series = read_load_file(&args.input.file, &args.input.columns())?.into_logged();
    let day = select_day(&series, args.day, args.selection)?.into_day_series();
    info!(len = day.len(), "resampled the day");

    let sizer = Sizing::builder()
        .day(&day)
        .charge_period(args.charge_period)
        .discharge_period(args.discharge_period)
        .options(args.search.into())
        .try_prepare()?
        .into_logged();
    let curve = sizer.trade_off()?;
    info!(
        knee_hp_capacity = %curve.point_2.hp_capacity,
        knee_tes_capacity = %curve.point_2.tes_capacity,
        n_bottom = curve.bottom.len(),
        n_top = curve.top.len(),
        "built the trade-off curve",
    );

    let rendered = args.output.format.render(&curve, (args.output.width, args.output.height))?;
    args.output.write(&rendered)
}
