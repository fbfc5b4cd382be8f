use clap::{Parser, ValueEnum};
use itertools::Itertools;

use crate::{
    cli::input::InputArgs,
    core::day::{DaySelection, daily_stats, select_day},
    load::read_load_file,
    prelude::*,
    render::render_daily_stats,
};

#[derive(Parser)]
pub struct DaysArgs {
    #[clap(flatten)]
    pub input: InputArgs,
}

#[instrument(skip_all)]
pub fn days(args: &DaysArgs) -> Result {
    let series = read_load_file(&args.input.file, &args.input.columns())?.into_logged();
    let stats = daily_stats(&series);

    let mut marks = Vec::new();
    for selection in DaySelection::value_variants() {
        let Some(name) = selection.to_possible_value() else { continue };
        let selected = select_day(&series, None, *selection)?;
        marks.extend(selected.dates.into_iter().map(|date| (date, name.get_name().to_owned())));
    }
    let marks = marks.iter().map(|(date, name)| (*date, name.as_str())).collect_vec();

    println!("{}", render_daily_stats(&stats, &marks));
    Ok(())
}
