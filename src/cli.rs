mod days;
mod input;
mod size;

use clap::{Parser, Subcommand};

pub use self::{days::days, size::size};
use crate::cli::{days::DaysArgs, size::SizeArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: build the heat pump and storage trade-off curve for the selected day.
    #[clap(name = "size")]
    Size(Box<SizeArgs>),

    /// Show daily load statistics and the days picked by each selection strategy.
    #[clap(name = "days")]
    Days(Box<DaysArgs>),
}
