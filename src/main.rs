#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod cli;
mod core;
mod load;
mod prelude;
mod quantity;
mod render;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command, days, size},
    prelude::*,
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Size(args) => size(&args)?,
        Command::Days(args) => days(&args)?,
    }

    info!("done!");
    Ok(())
}
