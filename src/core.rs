pub mod day;
mod diagnostics;
mod error;
pub mod period;
pub mod series;
pub mod sizing;

pub use self::{
    diagnostics::{Diagnosed, Warning},
    error::{Curve, SizingError},
};
