use std::path::PathBuf;

use clap::Parser;

use crate::load::Columns;

#[derive(Parser)]
pub struct InputArgs {
    /// CSV file with the timestamped load readings, such as `2024-01-15 08:00,3.2 kW`.
    #[clap(long = "file", env = "LOAD_FILE")]
    pub file: PathBuf,

    /// Timestamp column name, defaults to the first column.
    #[clap(long, env = "INDEX_COLUMN")]
    pub index_column: Option<String>,

    /// Load column name, defaults to the first column after the timestamp.
    #[clap(long, env = "VALUE_COLUMN")]
    pub value_column: Option<String>,
}

impl InputArgs {
    pub fn columns(&self) -> Columns {
        Columns { index: self.index_column.clone(), value: self.value_column.clone() }
    }
}
