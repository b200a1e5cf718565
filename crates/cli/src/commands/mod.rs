//! Command implementations for the gearaxis CLI

pub mod list;
pub mod run;
pub mod table;

use clap::Args;

use crate::config::AxisRangeArgs;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Only show devices the default name patterns accept
    #[arg(long)]
    pub shifters_only: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TableArgs {
    #[command(flatten)]
    pub axis: AxisRangeArgs,
}
