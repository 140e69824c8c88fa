use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};

use crate::common;

/// Resolve short video share links into watermark-free media urls.
///
/// Results are printed to stdout as one JSON object per line.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[clap(disable_help_flag = true)]
pub struct CliArgs {
    /// Print help
    #[clap(action = ArgAction::Help, long)]
    help: Option<bool>,

    #[command(flatten)]
    pub input: common::InputConfig,

    #[command(flatten)]
    pub resolve: common::ResolveConfig,

    #[command(flatten)]
    pub output: common::OutputConfig,

    #[command(flatten)]
    pub run: common::RunConfig,
}
