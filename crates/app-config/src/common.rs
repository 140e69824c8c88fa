use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{cli::CliArgs, BIN_NAME};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Inputs"))]
pub struct InputConfig {
    #[clap(flatten)]
    #[validate(nested)]
    pub entries_group: EntriesGroup,

    /// Platform of the ids given with `--id`
    ///
    /// Case insensitive platform tag, eg. `douyin` or `BiliBili`.
    #[arg(short = 'p', long, requires = "ids")]
    #[validate(custom(function = "non_blank"))]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[group(required = true, multiple = true)]
pub struct EntriesGroup {
    /// Platform-native video ids to resolve
    ///
    /// Requires `--platform`.
    #[arg(short = 'i', long = "id", id = "ids", requires = "platform")]
    pub ids: Vec<String>,

    /// Share links or the text copied from an app's share button
    ///
    /// The first link found in each entry is used.
    #[arg(id = "SHARE_TEXT")]
    pub share_texts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Resolve options"))]
pub struct ResolveConfig {
    /// Give up on a single entry after this many seconds
    ///
    /// No deadline is applied when unset.
    #[arg(long, env = "VIDEO_PARSER_DEADLINE_SECS")]
    #[validate(range(min = 1, max = 600))]
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Output options"))]
pub struct OutputConfig {
    /// Pretty print the JSON results
    #[arg(long, env = "VIDEO_PARSER_PRETTY")]
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ValueEnum)]
pub enum DumpConfigType {
    Json,
    Toml,
}
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[allow(clippy::option_option)]
#[clap(next_help_heading = Some("Run options"))]
pub struct RunConfig {
    /// Dump the config to stdout
    #[arg(long, value_enum, default_value = None)]
    pub dump_config: Option<Option<DumpConfigType>>,

    /// Dump shell completions to stdout
    #[arg(long, default_value = None, value_name = "SHELL", value_parser = hacky_dump_completions())]
    #[serde(skip)]
    pub dump_completions: Option<Shell>,
}

#[must_use]
pub fn hacky_dump_completions() -> impl clap::builder::TypedValueParser {
    move |s: &str| {
        let parsed = Shell::from_str(s, true);

        if let Ok(shell) = &parsed {
            clap_complete::generate(
                *shell,
                &mut CliArgs::command(),
                BIN_NAME,
                &mut std::io::stdout(),
            );
            std::process::exit(0);
        }

        parsed
            .map(|_| ())
            .map_err(|_| ValidationError::new("Invalid shell"))
    }
}

pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("Value must not be blank"));
    }

    Ok(())
}
