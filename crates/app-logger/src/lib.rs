use std::env;

use tracing::Level;
pub use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "VIDEO_PARSER_LOG_LEVEL";

pub const COMPONENT_LEVELS: &[(&str, Level)] = &[
    ("video_parser_cli", Level::INFO),
    ("app_config", Level::INFO),
    ("app_extractors", Level::INFO),
    ("app_helpers", Level::INFO),
    ("app_logger", Level::INFO),
];

/// Initialize the logger
///
/// Logs go to stderr so that stdout stays free for results.
///
/// # Panics
/// Panics if the logger fails to initialize
pub fn init() {
    init_with(COMPONENT_LEVELS.to_vec());
}

pub fn init_with_app_level(level: Level) {
    let levels = COMPONENT_LEVELS
        .iter()
        .map(|(k, _v)| (k.to_owned(), level))
        .collect::<Vec<_>>();

    init_with(levels);
}

pub fn init_with<T>(levels: T)
where
    T: IntoIterator<Item = (&'static str, Level)>,
{
    let mut filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .parse_lossy(default_directives(levels));

    for d in parse_directives(&env::var(LOG_LEVEL_ENV).unwrap_or_default()) {
        filter = filter.add_directive(d);
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .expect("setting default subscriber failed");
}

fn default_directives<T>(levels: T) -> String
where
    T: IntoIterator<Item = (&'static str, Level)>,
{
    levels
        .into_iter()
        .map(|(k, v)| {
            if k.is_empty() {
                v.to_string()
            } else {
                format!("{}={}", k, v)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse comma separated directives, skipping (and reporting) invalid ones.
fn parse_directives(raw: &str) -> Vec<Directive> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(d) => Some(d),
            Err(e) => {
                eprintln!("Failed to parse log level directive {s:?}: {e:?}");
                None
            }
        })
        .collect()
}
