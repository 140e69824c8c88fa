use std::{future::Future, time::Duration};

use app_config::Config;
use app_extractors::{
    ErrorKind, ExtractorError, ExtractorResult, MediaDescriptor, Platform, Resolver,
};
use serde::Serialize;

/// One line of output, for one input entry.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OutputRecord {
    Resolved {
        input: String,
        platform: Platform,
        data: MediaDescriptor,
    },
    Failed {
        input: String,
        error: String,
        kind: FailureKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    Extractor(ErrorKind),
    TimedOut,
}

impl Serialize for FailureKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Extractor(kind) => kind.serialize(serializer),
            Self::TimedOut => serializer.serialize_str("timeout"),
        }
    }
}

impl OutputRecord {
    fn from_result(input: String, result: Result<(Platform, MediaDescriptor), Failure>) -> Self {
        match result {
            Ok((platform, data)) => Self::Resolved {
                input,
                platform,
                data,
            },
            Err(Failure::Extractor(e)) => Self::Failed {
                input,
                error: e.to_string(),
                kind: FailureKind::Extractor(e.kind()),
            },
            Err(Failure::TimedOut(after)) => Self::Failed {
                input,
                error: format!("gave up after {}s", after.as_secs()),
                kind: FailureKind::TimedOut,
            },
        }
    }

    const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn render(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[derive(Debug)]
enum Failure {
    Extractor(ExtractorError),
    TimedOut(Duration),
}

impl From<ExtractorError> for Failure {
    fn from(value: ExtractorError) -> Self {
        Self::Extractor(value)
    }
}

async fn with_deadline<F, T>(deadline: Option<Duration>, fut: F) -> Result<T, Failure>
where
    F: Future<Output = ExtractorResult<T>>,
{
    match deadline {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| Failure::TimedOut(after))?
            .map_err(Failure::from),
        None => fut.await.map_err(Failure::from),
    }
}

async fn resolve_id(
    resolver: &Resolver,
    platform_tag: &str,
    video_id: &str,
) -> ExtractorResult<(Platform, MediaDescriptor)> {
    let platform = platform_tag
        .parse::<Platform>()
        .map_err(|e| ExtractorError::invalid_argument(e.to_string()))?;

    let data = resolver.resolve_by_platform_id(platform, video_id).await?;

    Ok((platform, data))
}

/// The share link inside a pasted share text, or the text itself when
/// there is no recognizable link.
fn share_url_of(share_text: &str) -> &str {
    app_helpers::text::extract_first_url(share_text).unwrap_or(share_text)
}

#[tokio::main]
async fn main() {
    app_logger::init();

    let config = Config::global();

    app_logger::debug!(config = ?*config, "Running with config");

    let resolver = Resolver::default();
    let deadline = config.deadline();
    let input = &config.input;

    let share_jobs = input
        .entries_group
        .share_texts
        .iter()
        .map(|text| {
            let resolver = &resolver;
            async move {
                let share_url = share_url_of(text);
                app_logger::debug!(?text, ?share_url, "Resolving share text");

                let result = with_deadline(
                    deadline,
                    resolver.resolve_share_url_with_platform(share_url),
                )
                .await;

                OutputRecord::from_result(text.clone(), result)
            }
        })
        .collect::<Vec<_>>();

    let id_jobs = input
        .entries_group
        .ids
        .iter()
        .map(|id| {
            let resolver = &resolver;
            let platform = input.platform.as_deref().unwrap_or_default();
            async move {
                let result =
                    with_deadline(deadline, resolve_id(resolver, platform, id)).await;

                OutputRecord::from_result(id.clone(), result)
            }
        })
        .collect::<Vec<_>>();

    let (shared, by_id) = futures::future::join(
        futures::future::join_all(share_jobs),
        futures::future::join_all(id_jobs),
    )
    .await;

    let records = shared.into_iter().chain(by_id).collect::<Vec<_>>();

    let mut failed = 0_usize;
    for record in &records {
        if record.is_failure() {
            failed += 1;
        }

        match record.render(config.output.pretty) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                failed += 1;
                app_logger::error!(?record, "Failed to serialize result: {e}");
            }
        }
    }

    app_logger::info!(
        "Resolved {} of {} entries",
        records.len().saturating_sub(failed),
        records.len()
    );

    if failed > 0 {
        std::process::exit(1);
    }
}
