use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::ExtractorResult,
    json::{decode_at, string_or_number},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{default_headers, fetch_json, Client},
    url::query_value,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct DouPai;

#[async_trait::async_trait]
impl Extractor for DouPai {
    fn platform(&self) -> Platform {
        Platform::DouPai
    }

    fn description(&self) -> &'static str {
        "Doupai topic videos"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let video_id = query_value(share_url, "id")?;
        debug!(?video_id, "Got doupai video id from share url");

        self.parse_video_id(&video_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let resp = fetch_json::<Value>(
            Client::base()?
                .get(format!("https://v2.doupai.cc/topic/{video_id}.json"))
                .headers(default_headers()),
            "doupai topic",
        )
        .await?;
        trace!(?resp, "Got doupai topic");

        let topic: Topic = decode_at(&resp, "/data")?;

        Ok(topic.into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Topic {
    video_url: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    name: String,
    user_id: TopicUser,
}

#[derive(Debug, Deserialize)]
struct TopicUser {
    #[serde(default, deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    avatar: String,
}

impl From<Topic> for MediaDescriptor {
    fn from(topic: Topic) -> Self {
        Self::new(topic.video_url, topic.image_url)
            .with_title(topic.name)
            .with_author(MediaAuthor::new(
                topic.user_id.id,
                topic.user_id.name,
                topic.user_id.avatar,
            ))
    }
}
