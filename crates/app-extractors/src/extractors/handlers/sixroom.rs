use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::decode_at,
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{fetch_json, header, headers_for, Client, HeaderMapExt, OsClass},
    url::{last_path_segment, query_value},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct SixRoom;

#[async_trait::async_trait]
impl Extractor for SixRoom {
    fn platform(&self) -> Platform {
        Platform::SixRoom
    }

    fn description(&self) -> &'static str {
        "6.cn mini videos"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let video_id = video_id_from_url(share_url)?;
        debug!(?video_id, "Got sixroom video id from share url");

        self.parse_video_id(&video_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let headers = headers_for(OsClass::Ios)
            .with_header(header::REFERER, &format!("https://m.6.cn/v/{video_id}"));

        let resp = fetch_json::<Value>(
            Client::base()?
                .get("https://v.6.cn/coop/mobile/index.php")
                .query(&[
                    ("padapi", "minivideo-watchVideo.php"),
                    ("av", "3.0"),
                    ("encpass", ""),
                    ("logiuid", ""),
                    ("isnew", "1"),
                    ("from", "0"),
                    ("vid", video_id),
                ])
                .headers(headers),
            "sixroom video info",
        )
        .await?;
        trace!(?resp, "Got sixroom video info");

        let content: Content = decode_at(&resp, "/content")?;

        Ok(content.into())
    }
}

fn video_id_from_url(share_url: &str) -> ExtractorResult<String> {
    if share_url.contains("watchMini.php?vid=") {
        return Ok(query_value(share_url, "vid")?);
    }

    last_path_segment(share_url)
        .map(ToString::to_string)
        .ok_or_else(|| ExtractorError::invalid_argument("no video id in sixroom share url"))
}

#[derive(Debug, Deserialize)]
struct Content {
    playurl: String,
    #[serde(default)]
    picurl: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    alias: String,
    #[serde(default)]
    picuser: String,
}

impl From<Content> for MediaDescriptor {
    fn from(content: Content) -> Self {
        Self::new(content.playurl, content.picurl)
            .with_title(content.title)
            .with_author(MediaAuthor::new("", content.alias, content.picuser))
    }
}
