use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    html::capture,
    json::{decode_at, parse_json, string_or_number},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{fetch_text, headers_for, Client, OsClass},
    url::query_value,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct QuanMinKGe;

const PAGE_DATA: &str = "window.__DATA__";

static PAGE_DATA_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)window\.__DATA__ = (.*?); </script>").expect("Invalid regex"));

#[async_trait::async_trait]
impl Extractor for QuanMinKGe {
    fn platform(&self) -> Platform {
        Platform::QuanMinKGe
    }

    fn description(&self) -> &'static str {
        "WeSing (Quanmin K Ge) performances"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let song_id = query_value(share_url, "s")?;
        debug!(?song_id, "Got quanminkge song id from share url");

        self.parse_video_id(&song_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let page = fetch_text(
            Client::base()?
                .get("https://kg.qq.com/node/play")
                .query(&[("s", video_id)])
                .headers(headers_for(OsClass::Windows)),
            "quanminkge play page",
        )
        .await?;
        trace!(len = page.len(), "Got quanminkge play page");

        descriptor_from_page(&page)
    }
}

#[derive(Debug, Deserialize)]
struct Detail {
    #[serde(default)]
    playurl_video: String,
    /// Audio-only performances have no video but always carry the track.
    #[serde(default)]
    playurl: String,
    #[serde(default)]
    cover: String,
    #[serde(default)]
    content: String,
    #[serde(default, deserialize_with = "string_or_number")]
    uid: String,
    #[serde(default)]
    nick: String,
    #[serde(default)]
    avatar: String,
}

fn descriptor_from_page(page: &str) -> ExtractorResult<MediaDescriptor> {
    let data = parse_json(capture(&PAGE_DATA_JSON, page, PAGE_DATA)?, PAGE_DATA)?;
    let detail: Detail = decode_at(&data, "/detail")?;

    if detail.playurl_video.is_empty() && detail.playurl.is_empty() {
        return Err(ExtractorError::shape_mismatch(
            "`/detail/playurl_video` and `/detail/playurl` missing from payload",
        ));
    }

    Ok(MediaDescriptor::new(detail.playurl_video, detail.cover)
        .with_title(detail.content)
        .with_music_url(detail.playurl)
        .with_author(MediaAuthor::new(detail.uid, detail.nick, detail.avatar)))
}
