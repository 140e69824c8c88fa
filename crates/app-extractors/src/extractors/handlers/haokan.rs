use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::{decode_at, string_or_number},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{default_headers, fetch_json, Client},
    url::query_value,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct HaoKan;

#[async_trait::async_trait]
impl Extractor for HaoKan {
    fn platform(&self) -> Platform {
        Platform::HaoKan
    }

    fn description(&self) -> &'static str {
        "Baidu Haokan videos"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let video_id = query_value(share_url, "vid")?;
        debug!(?video_id, "Got haokan video id from share url");

        self.parse_video_id(&video_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let resp = fetch_json::<Value>(
            Client::base()?
                .get("https://haokan.baidu.com/v")
                .query(&[("_format", "json"), ("vid", video_id)])
                .headers(default_headers()),
            "haokan video info",
        )
        .await?;
        trace!(?resp, "Got haokan video info");

        descriptor_from_response(&resp)
    }
}

#[derive(Debug, Deserialize)]
struct CurVideoMeta {
    playurl: String,
    #[serde(default)]
    poster: String,
    #[serde(default)]
    title: String,
    mth: Mth,
}

#[derive(Debug, Deserialize)]
struct Mth {
    #[serde(default, deserialize_with = "string_or_number")]
    mthid: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    author_photo: String,
}

fn descriptor_from_response(resp: &Value) -> ExtractorResult<MediaDescriptor> {
    let errno = resp
        .get("errno")
        .and_then(Value::as_i64)
        .ok_or_else(|| ExtractorError::shape_mismatch("`errno` missing from haokan response"))?;

    if errno != 0 {
        let reason = resp
            .get("error")
            .and_then(Value::as_str)
            .filter(|x| !x.is_empty())
            .map_or_else(|| format!("haokan responded with errno {errno}"), ToString::to_string);

        return Err(ExtractorError::reported(reason));
    }

    let meta: CurVideoMeta = decode_at(resp, "/data/apiData/curVideoMeta")?;

    Ok(MediaDescriptor::new(meta.playurl, meta.poster)
        .with_title(meta.title)
        .with_author(MediaAuthor::new(
            meta.mth.mthid,
            meta.mth.author_name,
            meta.mth.author_photo,
        )))
}
