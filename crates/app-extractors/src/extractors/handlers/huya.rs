use once_cell::sync::Lazy;
use regex::Regex;
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
};

#[derive(Debug, Default, Clone, Copy)]
pub struct HuYa;

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d+)\.html").expect("Invalid regex"));

#[async_trait::async_trait]
impl Extractor for HuYa {
    fn platform(&self) -> Platform {
        Platform::HuYa
    }

    fn description(&self) -> &'static str {
        "Huya video moments"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let video_id = video_id_from_url(share_url)?;
        debug!(?video_id, "Got huya video id from share url");

        self.parse_video_id(video_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let headers =
            headers_for(OsClass::Windows).with_header(header::REFERER, "https://v.huya.com/");

        let resp = fetch_json::<Value>(
            Client::base()?
                .get("https://liveapi.huya.com/moment/getMomentContent")
                .query(&[("videoId", video_id)])
                .headers(headers),
            "huya moment content",
        )
        .await?;
        trace!(?resp, "Got huya moment content");

        descriptor_from_response(&resp)
    }
}

fn video_id_from_url(share_url: &str) -> ExtractorResult<&str> {
    VIDEO_ID
        .captures(share_url)
        .and_then(|x| x.get(1))
        .map(|x| x.as_str())
        .ok_or_else(|| ExtractorError::invalid_argument("no video id in huya share url"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoInfo {
    #[serde(default)]
    uid: i64,
    #[serde(default)]
    definitions: Vec<Definition>,
    #[serde(default)]
    video_cover: String,
    #[serde(default)]
    video_title: String,
    #[serde(default)]
    actor_nick: String,
    #[serde(default)]
    actor_avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct Definition {
    url: String,
}

fn descriptor_from_response(resp: &Value) -> ExtractorResult<MediaDescriptor> {
    let info: VideoInfo = decode_at(resp, "/data/moment/videoInfo")?;

    if info.uid == 0 {
        return Err(ExtractorError::reported("video not found"));
    }

    let video_url = info
        .definitions
        .into_iter()
        .next()
        .map(|x| x.url)
        .ok_or_else(|| ExtractorError::shape_mismatch("`definitions` of huya video is empty"))?;

    Ok(MediaDescriptor::new(video_url, info.video_cover)
        .with_title(info.video_title)
        .with_author(MediaAuthor::new(
            info.uid.to_string(),
            info.actor_nick,
            info.actor_avatar_url,
        )))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn video_id_comes_from_the_html_path() {
        assert_eq!(
            video_id_from_url("https://v.huya.com/play/903417457.html").expect("has id"),
            "903417457"
        );
        assert!(video_id_from_url("https://v.huya.com/play/").is_err());
    }

    #[test]
    fn zero_uid_means_the_video_is_gone() {
        let resp = json!({ "data": { "moment": { "videoInfo": { "uid": 0 } } } });

        let err = descriptor_from_response(&resp).expect_err("uid is zero");

        assert_eq!(err.to_string(), "video not found");
    }

    #[test]
    fn first_definition_is_used() {
        let resp = json!({ "data": { "moment": { "videoInfo": {
            "uid": 1199561,
            "definitions": [{ "url": "https://huya/1080.mp4" }, { "url": "https://huya/720.mp4" }],
            "videoCover": "https://huya/c.jpg",
            "videoTitle": "match",
            "actorNick": "caster",
            "actorAvatarUrl": "https://huya/a.jpg"
        }}}});

        let descriptor = descriptor_from_response(&resp).expect("valid");

        assert_eq!(descriptor.video_url, "https://huya/1080.mp4");
        assert_eq!(descriptor.author.uid, "1199561");
    }
}
