use serde_json::Value;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::{required, str_or_empty},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{default_headers, fetch_json, Client},
    url::query_value,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct QuanMin;

#[async_trait::async_trait]
impl Extractor for QuanMin {
    fn platform(&self) -> Platform {
        Platform::QuanMin
    }

    fn description(&self) -> &'static str {
        "Duxiaoshi (formerly Quanmin) videos"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let video_id = query_value(share_url, "vid")?;
        debug!(?video_id, "Got quanmin video id from share url");

        self.parse_video_id(&video_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let resp = fetch_json::<Value>(
            Client::base()?
                .get("https://quanmin.hao222.com/wise/growth/api/sv/immerse")
                .query(&[
                    ("source", "share-h5"),
                    ("pd", "qm_share_mvideo"),
                    ("_format", "json"),
                    ("vid", video_id),
                ])
                .headers(default_headers()),
            "quanmin video info",
        )
        .await?;
        trace!(?resp, "Got quanmin video info");

        descriptor_from_response(&resp)
    }
}

fn descriptor_from_response(resp: &Value) -> ExtractorResult<MediaDescriptor> {
    if resp.get("errno").and_then(Value::as_i64).unwrap_or_default() != 0 {
        return Err(ExtractorError::reported(str_or_empty(resp, "/error")));
    }

    let data = required(resp, "/data")?;

    let status = str_or_empty(data, "/meta/statusText");
    if !status.is_empty() {
        return Err(ExtractorError::reported(status));
    }

    let mut title = str_or_empty(data, "/meta/title");
    if title.is_empty() {
        title = str_or_empty(data, "/shareInfo/title");
    }

    Ok(
        MediaDescriptor::new(video_url(data)?, str_or_empty(data, "/meta/image"))
            .with_title(title)
            .with_author(MediaAuthor::new(
                str_or_empty(data, "/author/id"),
                str_or_empty(data, "/author/name"),
                str_or_empty(data, "/author/icon"),
            )),
    )
}

/// The second clarity is the watermark-free one; older posts only have one.
fn video_url(data: &Value) -> ExtractorResult<String> {
    let clarities = required(data, "/meta/video_info/clarityUrl")?
        .as_array()
        .ok_or_else(|| ExtractorError::shape_mismatch("`clarityUrl` is not a list"))?;

    clarities
        .get(1)
        .or_else(|| clarities.last())
        .map(|x| str_or_empty(x, "/url"))
        .filter(|x| !x.is_empty())
        .ok_or_else(|| ExtractorError::shape_mismatch("no playable clarity in quanmin video"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(meta: Value) -> Value {
        json!({ "errno": 0, "data": {
            "meta": meta,
            "shareInfo": { "title": "shared title" },
            "author": { "id": "a1", "name": "writer", "icon": "https://i.jpg" }
        }})
    }

    #[test]
    fn errno_is_reported() {
        let err = descriptor_from_response(&json!({ "errno": 2, "error": "vid invalid" }))
            .expect_err("errno is set");

        assert_eq!(err.to_string(), "vid invalid");
    }

    #[test]
    fn status_text_is_reported() {
        let err = descriptor_from_response(&response(json!({ "statusText": "该视频已删除" })))
            .expect_err("status text set");

        assert_eq!(err.to_string(), "该视频已删除");
    }

    #[test]
    fn second_clarity_and_share_title_are_used() {
        let resp = response(json!({
            "statusText": "",
            "title": "",
            "image": "https://c.jpg",
            "video_info": { "clarityUrl": [{ "url": "https://sd.mp4" }, { "url": "https://hd.mp4" }] }
        }));

        let descriptor = descriptor_from_response(&resp).expect("valid");

        assert_eq!(descriptor.video_url, "https://hd.mp4");
        assert_eq!(descriptor.title, "shared title");
        assert_eq!(descriptor.author.uid, "a1");
    }

    #[test]
    fn single_clarity_falls_back_to_last() {
        let resp = response(json!({
            "title": "own title",
            "video_info": { "clarityUrl": [{ "url": "https://only.mp4" }] }
        }));

        let descriptor = descriptor_from_response(&resp).expect("valid");

        assert_eq!(descriptor.video_url, "https://only.mp4");
        assert_eq!(descriptor.title, "own title");
    }
}
