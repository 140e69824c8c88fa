use serde_json::Value;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::{required, str_or_empty},
    media_descriptor::{ImageItem, MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{capture_redirect, default_headers, fetch_json, Client},
    url::last_path_segment,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct PiPiXia;

const HIGH_VIDEO_URL: &str = "/video/video_high/url_list/0/url";

#[async_trait::async_trait]
impl Extractor for PiPiXia {
    fn platform(&self) -> Platform {
        Platform::PiPiXia
    }

    fn description(&self) -> &'static str {
        "Pipixia videos and image posts"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let redirect = capture_redirect(share_url, default_headers(), "pipixia share link").await?;

        let cell_id = last_path_segment(&redirect.location).ok_or_else(|| {
            ExtractorError::shape_mismatch("pipixia redirect has no item id in its path")
        })?;
        debug!(?cell_id, "Got pipixia item id from share url");

        self.parse_video_id(cell_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let resp = fetch_json::<Value>(
            Client::without_redirects()?
                .get("https://api.pipix.com/bds/cell/cell_comment/")
                .query(&[
                    ("offset", "0"),
                    ("cell_type", "1"),
                    ("api_version", "1"),
                    ("cell_id", video_id),
                    ("ac", "wifi"),
                    ("channel", "huawei_1319_64"),
                    ("aid", "1319"),
                    ("app_name", "super"),
                ])
                .headers(default_headers()),
            "pipixia cell comments",
        )
        .await?;
        trace!(?resp, "Got pipixia cell comments");

        descriptor_from_response(&resp)
    }
}

fn descriptor_from_response(resp: &Value) -> ExtractorResult<MediaDescriptor> {
    if resp.get("status_code").and_then(Value::as_i64) != Some(0) {
        return Err(ExtractorError::reported(format!(
            "failed to get pipixia item: {}",
            str_or_empty(resp, "/prompt")
        )));
    }

    let item = required(resp, "/data/cell_comments/0/comment_info/item")?;
    let author_id = str_or_empty(item, "/author/id");

    let images = item
        .pointer("/note/multi_image")
        .and_then(Value::as_array)
        .map(|x| {
            x.iter()
                .map(|image| str_or_empty(image, "/url_list/0/url"))
                .filter(|x| !x.is_empty())
                .map(ImageItem::new)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    MediaDescriptor::new(video_url(item, &author_id), str_or_empty(item, "/cover/url_list/0/url"))
        .with_title(str_or_empty(item, "/content"))
        .with_author(MediaAuthor::new(
            author_id,
            str_or_empty(item, "/author/name"),
            str_or_empty(item, "/author/avatar/download_list/0/url"),
        ))
        .with_images(images)
        .require_media(HIGH_VIDEO_URL)
}

/// The item's own video may carry a watermark. When the author reposted it
/// as a comment, that copy is clean.
fn video_url(item: &Value, author_id: &str) -> String {
    let from_author_comment = item
        .get("comments")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|x| x.get("item"))
        .filter(|x| !author_id.is_empty() && str_or_empty(x, "/author/id") == author_id)
        .map(|x| str_or_empty(x, HIGH_VIDEO_URL))
        .find(|x| !x.is_empty());

    from_author_comment.unwrap_or_else(|| str_or_empty(item, HIGH_VIDEO_URL))
}
