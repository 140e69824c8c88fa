use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

use super::{video_id_unsupported, Extractor};
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    html::{capture, normalize_js_literals},
    json::{parse_json, required, str_or_empty},
    media_descriptor::{ImageItem, MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{fetch_text, headers_for, Client, OsClass},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct RedBook;

const INITIAL_STATE: &str = "window.__INITIAL_STATE__";

static INITIAL_STATE_JS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)window\.__INITIAL_STATE__\s*=\s*(.*?)</script>").expect("Invalid regex")
});

const H264_MASTER_URL: &str = "/stream/h264/0/masterUrl";

#[async_trait::async_trait]
impl Extractor for RedBook {
    fn platform(&self) -> Platform {
        Platform::RedBook
    }

    fn description(&self) -> &'static str {
        "Xiaohongshu notes"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let page = fetch_text(
            Client::base()?
                .get(share_url)
                .headers(headers_for(OsClass::Windows)),
            "redbook note page",
        )
        .await?;
        trace!(len = page.len(), "Got redbook note page");

        descriptor_from_page(&page)
    }

    async fn parse_video_id(&self, _video_id: &str) -> ExtractorResult<MediaDescriptor> {
        Err(video_id_unsupported(self.platform()))
    }
}

fn descriptor_from_page(page: &str) -> ExtractorResult<MediaDescriptor> {
    let state = normalize_js_literals(capture(&INITIAL_STATE_JS, page, INITIAL_STATE)?);
    let state = parse_json(&state, INITIAL_STATE)?;

    descriptor_from_state(&state)
}

fn descriptor_from_state(state: &Value) -> ExtractorResult<MediaDescriptor> {
    // Expired share links render a page whose current note id is `undefined`
    let note_id = match state.pointer("/note/currentNoteId") {
        Some(Value::String(x)) if !x.is_empty() && x != "undefined" => x.as_str(),
        Some(Value::Null | Value::String(_)) => {
            return Err(ExtractorError::reported(
                "note id is undefined, the share link has probably expired",
            ))
        }
        _ => {
            return Err(ExtractorError::shape_mismatch(
                "`/note/currentNoteId` missing from payload",
            ))
        }
    };
    debug!(?note_id, "Got redbook note id");

    let note = required(state, &format!("/note/noteDetailMap/{note_id}/note"))?;

    let video_url = str_or_empty(note, &format!("/video/media{H264_MASTER_URL}"));

    let images = if video_url.is_empty() {
        note.get("imageList")
            .and_then(Value::as_array)
            .map(|x| x.iter().filter_map(image_from_value).collect::<Vec<_>>())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    MediaDescriptor::new(video_url, str_or_empty(note, "/imageList/0/urlDefault"))
        .with_title(str_or_empty(note, "/title"))
        .with_author(MediaAuthor::new(
            str_or_empty(note, "/user/userId"),
            str_or_empty(note, "/user/nickname"),
            str_or_empty(note, "/user/avatar"),
        ))
        .with_images(images)
        .require_media(&format!("/video/media{H264_MASTER_URL}"))
}

fn image_from_value(image: &Value) -> Option<ImageItem> {
    let url = image.get("urlDefault")?.as_str()?;

    let mut item = ImageItem::new(watermark_free_image_url(url)?);
    if image.get("livePhoto").and_then(Value::as_bool) == Some(true) {
        item = item.with_live_photo(str_or_empty(image, H264_MASTER_URL));
    }

    Some(item)
}

/// Some CDN hosts serve watermarked copies, so images are re-pointed at the
/// origin bucket by their id.
fn watermark_free_image_url(url: &str) -> Option<String> {
    let image_id = url.rsplit('/').next()?.split('!').next()?;
    if image_id.is_empty() {
        return None;
    }

    let spectrum = if url.contains("spectrum") {
        "spectrum/"
    } else {
        ""
    };

    Some(format!(
        "https://ci.xiaohongshu.com/notes_pre_post/{spectrum}{image_id}?imageView2/format/jpg"
    ))
}
