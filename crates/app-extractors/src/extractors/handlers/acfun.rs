use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::Extractor;
use crate::common::{
    extractor_error::ExtractorResult,
    html::{capture, HtmlDocument},
    json::{parse_json, required_str, str_or_empty},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{default_headers, fetch_text, Client},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct AcFun;

static VIDEO_INFO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"var videoInfo =\s(.*?);").expect("Invalid regex"));
static PLAY_INFO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"var playInfo =\s(.*?);").expect("Invalid regex"));

#[async_trait::async_trait]
impl Extractor for AcFun {
    fn platform(&self) -> Platform {
        Platform::AcFun
    }

    fn description(&self) -> &'static str {
        "AcFun videos (m3u8 playlists)"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let page = fetch_text(
            Client::base()?.get(share_url).headers(default_headers()),
            "acfun video page",
        )
        .await?;
        trace!(len = page.len(), "Got acfun video page");

        descriptor_from_page(&page)
    }

    /// Ids look like `ac36935385`.
    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        self.parse_share_url(&format!("https://www.acfun.cn/v/{video_id}"))
            .await
    }
}

fn descriptor_from_page(page: &str) -> ExtractorResult<MediaDescriptor> {
    let video_info = parse_json(capture(&VIDEO_INFO, page, "var videoInfo")?, "var videoInfo")?;
    let play_info = parse_json(capture(&PLAY_INFO, page, "var playInfo")?, "var playInfo")?;

    let doc = HtmlDocument::parse(page);
    let uid = doc
        .attr("div.up-info > a.info-item1", "href")
        .map(|x| x.replace("/upPage/", ""))
        .unwrap_or_default();

    Ok(MediaDescriptor::new(
        required_str(&play_info, "/streams/0/playUrls/0")?,
        str_or_empty(&video_info, "/cover"),
    )
    .with_title(str_or_empty(&video_info, "/title"))
    .with_author(MediaAuthor::new(
        uid,
        doc.text("div.up-info span.up-name").unwrap_or_default(),
        doc.attr("div.up-info span.up-avatar > img", "src")
            .unwrap_or_default(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::extractor_error::ExtractorError;

    const PAGE: &str = r#"<html><head><script>
        var videoInfo = {"title":"a song","cover":"https://imgs.aixifan.com/c.jpg"};
        var playInfo = {"streams":[{"playUrls":["https://tx-safety-video.acfun.cn/a.m3u8"]}]};
    </script></head><body>
        <div class="up-info">
            <a class="info-item1" href="/upPage/51423">up</a>
            <span class="up-name"> uploader </span>
            <span class="up-avatar"><img src="https://imgs.aixifan.com/a.jpg"></span>
        </div>
    </body></html>"#;

    #[test]
    fn page_is_mapped() {
        let descriptor = descriptor_from_page(PAGE).expect("valid");

        assert_eq!(descriptor.video_url, "https://tx-safety-video.acfun.cn/a.m3u8");
        assert_eq!(descriptor.cover_url, "https://imgs.aixifan.com/c.jpg");
        assert_eq!(descriptor.title, "a song");
        assert_eq!(
            descriptor.author,
            MediaAuthor::new("51423", "uploader", "https://imgs.aixifan.com/a.jpg")
        );
    }

    #[test]
    fn missing_play_info_is_a_shape_mismatch() {
        let page = r#"<script>var videoInfo = {"title":"t"};</script>"#;

        let err = descriptor_from_page(page).expect_err("no play info");

        assert!(matches!(err, ExtractorError::UpstreamShapeMismatch(ref m) if m.contains("playInfo")));
    }
}
