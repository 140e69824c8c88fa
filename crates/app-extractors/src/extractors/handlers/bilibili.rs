use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::{decode_at, str_or_empty, string_or_number},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{capture_redirect, fetch_json, header, Client, HeaderMap, HeaderMapExt},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct BiliBili;

/// Short links normally resolve in one hop, this only guards against loops.
const MAX_SHORT_LINK_HOPS: usize = 3;

#[async_trait::async_trait]
impl Extractor for BiliBili {
    fn platform(&self) -> Platform {
        Platform::BiliBili
    }

    fn description(&self) -> &'static str {
        "Bilibili videos"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let mut url = share_url.to_string();

        for hop in 0..=MAX_SHORT_LINK_HOPS {
            match classify_link(&url)? {
                Link::Video(bvid) => {
                    debug!(?bvid, "Got bilibili bvid from share url");
                    return self.parse_video_id(&bvid).await;
                }
                Link::Short if hop == MAX_SHORT_LINK_HOPS => break,
                Link::Short => {
                    url = capture_redirect(&url, request_headers(), "bilibili short link")
                        .await?
                        .location;
                    debug!(?url, "Expanded bilibili short link");
                }
            }
        }

        Err(ExtractorError::shape_mismatch(
            "bilibili short link redirects too many times",
        ))
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let view = fetch_json::<Value>(
            Client::base()?
                .get("https://api.bilibili.com/x/web-interface/view")
                .query(&[("bvid", video_id)])
                .headers(request_headers()),
            "bilibili video view",
        )
        .await?;
        trace!(?view, "Got bilibili video view");

        let view = View::from_response(&view)?;
        let cid = view
            .pages
            .first()
            .map(|x| x.cid.clone())
            .ok_or_else(|| ExtractorError::shape_mismatch("bilibili video has no pages"))?;

        let play = fetch_json::<Value>(
            Client::base()?
                .get("https://api.bilibili.com/x/player/playurl")
                .query(&[
                    ("otype", "json"),
                    ("fnver", "0"),
                    ("fnval", "0"),
                    ("qn", "80"),
                    ("bvid", video_id),
                    ("cid", cid.as_str()),
                    ("platform", "html5"),
                ])
                .headers(request_headers()),
            "bilibili play url",
        )
        .await?;
        trace!(?play, "Got bilibili play url");

        Ok(view.into_descriptor(video_url_from_play(&play)?))
    }
}

/// Fixed desktop Chrome user agent sent with every Bilibili request.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

fn request_headers() -> HeaderMap {
    HeaderMap::new()
        .with_header(header::USER_AGENT, USER_AGENT)
        .with_header(header::REFERER, "https://www.bilibili.com/")
}

#[derive(Debug, PartialEq, Eq)]
enum Link {
    Video(String),
    Short,
}

fn classify_link(url: &str) -> ExtractorResult<Link> {
    let parsed = url::Url::parse(url)
        .map_err(|e| ExtractorError::invalid_argument(format!("invalid bilibili url: {e}")))?;
    let host = parsed.host_str().unwrap_or_default();

    if host.contains("b23.tv") {
        return Ok(Link::Short);
    }

    if host.contains("bilibili.com") {
        let mut segments = parsed.path_segments().into_iter().flatten();
        if let (Some("video"), Some(bvid)) = (segments.next(), segments.next()) {
            if bvid.starts_with("BV") {
                return Ok(Link::Video(bvid.to_string()));
            }
        }
    }

    Err(ExtractorError::invalid_argument(format!(
        "{url:?} is not a bilibili video link"
    )))
}

#[derive(Debug, Deserialize)]
struct View {
    #[serde(default)]
    title: String,
    #[serde(default)]
    pic: String,
    pages: Vec<ViewPage>,
    #[serde(default)]
    owner: Owner,
}

#[derive(Debug, Deserialize)]
struct ViewPage {
    #[serde(deserialize_with = "string_or_number")]
    cid: String,
}

#[derive(Debug, Default, Deserialize)]
struct Owner {
    #[serde(default, deserialize_with = "string_or_number")]
    mid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    face: String,
}

impl View {
    fn from_response(resp: &Value) -> ExtractorResult<Self> {
        let has_pages = resp
            .pointer("/data/pages")
            .and_then(Value::as_array)
            .is_some_and(|x| !x.is_empty());

        if resp.get("code").and_then(Value::as_i64) != Some(0) || !has_pages {
            let message = str_or_empty(resp, "/message");
            return Err(ExtractorError::reported(format!(
                "bilibili video unavailable: {}",
                if message.is_empty() { "unknown error" } else { message.as_str() }
            )));
        }

        decode_at(resp, "/data")
    }

    fn into_descriptor(self, video_url: String) -> MediaDescriptor {
        MediaDescriptor::new(video_url, self.pic)
            .with_title(self.title)
            .with_author(MediaAuthor::new(self.owner.mid, self.owner.name, self.owner.face))
    }
}

fn video_url_from_play(resp: &Value) -> ExtractorResult<String> {
    let code = resp.get("code").and_then(Value::as_i64);
    if code != Some(0) {
        return Err(ExtractorError::reported(format!(
            "bilibili play url error: {} (code: {})",
            str_or_empty(resp, "/message"),
            code.map_or_else(|| "none".to_string(), |x| x.to_string()),
        )));
    }

    Some(str_or_empty(resp, "/data/durl/0/url"))
        .filter(|x| !x.is_empty())
        .ok_or_else(|| ExtractorError::shape_mismatch("no play url in bilibili response"))
}
