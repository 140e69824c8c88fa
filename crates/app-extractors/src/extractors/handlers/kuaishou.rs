use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, trace};

use super::{video_id_unsupported, Extractor};
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::{decode_at, required},
    media_descriptor::{ImageItem, MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{capture_redirect, fetch_json, header, headers_for, Client, HeaderMapExt, OsClass},
    url::last_path_segment,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct KuaiShou;

#[async_trait::async_trait]
impl Extractor for KuaiShou {
    fn platform(&self) -> Platform {
        Platform::KuaiShou
    }

    fn description(&self) -> &'static str {
        "Kuaishou videos and photo atlases"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        // The same user agent has to be used for both requests or the
        // photo info endpoint answers with a captcha
        let headers = headers_for(OsClass::Ios);

        let redirect = capture_redirect(
            share_url,
            headers
                .clone()
                .with_header(header::REFERER, "https://v.kuaishou.com/"),
            "kuaishou share link",
        )
        .await?;
        debug!(location = ?redirect.location, cookies = redirect.cookies.len(), "Got kuaishou share link redirect");

        let photo_id = last_path_segment(&redirect.location).ok_or_else(|| {
            ExtractorError::shape_mismatch("kuaishou redirect has no photo id in its path")
        })?;
        debug!(?photo_id, "Got kuaishou photo id");

        let headers = headers
            .with_header(header::ORIGIN, "https://m.gifshow.com")
            .with_header(header::REFERER, &redirect.location)
            .with_header(header::COOKIE, &redirect.cookie_header());

        let resp = fetch_json::<Value>(
            Client::base()?
                .post("https://m.gifshow.com/rest/wd/photo/info?kpn=KUAISHOU&captchaToken=")
                .headers(headers)
                .json(&photo_info_request(photo_id)),
            "kuaishou photo info",
        )
        .await?;
        trace!(?resp, "Got kuaishou photo info");

        descriptor_from_response(&resp)
    }

    async fn parse_video_id(&self, _video_id: &str) -> ExtractorResult<MediaDescriptor> {
        Err(video_id_unsupported(self.platform()))
    }
}

fn photo_info_request(photo_id: &str) -> Value {
    json!({
        "fid": "0",
        "shareResourceType": "PHOTO_OTHER",
        "shareChannel": "share_copylink",
        "kpn": "KUAISHOU",
        "subBiz": "BROWSE_SLIDE_PHOTO",
        "env": "SHARE_VIEWER_ENV_TX_TRICK",
        "h5Domain": "m.gifshow.com",
        "photoId": photo_id,
        "isLongVideo": false,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Photo {
    #[serde(default)]
    main_mv_urls: Vec<UrlEntry>,
    #[serde(default)]
    cover_urls: Vec<UrlEntry>,
    #[serde(default)]
    caption: String,
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    head_url: String,
    #[serde(default, rename = "ext_params")]
    ext_params: ExtParams,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExtParams {
    #[serde(default)]
    atlas: Atlas,
}

#[derive(Debug, Default, Deserialize)]
struct Atlas {
    #[serde(default)]
    cdn: Vec<String>,
    #[serde(default)]
    list: Vec<String>,
}

impl Atlas {
    fn images(&self) -> Vec<ImageItem> {
        let Some(cdn) = self.cdn.first() else {
            return Vec::new();
        };

        self.list
            .iter()
            .map(|path| ImageItem::new(format!("https://{cdn}/{path}")))
            .collect()
    }
}

fn descriptor_from_response(resp: &Value) -> ExtractorResult<MediaDescriptor> {
    let result = required(resp, "/result")?;
    if result.as_i64() != Some(1) {
        return Err(ExtractorError::reported(format!(
            "failed to get kuaishou photo info: result={result}"
        )));
    }

    let photo: Photo = decode_at(resp, "/photo")?;

    let video_url = photo
        .main_mv_urls
        .first()
        .map(|x| x.url.as_str())
        .unwrap_or_default();
    let cover_url = photo
        .cover_urls
        .first()
        .map(|x| x.url.as_str())
        .unwrap_or_default();

    MediaDescriptor::new(video_url, cover_url)
        .with_title(photo.caption)
        .with_author(MediaAuthor::new("", photo.user_name, photo.head_url))
        .with_images(photo.ext_params.atlas.images())
        .require_media("/photo/mainMvUrls/0/url")
}
