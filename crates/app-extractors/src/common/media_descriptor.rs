use serde::{Deserialize, Serialize};

use super::extractor_error::{ExtractorError, ExtractorResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAuthor {
    pub uid: String,
    pub name: String,
    pub avatar: String,
}
impl MediaAuthor {
    #[must_use]
    pub fn new<U, N, A>(uid: U, name: N, avatar: A) -> Self
    where
        U: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            uid: uid.into(),
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    pub url: String,
    /// Motion photo video backing the image. Empty for static images.
    pub live_photo_url: String,
}
impl ImageItem {
    #[must_use]
    pub fn new<T: Into<String>>(url: T) -> Self {
        Self {
            url: url.into(),
            live_photo_url: String::new(),
        }
    }

    #[must_use]
    pub fn with_live_photo<T: Into<String>>(mut self, live_photo_url: T) -> Self {
        self.live_photo_url = live_photo_url.into();
        self
    }
}

/// The normalized result of parsing a share link or video id.
///
/// A post is either a video or a gallery. Once [`MediaDescriptor::with_images`]
/// receives a non-empty gallery the video url is cleared, since the "video"
/// some platforms return next to a gallery is not playable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub video_url: String,
    pub cover_url: String,
    pub title: String,
    pub music_url: String,
    pub images: Vec<ImageItem>,
    pub author: MediaAuthor,
}
impl MediaDescriptor {
    #[must_use]
    pub fn new<V, C>(video_url: V, cover_url: C) -> Self
    where
        V: Into<String>,
        C: Into<String>,
    {
        Self {
            video_url: video_url.into(),
            cover_url: cover_url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_title<T: Into<String>>(mut self, title: T) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_music_url<T: Into<String>>(mut self, music_url: T) -> Self {
        self.music_url = music_url.into();
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: MediaAuthor) -> Self {
        self.author = author;
        self
    }

    #[must_use]
    pub fn with_images<I>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = ImageItem>,
    {
        self.images = images.into_iter().collect();
        if !self.images.is_empty() {
            self.video_url.clear();
        }
        self
    }

    #[must_use]
    pub fn is_gallery(&self) -> bool {
        !self.images.is_empty()
    }

    /// Fail with a shape mismatch on `anchor` when there is neither a video
    /// nor a gallery to hand out.
    pub fn require_media(self, anchor: &str) -> ExtractorResult<Self> {
        if self.video_url.is_empty() && self.images.is_empty() {
            return Err(ExtractorError::shape_mismatch(format!(
                "`{anchor}` missing from payload"
            )));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_clears_placeholder_video() {
        let descriptor = MediaDescriptor::new("https://cdn.example.com/placeholder.mp4", "cover")
            .with_images([ImageItem::new("https://cdn.example.com/1.jpg")]);

        assert!(descriptor.is_gallery());
        assert!(descriptor.video_url.is_empty());
    }

    #[test]
    fn descriptor_without_media_is_rejected() {
        let err = MediaDescriptor::new("", "https://cdn.example.com/cover.jpg")
            .with_title("title")
            .require_media("/video/url")
            .expect_err("no media");

        assert!(matches!(err, ExtractorError::UpstreamShapeMismatch(ref m) if m.contains("/video/url")));
    }

    #[test]
    fn gallery_counts_as_media() {
        let descriptor = MediaDescriptor::default()
            .with_images([ImageItem::new("https://cdn.example.com/1.jpg")])
            .require_media("/video/url")
            .expect("gallery");

        assert!(descriptor.is_gallery());
    }

    #[test]
    fn empty_gallery_keeps_video() {
        let descriptor =
            MediaDescriptor::new("https://cdn.example.com/v.mp4", "cover").with_images([]);

        assert!(!descriptor.is_gallery());
        assert_eq!(descriptor.video_url, "https://cdn.example.com/v.mp4");
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let descriptor = MediaDescriptor::new("v", "c")
            .with_images([ImageItem::new("i").with_live_photo("l")])
            .with_author(MediaAuthor::new("1", "name", "avatar"));

        let json = serde_json::to_value(&descriptor).expect("serializable");

        assert_eq!(json["images"][0]["live_photo_url"], "l");
        assert_eq!(json["author"]["uid"], "1");
        assert_eq!(json["music_url"], "");
    }
}
