pub use handlers::Adapter;

pub mod handlers;

use crate::common::{
    extractor_error::ExtractorResult, media_descriptor::MediaDescriptor, platform::Platform,
};

/// One platform's way of turning a share link or a video id into a
/// [`MediaDescriptor`].
///
/// Implementations hold no state between calls.
#[async_trait::async_trait]
pub trait Extractor {
    fn platform(&self) -> Platform;

    fn description(&self) -> &'static str;

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor>;

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor>;
}
