use tracing::{debug, info};

use crate::{
    common::{
        extractor_error::{ExtractorError, ExtractorResult},
        media_descriptor::MediaDescriptor,
        platform::Platform,
    },
    extractors::Extractor,
    registry::Registry,
};

/// Entry point for turning share urls or `(platform, id)` pairs into
/// [`MediaDescriptor`]s.
///
/// No deadline is applied here. Callers that need one should wrap the
/// returned future in `tokio::time::timeout`.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    registry: Registry,
}

impl Resolver {
    #[must_use]
    pub const fn new(registry: Registry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[tracing::instrument(skip(self))]
    pub async fn resolve_by_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let (platform, descriptor) = self.resolve_share_url_with_platform(share_url).await?;
        info!(?platform, "Resolved share url");

        Ok(descriptor)
    }

    /// Like [`Resolver::resolve_by_share_url`], but also says which platform
    /// handled the url.
    pub async fn resolve_share_url_with_platform(
        &self,
        share_url: &str,
    ) -> ExtractorResult<(Platform, MediaDescriptor)> {
        let share_url = share_url.trim();
        if share_url.is_empty() {
            return Err(ExtractorError::invalid_argument("share url is empty"));
        }

        let platform = self
            .registry
            .lookup_by_url(share_url)
            .ok_or_else(|| ExtractorError::SourceNotConfigured(share_url.to_string()))?;
        debug!(?platform, "Matched share url to platform");

        let adapter = self
            .registry
            .lookup_adapter(platform)
            .ok_or(ExtractorError::unsupported(platform, "parsing share urls"))?;

        let descriptor = adapter.parse_share_url(share_url).await?;

        Ok((platform, descriptor))
    }

    /// Resolve a platform-native id, with the platform given by its tag.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_by_id(
        &self,
        platform_tag: &str,
        video_id: &str,
    ) -> ExtractorResult<MediaDescriptor> {
        if platform_tag.trim().is_empty() {
            return Err(ExtractorError::invalid_argument("platform is empty"));
        }

        let platform = platform_tag
            .parse::<Platform>()
            .map_err(|e| ExtractorError::invalid_argument(e.to_string()))?;

        self.resolve_by_platform_id(platform, video_id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn resolve_by_platform_id(
        &self,
        platform: Platform,
        video_id: &str,
    ) -> ExtractorResult<MediaDescriptor> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(ExtractorError::invalid_argument("video id is empty"));
        }

        let adapter = self
            .registry
            .lookup_adapter(platform)
            .ok_or(ExtractorError::unsupported(platform, "parsing by video id"))?;
        debug!(adapter = adapter.description(), "Resolving video id");

        adapter.parse_video_id(video_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DEFAULT_ENTRIES;

    fn haokan_only() -> Resolver {
        Resolver::new(Registry::new(
            DEFAULT_ENTRIES
                .iter()
                .copied()
                .filter(|x| x.platform == Platform::HaoKan),
        ))
    }

    #[tokio::test]
    async fn empty_share_url_is_invalid() {
        let err = Resolver::default()
            .resolve_by_share_url("   ")
            .await
            .expect_err("empty");

        assert!(matches!(err, ExtractorError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn unknown_domain_is_not_configured() {
        let err = Resolver::default()
            .resolve_by_share_url("https://example.com/v/1")
            .await
            .expect_err("unknown domain");

        assert!(matches!(err, ExtractorError::SourceNotConfigured(ref x) if x == "https://example.com/v/1"));
    }

    #[tokio::test]
    async fn empty_id_or_platform_is_invalid() {
        let resolver = Resolver::default();

        for (platform, id) in [("", "123"), ("douyin", ""), ("douyin", "  ")] {
            let err = resolver.resolve_by_id(platform, id).await.expect_err("empty");
            assert!(matches!(err, ExtractorError::InvalidArgument(_)), "{platform:?} {id:?}");
        }
    }

    #[tokio::test]
    async fn unknown_platform_tag_is_invalid() {
        let err = Resolver::default()
            .resolve_by_id("myspace", "123")
            .await
            .expect_err("unknown tag");

        assert!(matches!(err, ExtractorError::InvalidArgument(ref m) if m.contains("myspace")));
    }

    #[tokio::test]
    async fn share_url_only_platform_rejects_ids() {
        let err = Resolver::default()
            .resolve_by_id("redbook", "64f1c2")
            .await
            .expect_err("unsupported");

        assert!(matches!(
            err,
            ExtractorError::UnsupportedOperation { platform: Platform::RedBook, .. }
        ));
    }

    #[tokio::test]
    async fn platform_missing_from_registry_is_unsupported() {
        let err = haokan_only()
            .resolve_by_platform_id(Platform::DouYin, "7301")
            .await
            .expect_err("not registered");

        assert!(matches!(
            err,
            ExtractorError::UnsupportedOperation { platform: Platform::DouYin, .. }
        ));
    }

    #[tokio::test]
    async fn reduced_registry_does_not_route_other_domains() {
        let err = haokan_only()
            .resolve_by_share_url("https://v.douyin.com/ABCDEF/")
            .await
            .expect_err("not registered");

        assert!(matches!(err, ExtractorError::SourceNotConfigured(_)));
    }

    #[tokio::test]
    async fn numeric_only_platforms_reject_other_ids_before_fetching() {
        let err = Resolver::default()
            .resolve_by_id("ZuiYou", "not-a-number")
            .await
            .expect_err("not numeric");

        assert!(matches!(err, ExtractorError::InvalidArgument(_)));
    }
}
