pub mod acfun;
pub mod bilibili;
pub mod doupai;
pub mod douyin;
pub mod haokan;
pub mod huya;
pub mod kuaishou;
pub mod lishipin;
pub mod lvzhou;
pub mod meipai;
pub mod pipigaoxiao;
pub mod pipixia;
pub mod quanmin;
pub mod quanminkge;
pub mod redbook;
pub mod sixroom;
pub mod weibo;
pub mod weishi;
pub mod xigua;
pub mod xinpianchang;
pub mod zuiyou;

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    media_descriptor::MediaDescriptor,
    platform::Platform,
};

const BY_VIDEO_ID: &str = "parsing by video id";

/// Shared failure for adapters that can only work from a share url.
const fn video_id_unsupported(platform: Platform) -> ExtractorError {
    ExtractorError::unsupported(platform, BY_VIDEO_ID)
}

macro_rules! adapters {
    ($($variant:ident => $handler:path),+ $(,)?) => {
        /// Closed set of platform adapters.
        #[derive(Debug, Clone, Copy)]
        pub enum Adapter {
            $($variant($handler)),+
        }

        impl Adapter {
            #[must_use]
            pub const fn for_platform(platform: Platform) -> Self {
                match platform {
                    $(Platform::$variant => Self::$variant($handler)),+
                }
            }
        }

        #[async_trait::async_trait]
        impl Extractor for Adapter {
            fn platform(&self) -> Platform {
                match self {
                    $(Self::$variant(x) => x.platform()),+
                }
            }

            fn description(&self) -> &'static str {
                match self {
                    $(Self::$variant(x) => x.description()),+
                }
            }

            async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
                match self {
                    $(Self::$variant(x) => x.parse_share_url(share_url).await),+
                }
            }

            async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
                match self {
                    $(Self::$variant(x) => x.parse_video_id(video_id).await),+
                }
            }
        }
    };
}

adapters! {
    AcFun => acfun::AcFun,
    BiliBili => bilibili::BiliBili,
    DouPai => doupai::DouPai,
    DouYin => douyin::DouYin,
    HaoKan => haokan::HaoKan,
    HuYa => huya::HuYa,
    KuaiShou => kuaishou::KuaiShou,
    LiShiPin => lishipin::LiShiPin,
    LvZhou => lvzhou::LvZhou,
    MeiPai => meipai::MeiPai,
    PiPiGaoXiao => pipigaoxiao::PiPiGaoXiao,
    PiPiXia => pipixia::PiPiXia,
    QuanMin => quanmin::QuanMin,
    QuanMinKGe => quanminkge::QuanMinKGe,
    RedBook => redbook::RedBook,
    SixRoom => sixroom::SixRoom,
    WeiBo => weibo::WeiBo,
    WeiShi => weishi::WeiShi,
    XiGua => xigua::XiGua,
    XinPianChang => xinpianchang::XinPianChang,
    ZuiYou => zuiyou::ZuiYou,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_has_a_matching_adapter() {
        for platform in Platform::ALL {
            assert_eq!(Adapter::for_platform(platform).platform(), platform);
        }
    }

    #[tokio::test]
    async fn share_url_only_platforms_reject_video_ids() {
        for platform in [Platform::KuaiShou, Platform::RedBook, Platform::XinPianChang] {
            let err = Adapter::for_platform(platform)
                .parse_video_id("123456")
                .await
                .expect_err("not supported");

            assert!(matches!(
                err,
                ExtractorError::UnsupportedOperation { platform: p, .. } if p == platform
            ));
        }
    }
}
