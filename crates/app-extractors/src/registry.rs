use crate::{common::platform::Platform, extractors::Adapter};

pub type AdapterFactory = fn() -> Adapter;

#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub platform: Platform,
    /// Substrings of a share url that identify the platform.
    pub domain_list: &'static [&'static str],
    pub factory: AdapterFactory,
}

macro_rules! entries {
    ($($variant:ident => [$($domain:literal),+ $(,)?]),+ $(,)?) => {
        &[
            $(RegistryEntry {
                platform: Platform::$variant,
                domain_list: &[$($domain),+],
                factory: || Adapter::for_platform(Platform::$variant),
            }),+
        ]
    };
}

/// Lookups go in this order and the first hit wins, so `weibo.cn` (Oasis)
/// has to stay ahead of `weibo.com`.
pub static DEFAULT_ENTRIES: &[RegistryEntry] = entries! {
    AcFun => ["www.acfun.cn", "m.acfun.cn"],
    BiliBili => ["bilibili.com", "b23.tv"],
    DouPai => ["doupai.cc"],
    DouYin => ["v.douyin.com", "www.iesdouyin.com", "www.douyin.com"],
    HaoKan => ["haokan.baidu.com", "haokan.hao123.com"],
    HuYa => ["v.huya.com"],
    KuaiShou => ["v.kuaishou.com"],
    LiShiPin => ["www.pearvideo.com"],
    LvZhou => ["weibo.cn"],
    MeiPai => ["meipai.com"],
    PiPiGaoXiao => ["h5.pipigx.com"],
    PiPiXia => ["h5.pipix.com"],
    QuanMin => ["xspshare.baidu.com"],
    QuanMinKGe => ["kg.qq.com"],
    RedBook => ["www.xiaohongshu.com", "xhslink.com"],
    SixRoom => ["6.cn"],
    WeiBo => ["weibo.com"],
    WeiShi => ["isee.weishi.qq.com"],
    XiGua => ["v.ixigua.com", "www.ixigua.com"],
    XinPianChang => ["xinpianchang.com"],
    ZuiYou => ["share.xiaochuankeji.cn"],
};

/// Maps share urls and platforms to adapters.
///
/// Read-only once built, so one instance can be shared freely.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Registry {
    #[must_use]
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = RegistryEntry>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_ENTRIES.iter().copied())
    }

    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Platform of the first entry with a domain contained in `url`.
    #[must_use]
    pub fn lookup_by_url(&self, url: &str) -> Option<Platform> {
        self.entries
            .iter()
            .find(|entry| entry.domain_list.iter().any(|domain| url.contains(domain)))
            .map(|entry| entry.platform)
    }

    #[must_use]
    pub fn lookup_adapter(&self, platform: Platform) -> Option<Adapter> {
        self.entries
            .iter()
            .find(|entry| entry.platform == platform)
            .map(|entry| (entry.factory)())
    }

    #[must_use]
    pub fn supported_platforms(&self) -> Vec<Platform> {
        self.entries.iter().map(|x| x.platform).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::Extractor;

    #[test]
    fn douyin_short_link_resolves() {
        let registry = Registry::with_defaults();

        assert_eq!(
            registry.lookup_by_url("https://v.douyin.com/ABCDEF/"),
            Some(Platform::DouYin)
        );
    }

    #[test]
    fn lookup_is_deterministic() {
        let registry = Registry::with_defaults();
        let url = "https://www.bilibili.com/video/BV1xx411c7mD";

        let first = registry.lookup_by_url(url);
        for _ in 0..10 {
            assert_eq!(registry.lookup_by_url(url), first);
        }
    }

    #[test]
    fn every_domain_resolves_to_its_own_platform() {
        let registry = Registry::with_defaults();

        for entry in registry.entries() {
            for domain in entry.domain_list {
                assert_eq!(
                    registry.lookup_by_url(&format!("https://{domain}/some/path")),
                    Some(entry.platform),
                    "{domain}"
                );
            }
        }
    }

    #[test]
    fn every_platform_is_registered_once() {
        let registry = Registry::with_defaults();
        let platforms = registry.supported_platforms();

        assert_eq!(platforms.len(), Platform::ALL.len());
        for platform in Platform::ALL {
            assert_eq!(platforms.iter().filter(|x| **x == platform).count(), 1);
        }
    }

    #[test]
    fn oasis_wins_over_weibo() {
        let registry = Registry::with_defaults();

        assert_eq!(
            registry.lookup_by_url("https://m.oasis.weibo.cn/v1/h5/share?sid=4"),
            Some(Platform::LvZhou)
        );
        assert_eq!(
            registry.lookup_by_url("https://video.weibo.com/show?fid=1034:4"),
            Some(Platform::WeiBo)
        );
    }

    #[test]
    fn unknown_url_has_no_platform() {
        assert_eq!(Registry::with_defaults().lookup_by_url("https://example.com/v/1"), None);
    }

    #[test]
    fn factory_builds_the_matching_adapter() {
        let registry = Registry::with_defaults();

        for platform in Platform::ALL {
            let adapter = registry.lookup_adapter(platform).expect("registered");
            assert_eq!(adapter.platform(), platform);
        }
    }

    #[test]
    fn reduced_registry_only_knows_its_entries() {
        let registry = Registry::new(
            DEFAULT_ENTRIES
                .iter()
                .copied()
                .filter(|x| x.platform == Platform::HaoKan),
        );

        assert!(registry.lookup_adapter(Platform::HaoKan).is_some());
        assert!(registry.lookup_adapter(Platform::DouYin).is_none());
        assert_eq!(registry.lookup_by_url("https://v.douyin.com/ABCDEF/"), None);
    }
}
