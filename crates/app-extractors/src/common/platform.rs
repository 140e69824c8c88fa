use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    AcFun,
    BiliBili,
    DouPai,
    /// Also covers the Douyin "volcano" edition
    DouYin,
    HaoKan,
    HuYa,
    KuaiShou,
    /// Pear Video
    LiShiPin,
    /// Weibo Oasis
    LvZhou,
    MeiPai,
    PiPiGaoXiao,
    PiPiXia,
    /// Du Xiao Shi, formerly Quan Min short videos
    QuanMin,
    /// WeSing
    QuanMinKGe,
    /// Xiaohongshu
    RedBook,
    SixRoom,
    WeiBo,
    WeiShi,
    XiGua,
    XinPianChang,
    ZuiYou,
}

impl Platform {
    pub const ALL: [Self; 21] = [
        Self::AcFun,
        Self::BiliBili,
        Self::DouPai,
        Self::DouYin,
        Self::HaoKan,
        Self::HuYa,
        Self::KuaiShou,
        Self::LiShiPin,
        Self::LvZhou,
        Self::MeiPai,
        Self::PiPiGaoXiao,
        Self::PiPiXia,
        Self::QuanMin,
        Self::QuanMinKGe,
        Self::RedBook,
        Self::SixRoom,
        Self::WeiBo,
        Self::WeiShi,
        Self::XiGua,
        Self::XinPianChang,
        Self::ZuiYou,
    ];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::AcFun => "acfun",
            Self::BiliBili => "bilibili",
            Self::DouPai => "doupai",
            Self::DouYin => "douyin",
            Self::HaoKan => "haokan",
            Self::HuYa => "huya",
            Self::KuaiShou => "kuaishou",
            Self::LiShiPin => "lishipin",
            Self::LvZhou => "lvzhou",
            Self::MeiPai => "meipai",
            Self::PiPiGaoXiao => "pipigaoxiao",
            Self::PiPiXia => "pipixia",
            Self::QuanMin => "quanmin",
            Self::QuanMinKGe => "quanminkge",
            Self::RedBook => "redbook",
            Self::SixRoom => "sixroom",
            Self::WeiBo => "weibo",
            Self::WeiShi => "weishi",
            Self::XiGua => "xigua",
            Self::XinPianChang => "xinpianchang",
            Self::ZuiYou => "zuiyou",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform {0:?}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();

        Self::ALL
            .into_iter()
            .find(|x| x.tag().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}
