//! 缩略图清晰度档位（固定五档）。

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    MaxResDefault,
    SdDefault,
    HqDefault,
    MqDefault,
    Default,
}

impl Quality {
    /// 固定展示顺序，从高到低。
    pub const ALL: [Quality; 5] = [
        Quality::MaxResDefault,
        Quality::SdDefault,
        Quality::HqDefault,
        Quality::MqDefault,
        Quality::Default,
    ];

    /// 图片地址与文件名中使用的档位标记。
    pub fn token(self) -> &'static str {
        match self {
            Quality::MaxResDefault => "maxresdefault",
            Quality::SdDefault => "sddefault",
            Quality::HqDefault => "hqdefault",
            Quality::MqDefault => "mqdefault",
            Quality::Default => "default",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::MaxResDefault => "Max Resolution",
            Quality::SdDefault => "HD",
            Quality::HqDefault => "High Quality",
            Quality::MqDefault => "Medium Quality",
            Quality::Default => "Default",
        }
    }

    pub fn resolution(self) -> &'static str {
        match self {
            Quality::MaxResDefault => "1280x720",
            Quality::SdDefault => "640x480",
            Quality::HqDefault => "480x360",
            Quality::MqDefault => "320x180",
            Quality::Default => "120x90",
        }
    }
}
