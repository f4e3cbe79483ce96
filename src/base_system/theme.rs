//! 明暗主题偏好。
//!
//! 配置里保存了偏好就用配置；否则从终端的 `COLORFGBG` 推断。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

pub fn resolve(stored: Option<Theme>) -> Theme {
    stored.unwrap_or_else(detect_ambient)
}

pub fn detect_ambient() -> Theme {
    let raw = std::env::var("COLORFGBG").ok();
    from_colorfgbg(raw.as_deref()).unwrap_or(Theme::Dark)
}

/// `COLORFGBG` 形如 `15;0` 或 `15;default;0`，最后一段是背景色编号。
pub fn from_colorfgbg(raw: Option<&str>) -> Option<Theme> {
    let bg: u8 = raw?.rsplit(';').next()?.trim().parse().ok()?;
    // 0-6 与 8 是深色背景
    if bg <= 6 || bg == 8 {
        Some(Theme::Dark)
    } else {
        Some(Theme::Light)
    }
}
