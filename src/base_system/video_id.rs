//! 视频 ID/链接解析。
//!
//! 按固定优先级依次尝试几种已知的输入形态，第一个匹配的形态胜出。

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// 视频 ID 固定长度。
pub const VIDEO_ID_LEN: usize = 11;

/// 经过校验的 11 位视频 ID（字符集 `[A-Za-z0-9_-]`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// 仅接受裸 ID，不解析链接。
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == VIDEO_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

// 顺序即优先级：链接形态在前，裸 ID 最后。
fn patterns() -> &'static [Regex] {
    PATTERNS.get_or_init(|| {
        [
            r"^(?:https?://)?(?:www\.)?youtube\.com/watch\?(?:[^#]*&)?v=([A-Za-z0-9_-]{11})(?:[&#].*)?$",
            r"^(?:https?://)?(?:www\.)?youtu\.be/([A-Za-z0-9_-]{11})(?:[?#].*)?$",
            r"^(?:https?://)?(?:www\.)?youtube\.com/embed/([A-Za-z0-9_-]{11})(?:[/?#].*)?$",
            r"^(?:https?://)?(?:www\.)?youtube\.com/shorts/([A-Za-z0-9_-]{11})(?:[/?#].*)?$",
            r"^([A-Za-z0-9_-]{11})$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("compile video id pattern"))
        .collect()
    })
}

pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    patterns().iter().find_map(|re| {
        re.captures(trimmed)
            .and_then(|caps| caps.get(1))
            .and_then(|m| VideoId::parse(m.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    fn extract(input: &str) -> Option<String> {
        extract_video_id(input).map(|id| id.as_str().to_string())
    }

    #[test]
    fn watch_page_links() {
        assert_eq!(extract("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(), Some(ID));
        assert_eq!(extract("http://youtube.com/watch?v=dQw4w9WgXcQ").as_deref(), Some(ID));
        assert_eq!(extract("youtube.com/watch?v=dQw4w9WgXcQ&t=42s").as_deref(), Some(ID));
        assert_eq!(
            extract("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn short_embed_and_shorts_links() {
        assert_eq!(extract("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some(ID));
        assert_eq!(extract("youtu.be/dQw4w9WgXcQ?si=abc123").as_deref(), Some(ID));
        assert_eq!(extract("https://www.youtube.com/embed/dQw4w9WgXcQ").as_deref(), Some(ID));
        assert_eq!(extract("https://youtube.com/shorts/a-b_c1234XY").as_deref(), Some("a-b_c1234XY"));
    }

    #[test]
    fn bare_token() {
        assert_eq!(extract(ID).as_deref(), Some(ID));
        assert_eq!(extract("  dQw4w9WgXcQ \n").as_deref(), Some(ID));
    }

    #[test]
    fn rejects_unrecognised_input() {
        assert_eq!(extract("not a url"), None);
        assert_eq!(extract(""), None);
        assert_eq!(extract("   "), None);
        assert_eq!(extract("dQw4w9WgXc"), None);
        assert_eq!(extract("dQw4w9WgXcQQ"), None);
        assert_eq!(extract("https://youtu.be/dQw4w9WgXcQQ"), None);
        assert_eq!(extract("https://vimeo.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract("https://www.youtube.com/watch?v=short"), None);
    }

    #[test]
    fn malformed_address_is_not_read_as_bare_token() {
        assert_eq!(extract("https://example.com/dQw4w9WgXcQ"), None);
        assert_eq!(extract("x/dQw4w9WgXcQ"), None);
    }

    #[test]
    fn video_id_parse_checks_alphabet() {
        assert!(VideoId::parse("dQw4w9WgXcQ").is_some());
        assert!(VideoId::parse("dQw4w9WgXc!").is_none());
        assert!(VideoId::parse("ab").is_none());
    }
}
