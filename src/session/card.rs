//! 单张缩略图卡片的交互状态。
//!
//! 每张卡片独立持有自己的状态，互不影响；图片加载失败是常见情况
//! （短视频或老视频往往没有高清档位），只显示占位，不重试。

use std::time::{Duration, Instant};

/// "已复制" 提示的保持时长。
pub const COPY_CONFIRM_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Idle,
    Downloading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Idle,
    Confirmed { since: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardState {
    pub image: ImageState,
    pub download: DownloadState,
    pub copy: CopyState,
}

impl Default for CardState {
    fn default() -> Self {
        Self {
            image: ImageState::Loading,
            download: DownloadState::Idle,
            copy: CopyState::Idle,
        }
    }
}

impl CardState {
    pub fn image_loaded(&mut self) {
        if self.image == ImageState::Loading {
            self.image = ImageState::Loaded;
        }
    }

    pub fn image_failed(&mut self) {
        self.image = ImageState::Errored;
    }

    pub fn is_errored(&self) -> bool {
        self.image == ImageState::Errored
    }

    pub fn is_downloading(&self) -> bool {
        self.download == DownloadState::Downloading
    }

    pub fn is_copied(&self) -> bool {
        matches!(self.copy, CopyState::Confirmed { .. })
    }

    pub fn can_copy(&self) -> bool {
        !self.is_errored()
    }

    pub fn can_download(&self) -> bool {
        !self.is_errored() && !self.is_downloading()
    }

    /// 剪贴板写入成功后调用；重复确认会重新计时。
    pub fn copy_confirmed(&mut self, now: Instant) -> bool {
        if !self.can_copy() {
            return false;
        }
        self.copy = CopyState::Confirmed { since: now };
        true
    }

    /// 返回 true 表示提示刚刚过期。
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.copy {
            CopyState::Confirmed { since }
                if now.saturating_duration_since(since) >= COPY_CONFIRM_WINDOW =>
            {
                self.copy = CopyState::Idle;
                true
            }
            _ => false,
        }
    }

    /// 下载中或图片不可用时拒绝。
    pub fn begin_download(&mut self) -> bool {
        if !self.can_download() {
            return false;
        }
        self.download = DownloadState::Downloading;
        true
    }

    pub fn finish_download(&mut self) {
        self.download = DownloadState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_load_transitions() {
        let mut card = CardState::default();
        assert_eq!(card.image, ImageState::Loading);
        card.image_loaded();
        assert_eq!(card.image, ImageState::Loaded);

        let mut card = CardState::default();
        card.image_failed();
        assert!(card.is_errored());
        card.image_loaded();
        assert!(card.is_errored());
    }

    #[test]
    fn errored_card_guards_actions() {
        let mut card = CardState::default();
        card.image_failed();
        assert!(!card.can_copy());
        assert!(!card.copy_confirmed(Instant::now()));
        assert!(!card.begin_download());
        assert_eq!(card.download, DownloadState::Idle);
    }

    #[test]
    fn errored_card_does_not_affect_siblings() {
        let mut cards = [CardState::default(); 5];
        cards[0].image_failed();
        cards[1].image_loaded();
        assert!(cards[1].begin_download());
        assert!(cards[2].copy_confirmed(Instant::now()));
        assert!(cards[0].is_errored());
        assert!(!cards[3].is_errored());
        assert!(!cards[3].is_downloading());
    }

    #[test]
    fn download_is_not_reentrant() {
        let mut card = CardState::default();
        card.image_loaded();
        assert!(card.begin_download());
        assert!(!card.begin_download());
        card.finish_download();
        assert!(card.begin_download());
    }

    #[test]
    fn copy_confirmation_reverts_after_window() {
        let start = Instant::now();
        let mut card = CardState::default();
        assert!(card.copy_confirmed(start));
        assert!(!card.tick(start + Duration::from_millis(1999)));
        assert!(card.is_copied());
        assert!(card.tick(start + COPY_CONFIRM_WINDOW));
        assert!(!card.is_copied());
    }

    #[test]
    fn repeated_copy_restarts_window() {
        let start = Instant::now();
        let mut card = CardState::default();
        card.copy_confirmed(start);
        let again = start + Duration::from_millis(1500);
        card.copy_confirmed(again);
        assert!(!card.tick(start + Duration::from_millis(2500)));
        assert!(card.tick(again + COPY_CONFIRM_WINDOW));
    }
}
