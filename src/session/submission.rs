//! 输入提交流程。

use crate::base_system::video_id::{VideoId, extract_video_id};
use crate::thumbnail::ThumbnailSet;

pub const INVALID_INPUT_MESSAGE: &str = "Please enter a valid YouTube URL or video ID.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Checking,
    Resolved(VideoId),
    Failed(String),
}

/// 一次提交的解析结果，等展示停顿结束后交给 [`Submission::complete`]。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    outcome: Option<VideoId>,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub input: String,
    phase: Phase,
    thumbnails: ThumbnailSet,
}

impl Default for Submission {
    fn default() -> Self {
        Self {
            input: String::new(),
            phase: Phase::Idle,
            thumbnails: ThumbnailSet::empty(),
        }
    }
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始一次提交；检查中时拒绝（提交按钮禁用）。
    pub fn begin(&mut self) -> Option<Attempt> {
        if self.is_checking() {
            return None;
        }
        self.phase = Phase::Checking;
        self.thumbnails = ThumbnailSet::empty();
        Some(Attempt {
            outcome: extract_video_id(self.input.trim()),
        })
    }

    /// 迟到的结果同样生效，后写者胜出。
    pub fn complete(&mut self, attempt: Attempt) -> &Phase {
        match attempt.outcome {
            Some(id) => {
                self.thumbnails = ThumbnailSet::for_video(&id);
                self.phase = Phase::Resolved(id);
            }
            None => {
                self.thumbnails = ThumbnailSet::empty();
                self.phase = Phase::Failed(INVALID_INPUT_MESSAGE.to_string());
            }
        }
        &self.phase
    }

    pub fn is_checking(&self) -> bool {
        self.phase == Phase::Checking
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        self.thumbnails.video_id()
    }

    pub fn thumbnails(&self) -> &ThumbnailSet {
        &self.thumbnails
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(sub: &mut Submission, input: &str) -> Phase {
        sub.input = input.to_string();
        let attempt = sub.begin().expect("not checking");
        sub.complete(attempt).clone()
    }

    #[test]
    fn valid_input_resolves_with_five_records() {
        let mut sub = Submission::new();
        let phase = submit(&mut sub, "https://youtu.be/dQw4w9WgXcQ");
        assert!(matches!(phase, Phase::Resolved(ref id) if id.as_str() == "dQw4w9WgXcQ"));
        assert_eq!(sub.thumbnails().len(), 5);
        assert!(sub.error().is_none());
    }

    #[test]
    fn blank_input_always_fails_with_fixed_message() {
        for input in ["", "   ", "\t\n"] {
            let mut sub = Submission::new();
            submit(&mut sub, input);
            assert_eq!(sub.error(), Some(INVALID_INPUT_MESSAGE));
            assert!(sub.video_id().is_none());
            assert!(sub.thumbnails().is_empty());
        }
    }

    #[test]
    fn begin_clears_previous_result_and_blocks_resubmit() {
        let mut sub = Submission::new();
        submit(&mut sub, "dQw4w9WgXcQ");
        assert_eq!(sub.thumbnails().len(), 5);

        sub.input = "not a url".to_string();
        let attempt = sub.begin().unwrap();
        assert!(sub.is_checking());
        assert!(sub.thumbnails().is_empty());
        assert!(sub.video_id().is_none());
        assert!(sub.begin().is_none());

        sub.complete(attempt);
        assert_eq!(sub.error(), Some(INVALID_INPUT_MESSAGE));
    }

    #[test]
    fn resolving_same_input_twice_is_identical() {
        let mut sub = Submission::new();
        submit(&mut sub, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        let first = sub.thumbnails().clone();
        submit(&mut sub, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(&first, sub.thumbnails());
    }

    #[test]
    fn failure_is_recoverable() {
        let mut sub = Submission::new();
        submit(&mut sub, "nope");
        assert!(sub.error().is_some());
        submit(&mut sub, "dQw4w9WgXcQ");
        assert!(sub.error().is_none());
        assert!(sub.video_id().is_some());
    }
}
