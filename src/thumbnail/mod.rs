//! 缩略图记录生成。
//!
//! 给定视频 ID，按固定模板拼出五个档位的图片地址与建议文件名。
//! 结果只依赖 ID 本身，不访问网络。

pub mod quality;

use serde::Serialize;

pub use quality::Quality;

use crate::base_system::video_id::VideoId;

pub const IMAGE_HOST: &str = "i.ytimg.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailRecord {
    pub quality: Quality,
    pub label: &'static str,
    pub resolution: &'static str,
    pub url: String,
    pub filename: String,
}

// ID 字符集本身是 URL 安全的，无需转义。
pub fn thumbnail_url(id: &VideoId, quality: Quality) -> String {
    format!("https://{IMAGE_HOST}/vi/{}/{}.jpg", id.as_str(), quality.token())
}

pub fn thumbnail_filename(id: &VideoId, quality: Quality) -> String {
    format!("{}_{}.jpg", id.as_str(), quality.token())
}

pub fn build_thumbnails(id: &VideoId) -> Vec<ThumbnailRecord> {
    Quality::ALL
        .iter()
        .map(|&quality| ThumbnailRecord {
            quality,
            label: quality.label(),
            resolution: quality.resolution(),
            url: thumbnail_url(id, quality),
            filename: thumbnail_filename(id, quality),
        })
        .collect()
}

/// 当前视频对应的整组记录；换 ID 时整体替换。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailSet {
    video_id: Option<VideoId>,
    records: Vec<ThumbnailRecord>,
}

impl ThumbnailSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_video(id: &VideoId) -> Self {
        Self {
            video_id: Some(id.clone()),
            records: build_thumbnails(id),
        }
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        self.video_id.as_ref()
    }

    pub fn records(&self) -> &[ThumbnailRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> VideoId {
        VideoId::parse(raw).unwrap()
    }

    #[test]
    fn builds_five_records_in_tier_order() {
        let vid = id("dQw4w9WgXcQ");
        let records = build_thumbnails(&vid);
        assert_eq!(records.len(), 5);
        for (record, quality) in records.iter().zip(Quality::ALL) {
            assert_eq!(record.quality, quality);
            assert_eq!(
                record.url,
                format!("https://i.ytimg.com/vi/dQw4w9WgXcQ/{}.jpg", quality.token())
            );
            assert_eq!(record.filename, format!("dQw4w9WgXcQ_{}.jpg", quality.token()));
        }
        assert_eq!(records[0].label, "Max Resolution");
        assert_eq!(records[0].resolution, "1280x720");
        assert_eq!(records[4].resolution, "120x90");
    }

    #[test]
    fn same_id_builds_identical_sets() {
        let vid = id("a-b_c1234XY");
        assert_eq!(ThumbnailSet::for_video(&vid), ThumbnailSet::for_video(&vid));
    }

    #[test]
    fn empty_set_has_no_records() {
        let set = ThumbnailSet::empty();
        assert!(set.is_empty());
        assert!(set.video_id().is_none());
    }

    #[test]
    fn records_serialize_for_json_output() {
        let vid = id("dQw4w9WgXcQ");
        let value = serde_json::to_value(build_thumbnails(&vid)).unwrap();
        assert_eq!(value[1]["quality"], "sddefault");
        assert_eq!(value[1]["label"], "HD");
        assert_eq!(value[1]["filename"], "dQw4w9WgXcQ_sddefault.jpg");
    }
}
