//! 下载流程模块入口。
//!
//! 子模块：
//! - `saver`：拉取缩略图并以建议文件名保存到本地

pub mod saver;
