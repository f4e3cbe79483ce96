//! 界面无关的交互状态机。
//!
//! - `submission`：输入提交流程（空闲 / 检查中 / 已解析 / 失败）
//! - `card`：单张缩略图卡片的加载、复制、下载状态

pub mod card;
pub mod submission;
