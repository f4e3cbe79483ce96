//! 交互层入口。
//!
//! 包含 TUI 与无 UI（旧 CLI）两套交互实现，共用剪贴板与浏览器打开逻辑。

mod clipboard;
pub mod noui;
pub mod tui;

use std::io;
use std::process::{Child, Command};

/// 下载失败时的统一提示。
pub(crate) const DOWNLOAD_FAILED_NOTICE: &str =
    "Failed to download image. The thumbnail might not be available or there was a network issue.";

pub(crate) const COPYRIGHT_NOTICE: &str = "This tool only retrieves publicly available YouTube thumbnails. Please respect copyright when using images.";

/// 用系统默认程序打开链接（图片原图）。
pub(crate) fn open_in_browser(url: &str) -> io::Result<Child> {
    if cfg!(target_os = "windows") {
        // explorer.exe keeps our console modes intact, cmd.exe may not.
        Command::new("explorer")
            .arg(url)
            .spawn()
            .or_else(|_| Command::new("cmd").args(["/C", "start", url]).spawn())
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "android") {
        Command::new("termux-open-url").arg(url).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    }
}
