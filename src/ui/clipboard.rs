//! 剪贴板工具（TUI 与旧 CLI 共用）。
//!
//! - Desktop：通过 `clipboard-arboard` 使用 arboard。
//! - Android：使用 Termux `termux-clipboard-get` / `termux-clipboard-set`。

use anyhow::Result;

#[cfg(any(
    all(feature = "clipboard", target_os = "android"),
    all(
        feature = "clipboard",
        feature = "clipboard-arboard",
        not(target_os = "android")
    )
))]
use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CopyOutcome {
    Copied,
    /// 当前构建或平台没有可用的剪贴板后端。
    Unavailable,
}

#[cfg(all(feature = "clipboard", target_os = "android"))]
pub(super) fn get_text() -> Result<Option<String>> {
    use std::process::Command;

    let output = match Command::new("termux-clipboard-get").output() {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).context("run termux-clipboard-get"),
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("termux-clipboard-get failed: {}", stderr.trim());
    }

    let text = String::from_utf8_lossy(&output.stdout)
        .trim_end_matches(['\r', '\n'])
        .to_string();
    Ok((!text.is_empty()).then_some(text))
}

#[cfg(all(feature = "clipboard", target_os = "android"))]
pub(super) fn set_text(text: &str) -> Result<CopyOutcome> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = match Command::new("termux-clipboard-set")
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(CopyOutcome::Unavailable);
        }
        Err(e) => return Err(e).context("run termux-clipboard-set"),
    };
    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(text.as_bytes())
            .context("write termux-clipboard-set stdin")?;
    }
    let status = child.wait().context("wait termux-clipboard-set")?;
    if !status.success() {
        anyhow::bail!("termux-clipboard-set exited with {status}");
    }
    Ok(CopyOutcome::Copied)
}

#[cfg(all(
    feature = "clipboard",
    feature = "clipboard-arboard",
    not(target_os = "android")
))]
pub(super) fn get_text() -> Result<Option<String>> {
    with_clipboard(|clip| {
        let text = clip.get_text().context("get clipboard text")?;
        Ok((!text.trim().is_empty()).then_some(text))
    })
}

#[cfg(all(
    feature = "clipboard",
    feature = "clipboard-arboard",
    not(target_os = "android")
))]
pub(super) fn set_text(text: &str) -> Result<CopyOutcome> {
    with_clipboard(|clip| {
        clip.set_text(text.to_string())
            .context("set clipboard text")?;
        Ok(CopyOutcome::Copied)
    })
}

// On X11/Wayland the copied text is served by the owning process, so the
// handle has to outlive the call instead of being dropped right after.
#[cfg(all(
    feature = "clipboard",
    feature = "clipboard-arboard",
    not(target_os = "android")
))]
fn with_clipboard<T>(f: impl FnOnce(&mut arboard::Clipboard) -> Result<T>) -> Result<T> {
    use std::sync::{Mutex, OnceLock};

    static CLIPBOARD: OnceLock<Mutex<Option<arboard::Clipboard>>> = OnceLock::new();

    let mut guard = CLIPBOARD
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    if guard.is_none() {
        *guard = Some(arboard::Clipboard::new().context("init clipboard")?);
    }
    match guard.as_mut() {
        Some(clip) => f(clip),
        None => anyhow::bail!("clipboard unavailable"),
    }
}

#[cfg(any(
    not(feature = "clipboard"),
    all(not(target_os = "android"), not(feature = "clipboard-arboard"))
))]
pub(super) fn get_text() -> Result<Option<String>> {
    Ok(None)
}

#[cfg(any(
    not(feature = "clipboard"),
    all(not(target_os = "android"), not(feature = "clipboard-arboard"))
))]
pub(super) fn set_text(_text: &str) -> Result<CopyOutcome> {
    Ok(CopyOutcome::Unavailable)
}
