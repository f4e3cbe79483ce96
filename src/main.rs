//! ThumbFetch：YouTube 缩略图获取工具。
//!
//! 输入 YouTube 链接或视频 ID，列出五个档位的缩略图，可预览、下载或复制链接。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志/主题/视频 ID 解析等基础设施
//! - `thumbnail`：由视频 ID 生成缩略图记录
//! - `session`：提交流程与单卡片状态
//! - `download` / `third_party`：图片拉取与落盘
//! - `ui`：TUI 与无 UI（old cli）两套交互

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Result, anyhow};
use clap::Parser;
use serde::Serialize;

mod base_system;
mod download;
mod session;
mod third_party;
mod thumbnail;
mod ui;

use base_system::config::load_or_create;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};
use base_system::video_id::VideoId;
use session::submission::{Phase, Submission};
use thumbnail::ThumbnailRecord;
use tracing::{debug, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "thumbfetch")]
#[command(about = "YouTube Thumbnail Fetcher (Rust TUI)")]
struct Cli {
    /// 启用调试日志输出
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,

    /// 数据目录路径（用于存放 config.yml 和 logs 等文件）
    #[arg(long)]
    data_dir: Option<String>,

    /// 本次使用旧版命令行界面（不修改配置文件）
    #[arg(long, default_value_t = false)]
    old_cli: bool,

    /// 单次模式下以 JSON 输出
    #[arg(long, default_value_t = false)]
    json: bool,

    /// YouTube 链接或视频 ID；给出时只打印结果后退出
    input: Option<String>,
}

#[derive(Serialize)]
struct OneShotOutput<'a> {
    video_id: &'a VideoId,
    thumbnails: &'a [ThumbnailRecord],
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.version {
        println!("ThumbFetch v{}", VERSION);
        return Ok(ExitCode::SUCCESS);
    }

    let data_dir = cli.data_dir.as_deref().map(Path::new);
    let config = load_or_create::<Config>(data_dir)
        .map_err(|e| anyhow!(e.to_string()))?
        .with_base_dir(data_dir);

    let interactive = cli.input.is_none();
    let tui = interactive && !(cli.old_cli || config.old_cli);
    let _log = init_logging(cli.debug, interactive, tui, data_dir)?;
    info!(target: "startup", "当前版本: v{}", VERSION);
    debug!(target: "config", path = %config.config_file().display(), "config loaded");

    if let Some(input) = cli.input.as_deref() {
        return one_shot(input, cli.json);
    }

    if tui {
        ui::tui::run(config)?;
    } else {
        ui::noui::run(&config)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// 单次模式：解析一次输入并打印五条记录，解析失败时以非零状态退出。
fn one_shot(input: &str, json: bool) -> Result<ExitCode> {
    let mut submission = Submission::new();
    submission.input = input.to_string();
    let Some(attempt) = submission.begin() else {
        return Ok(ExitCode::FAILURE);
    };

    let id = match submission.complete(attempt) {
        Phase::Resolved(id) => id.clone(),
        Phase::Failed(msg) => {
            eprintln!("{msg}");
            return Ok(ExitCode::FAILURE);
        }
        Phase::Idle | Phase::Checking => return Ok(ExitCode::FAILURE),
    };
    let records = submission.thumbnails().records();

    if json {
        let out = OneShotOutput {
            video_id: &id,
            thumbnails: records,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{id}");
        for r in records {
            println!("{:<16} {:<9} {}", r.label, r.resolution, r.url);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(
    debug: bool,
    interactive: bool,
    tui: bool,
    base_dir: Option<&Path>,
) -> Result<LogSystem> {
    LogSystem::init(log_options(debug, interactive, tui), base_dir).map_err(|e| anyhow!(e))
}

// 单次模式的 stdout 留给结果输出，日志只写文件且退出时不打包。
fn log_options(debug: bool, interactive: bool, tui: bool) -> LogOptions {
    LogOptions {
        debug,
        console: interactive && !tui,
        broadcast_to_ui: tui,
        archive_on_exit: interactive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_logging_stays_quiet_and_skips_archive() {
        let opts = log_options(false, false, false);
        assert!(!opts.console);
        assert!(!opts.broadcast_to_ui);
        assert!(!opts.archive_on_exit);

        let opts = log_options(true, true, true);
        assert!(opts.debug && opts.broadcast_to_ui && opts.archive_on_exit);
        assert!(!opts.console);

        let opts = log_options(false, true, false);
        assert!(opts.console && opts.archive_on_exit);
    }
}
