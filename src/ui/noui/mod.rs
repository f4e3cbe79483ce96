//! 无 UI（旧 CLI）交互入口。
//!
//! 使用标准输入输出进行交互，并在进入前尽量恢复终端模式。

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};

use crossterm::event::DisableMouseCapture;
use crossterm::execute;
use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode};
use tracing::{debug, error, info, warn};

use crate::base_system::context::Config;
use crate::download::saver;
use crate::session::card::CardState;
use crate::session::submission::{Phase, Submission};
use crate::third_party::media_fetch::MediaFetcher;
use crate::thumbnail::ThumbnailRecord;

use super::clipboard::{self, CopyOutcome};
use super::{COPYRIGHT_NOTICE, DOWNLOAD_FAILED_NOTICE, open_in_browser};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Download(usize),
    Copy(usize),
    Open(usize),
    Submit(String),
}

/// 解析一行输入；序号从 1 开始，越界或非数字的参数按普通输入处理。
fn parse_command(line: &str, available: usize) -> Option<Command> {
    let text = line.trim();
    if text.is_empty() {
        return None;
    }
    if text.eq_ignore_ascii_case("q") {
        return Some(Command::Quit);
    }

    if let Some((cmd, arg)) = text.split_once(char::is_whitespace)
        && let Ok(n) = arg.trim().parse::<usize>()
        && (1..=available).contains(&n)
    {
        let idx = n - 1;
        match cmd {
            "d" | "D" => return Some(Command::Download(idx)),
            "c" | "C" => return Some(Command::Copy(idx)),
            "o" | "O" => return Some(Command::Open(idx)),
            _ => {}
        }
    }
    Some(Command::Submit(text.to_string()))
}

/// 并发请求每个档位，按请求结果标记可用与否（与 TUI 卡片加载图片同一规则）。
fn check_tiers(fetcher: &MediaFetcher, records: &[ThumbnailRecord]) -> Vec<CardState> {
    thread::scope(|s| {
        let handles: Vec<_> = records
            .iter()
            .map(|r| s.spawn(move || fetcher.fetch_bytes(&r.url)))
            .collect();
        handles
            .into_iter()
            .zip(records)
            .map(|(handle, record)| {
                let mut state = CardState::default();
                match handle.join() {
                    Ok(Ok(_)) => state.image_loaded(),
                    Ok(Err(err)) => {
                        debug!(target: "fetch", tier = record.quality.token(), "image unavailable: {err}");
                        state.image_failed();
                    }
                    Err(_) => state.image_failed(),
                }
                state
            })
            .collect()
    })
}

/// 指向不可用档位的下载 / 复制 / 打开命令直接拒绝。
fn refused(command: &Command, states: &[CardState]) -> bool {
    let idx = match command {
        Command::Download(idx) | Command::Copy(idx) | Command::Open(idx) => *idx,
        Command::Quit | Command::Submit(_) => return false,
    };
    states.get(idx).is_none_or(|s| s.is_errored())
}

fn print_records(records: &[ThumbnailRecord], states: &[CardState]) {
    for (i, (r, state)) in records.iter().zip(states).enumerate() {
        let availability = if state.is_errored() {
            "Not Available"
        } else {
            "OK"
        };
        println!(
            "  [{}] {:<16} {:<9} {:<13} {}",
            i + 1,
            r.label,
            r.resolution,
            availability,
            r.url
        );
    }
    println!("命令: d <序号> 下载 | c <序号> 复制链接 | o <序号> 浏览器打开 | q 退出\n");
}

pub fn run(config: &Config) -> Result<()> {
    // In case the previous run exited while in TUI raw mode (e.g., Ctrl+C),
    // best-effort restore the console so stdin line input works in PowerShell.
    let _ = disable_raw_mode();
    let mut out = io::stdout();
    let _ = execute!(out, DisableMouseCapture, LeaveAlternateScreen);

    println!(
        "YouTube Thumbnail Fetcher v{}\n{}\n",
        env!("CARGO_PKG_VERSION"),
        COPYRIGHT_NOTICE
    );

    let fetcher = MediaFetcher::new(config.request_timeout()).context("init http client")?;
    let mut submission = Submission::new();
    let mut states: Vec<CardState> = Vec::new();

    loop {
        let prompt = format!(
            "请输入 YouTube 链接或视频 ID（q 退出，默认保存到 {}）：",
            config.default_save_dir().display()
        );
        let Some(input) = read_line(&prompt)? else {
            break;
        };
        let records = submission.thumbnails().records().to_vec();
        let Some(command) = parse_command(&input, records.len()) else {
            continue;
        };

        if refused(&command, &states) {
            println!("该档位不可用 (Not Available)\n");
            continue;
        }

        match command {
            Command::Quit => {
                println!("已退出。");
                break;
            }
            Command::Submit(text) => {
                submission.input = text;
                states.clear();
                let Some(attempt) = submission.begin() else {
                    continue;
                };
                let delay = config.submit_delay();
                if !delay.is_zero() {
                    println!("Checking...");
                    thread::sleep(delay);
                }
                match submission.complete(attempt).clone() {
                    Phase::Resolved(id) => {
                        info!(target: "ui", video_id = %id, "thumbnails resolved");
                        let thumbnails = submission.thumbnails();
                        states = check_tiers(&fetcher, thumbnails.records());
                        println!("视频 {id} 的 {} 个缩略图档位：", thumbnails.len());
                        print_records(thumbnails.records(), &states);
                    }
                    Phase::Failed(msg) => println!("{msg}\n"),
                    Phase::Idle | Phase::Checking => {}
                }
            }
            Command::Download(idx) => {
                let record = &records[idx];
                if !states[idx].begin_download() {
                    continue;
                }
                println!("Downloading {}...", record.filename);
                let result = saver::download_thumbnail(&fetcher, record, config);
                states[idx].finish_download();
                match result {
                    Ok(path) => println!("已保存: {}\n", path.display()),
                    Err(err) => {
                        error!(target: "download", "Download failed: {err:#}");
                        println!("{DOWNLOAD_FAILED_NOTICE}\n");
                    }
                }
            }
            Command::Copy(idx) => {
                let url = &records[idx].url;
                match clipboard::set_text(url) {
                    Ok(CopyOutcome::Copied) => {
                        states[idx].copy_confirmed(Instant::now());
                        println!("Copied! {url}\n");
                    }
                    Ok(CopyOutcome::Unavailable) => {
                        println!("当前构建没有剪贴板后端，链接: {url}\n")
                    }
                    Err(err) => {
                        warn!(target: "ui", "复制失败: {err:#}");
                        println!("复制失败: {err}\n");
                    }
                }
            }
            Command::Open(idx) => {
                let url = &records[idx].url;
                match open_in_browser(url) {
                    Ok(_) => println!("已尝试在浏览器打开: {url}\n"),
                    Err(e) => println!("打开浏览器失败: {e}\n"),
                }
            }
        }
    }

    Ok(())
}

/// 读取一行；stdin 关闭时返回 `None`。
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let stdin = io::stdin();
    let mut line = String::new();
    let n = stdin.lock().read_line(&mut line).context("read stdin")?;
    Ok((n > 0).then_some(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_need_a_listed_index() {
        assert_eq!(parse_command("d 1", 5), Some(Command::Download(0)));
        assert_eq!(parse_command(" c 5 ", 5), Some(Command::Copy(4)));
        assert_eq!(parse_command("O 3", 5), Some(Command::Open(2)));
        assert_eq!(
            parse_command("d 6", 5),
            Some(Command::Submit("d 6".to_string()))
        );
        assert_eq!(
            parse_command("d 1", 0),
            Some(Command::Submit("d 1".to_string()))
        );
    }

    #[test]
    fn unavailable_tier_refuses_actions() {
        let mut states = [CardState::default(); 5];
        states[0].image_failed();
        states[1].image_loaded();

        assert!(refused(&Command::Download(0), &states));
        assert!(refused(&Command::Copy(0), &states));
        assert!(refused(&Command::Open(0), &states));
        assert!(!refused(&Command::Download(1), &states));
        assert!(!refused(&Command::Copy(2), &states));
        assert!(!refused(&Command::Quit, &states));
        assert!(!refused(&Command::Submit("x".to_string()), &states));
        // 列表刚清空（重新提交中）时不接受序号命令
        assert!(refused(&Command::Download(0), &[]));
    }

    #[test]
    fn quit_blank_and_plain_input() {
        assert_eq!(parse_command("Q", 0), Some(Command::Quit));
        assert_eq!(parse_command("   ", 5), None);
        assert_eq!(
            parse_command("https://youtu.be/dQw4w9WgXcQ", 5),
            Some(Command::Submit("https://youtu.be/dQw4w9WgXcQ".to_string()))
        );
    }
}
