//! TUI 主循环、共享状态与后台任务。
//!
//! 所有耗时操作（展示停顿、图片加载、下载）都放到一次性线程里执行，
//! 结果通过 `WorkerMsg` 发回主循环；各卡片的状态互不干扰。

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::{debug, error, info, warn};

mod cards;
mod home;
mod preview;

use preview::LoadedImage;

use crate::base_system::context::Config;
use crate::base_system::logging::take_broadcast_rx;
use crate::base_system::theme::Theme;
use crate::download::saver;
use crate::session::card::{CardState, ImageState};
use crate::session::submission::{Attempt, Phase, Submission};
use crate::third_party::media_fetch::MediaFetcher;
use crate::thumbnail::{Quality, ThumbnailRecord};

use super::clipboard::{self, CopyOutcome};
use super::{DOWNLOAD_FAILED_NOTICE, open_in_browser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Submit,
    Cards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Home,
    Preview,
}

#[derive(Debug)]
enum WorkerMsg {
    SubmitReady(Attempt),
    ImageLoaded {
        generation: u64,
        quality: Quality,
        result: Result<LoadedImage>,
    },
    DownloadDone {
        generation: u64,
        quality: Quality,
        result: Result<PathBuf>,
    },
}

pub(super) struct Card {
    record: ThumbnailRecord,
    state: CardState,
    image: Option<LoadedImage>,
}

impl Card {
    fn new(record: ThumbnailRecord) -> Self {
        Self {
            record,
            state: CardState::default(),
            image: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(super) struct CardLayout {
    image: Rect,
    download: Rect,
    copy: Rect,
}

#[derive(Debug, Clone, Default)]
pub(super) struct HomeLayout {
    input: Rect,
    submit: Rect,
    cards: Vec<CardLayout>,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Palette {
    bg: Color,
    fg: Color,
    accent: Color,
    muted: Color,
    error: Color,
    ok: Color,
    focus: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Reset,
                fg: Color::Gray,
                accent: Color::Cyan,
                muted: Color::DarkGray,
                error: Color::LightRed,
                ok: Color::LightGreen,
                focus: Color::Yellow,
            },
            Theme::Light => Self {
                bg: Color::White,
                fg: Color::Black,
                accent: Color::Blue,
                muted: Color::DarkGray,
                error: Color::Red,
                ok: Color::Green,
                focus: Color::Magenta,
            },
        }
    }
}

pub(super) struct App {
    config: Config,
    theme: Theme,
    submission: Submission,
    cards: Vec<Card>,
    /// 每次重建或清空卡片列表时加一，后台结果按它认领。
    generation: u64,
    selected: usize,
    focus: Focus,
    view: View,
    status: String,
    notice: Option<String>,
    logs: Vec<String>,
    should_quit: bool,

    last_home_layout: Option<HomeLayout>,

    // worker
    fetcher: MediaFetcher,
    worker_tx: Sender<WorkerMsg>,
    worker_rx: Receiver<WorkerMsg>,

    // spinner
    spinner_idx: usize,
    spinner_last: Instant,

    // log
    log_rx: Option<crossbeam_channel::Receiver<String>>,
}

impl App {
    fn new(config: Config, fetcher: MediaFetcher) -> Self {
        let (worker_tx, worker_rx) = mpsc::channel();
        let theme = config.resolved_theme();
        Self {
            config,
            theme,
            submission: Submission::new(),
            cards: Vec::new(),
            generation: 0,
            selected: 0,
            focus: Focus::Input,
            view: View::Home,
            status: "粘贴 YouTube 链接或视频 ID，Enter 获取缩略图，Tab 切换焦点".to_string(),
            notice: None,
            logs: Vec::new(),
            should_quit: false,
            last_home_layout: None,
            fetcher,
            worker_tx,
            worker_rx,
            spinner_idx: 0,
            spinner_last: Instant::now(),
            log_rx: take_broadcast_rx(),
        }
    }

    fn palette(&self) -> Palette {
        Palette::for_theme(self.theme)
    }

    fn push_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.logs
            .push(msg.trim_end_matches(['\r', '\n']).to_string());
        if self.logs.len() > 200 {
            let overflow = self.logs.len() - 200;
            self.logs.drain(0..overflow);
        }
    }

    fn select_next(&mut self) {
        if !self.cards.is_empty() {
            self.selected = (self.selected + 1) % self.cards.len();
        }
    }

    fn select_prev(&mut self) {
        if !self.cards.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.cards.len() - 1);
        }
    }

    fn replace_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.generation = self.generation.wrapping_add(1);
        self.selected = 0;
    }

    /// 只认领当前这批卡片发出的结果。
    fn card_mut(&mut self, generation: u64, quality: Quality) -> Option<&mut Card> {
        if generation != self.generation {
            return None;
        }
        self.cards.iter_mut().find(|c| c.record.quality == quality)
    }
}

pub fn run(config: Config) -> Result<()> {
    let fetcher = MediaFetcher::new(config.request_timeout()).context("init http client")?;

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("init terminal")?;

    let result = run_loop(&mut terminal, App::new(config, fetcher));

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .ok();
    terminal.show_cursor().ok();

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: App,
) -> Result<()> {
    info!(target: "ui", theme = app.theme.as_str(), "tui started");
    loop {
        tick(&mut app);
        poll_worker(&mut app);
        drain_log_channel(&mut app);

        terminal.draw(|f| draw_ui(f, &mut app))?;

        if !handle_event(&mut app)? {
            break;
        }
    }
    Ok(())
}

fn draw_ui(frame: &mut ratatui::Frame, app: &mut App) {
    let palette = app.palette();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        frame.size(),
    );
    match app.view {
        View::Home => home::draw_home(frame, app),
        View::Preview => preview::draw_preview(frame, app),
    }
    render_notice(frame, app);
}

fn handle_event(app: &mut App) -> Result<bool> {
    if !event::poll(Duration::from_millis(100)).context("poll event")? {
        return Ok(true);
    }

    let evt = event::read().context("read event")?;

    if let Event::Key(key) = &evt
        && key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
    {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return Ok(false);
            }
            KeyCode::Char('t') => {
                toggle_theme(app);
                return Ok(true);
            }
            _ => {}
        }
    }

    // 阻塞提示框打开时只接受关闭操作
    if app.notice.is_some() {
        match evt {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    app.notice = None;
                }
            }
            Event::Mouse(me) if matches!(me.kind, MouseEventKind::Down(MouseButton::Left)) => {
                app.notice = None;
            }
            _ => {}
        }
        return Ok(true);
    }

    match app.view {
        View::Home => home::handle_event_home(app, evt)?,
        View::Preview => preview::handle_event_preview(app, evt)?,
    }
    Ok(!app.should_quit)
}

const SPINNER_FRAMES: &[char] = &['|', '/', '-', '\\'];

const LOG_HEIGHT: u16 = 6;

fn tick(app: &mut App) {
    let now = Instant::now();
    for card in &mut app.cards {
        card.state.tick(now);
    }

    let busy = app.submission.is_checking()
        || app
            .cards
            .iter()
            .any(|c| c.state.is_downloading() || c.state.image == ImageState::Loading);
    if busy && app.spinner_last.elapsed() >= Duration::from_millis(140) {
        app.spinner_idx = (app.spinner_idx + 1) % SPINNER_FRAMES.len();
        app.spinner_last = now;
    }
}

fn spinner_frame(app: &App) -> char {
    SPINNER_FRAMES[app.spinner_idx % SPINNER_FRAMES.len()]
}

fn split_with_log(area: Rect) -> (Rect, Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(LOG_HEIGHT), Constraint::Length(LOG_HEIGHT)])
        .split(area);
    (layout[0], layout[1])
}

fn render_log_box(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let visible = area.height.saturating_sub(2).max(1) as usize;
    let lines: Vec<Line> = if app.logs.is_empty() {
        vec![Line::from(Span::styled(
            "日志: 暂无",
            Style::default().fg(palette.muted),
        ))]
    } else {
        app.logs
            .iter()
            .rev()
            .take(visible)
            .rev()
            .map(|l| style_log_line(l, palette))
            .collect()
    };

    let log = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title("日志"),
        );
    frame.render_widget(log, area);
}

fn style_log_line(line: &str, palette: Palette) -> Line<'static> {
    let mut parts = line.split_whitespace();
    let ts = parts.next().unwrap_or("");
    let level = parts.next().unwrap_or("").to_ascii_uppercase();
    let rest: Vec<&str> = parts.collect();

    let mut spans: Vec<Span<'static>> = Vec::new();
    if !ts.is_empty() {
        // 只保留时分秒
        let short = ts.get(11..19).unwrap_or(ts);
        spans.push(Span::styled(
            short.to_string(),
            Style::default().fg(palette.muted),
        ));
    }
    if !level.is_empty() {
        let color = match level.as_str() {
            "ERROR" => palette.error,
            "WARN" => Color::Yellow,
            "INFO" => palette.accent,
            _ => palette.muted,
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            level,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    if !rest.is_empty() {
        spans.push(Span::raw(" "));
        spans.push(Span::raw(rest.join(" ")));
    }
    Line::from(spans)
}

fn drain_log_channel(app: &mut App) {
    if let Some(rx) = app.log_rx.clone() {
        for line in rx.try_iter() {
            app.push_log(line);
        }
    }
}

fn render_notice(frame: &mut ratatui::Frame, app: &App) {
    let Some(text) = app.notice.as_ref() else {
        return;
    };
    let palette = app.palette();
    let area = centered_rect(frame.size(), 60, 7);
    frame.render_widget(Clear, area);
    let body = vec![
        Line::from(text.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "[ OK ]  Enter / Esc",
            Style::default()
                .fg(palette.focus)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    let dialog = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(palette.bg).fg(palette.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.error))
                .title("下载失败"),
        );
    frame.render_widget(dialog, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

fn pos_in(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

fn toggle_theme(app: &mut App) {
    app.theme = app.theme.toggled();
    app.config.theme = Some(app.theme);
    match app.config.save() {
        Ok(()) => {
            info!(target: "ui", theme = app.theme.as_str(), "theme saved");
            app.status = format!("主题: {}", app.theme.as_str());
        }
        Err(err) => {
            warn!(target: "config", "保存主题失败: {err}");
            app.status = format!("主题已切换，但保存失败: {err}");
        }
    }
}

pub(super) fn start_submit(app: &mut App) {
    let Some(attempt) = app.submission.begin() else {
        return;
    };
    app.replace_cards(Vec::new());
    debug!(target: "ui", input = %app.submission.input.trim(), "submit");

    let delay = app.config.submit_delay();
    let tx = app.worker_tx.clone();
    thread::spawn(move || {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let _ = tx.send(WorkerMsg::SubmitReady(attempt));
    });
}

/// 应用提交结果并重建卡片；返回是否解析成功。
fn apply_submission(app: &mut App, attempt: Attempt) -> bool {
    match app.submission.complete(attempt) {
        Phase::Resolved(id) => {
            info!(target: "ui", video_id = %id, "thumbnails resolved");
            app.status = format!("视频 {id}：←/→ 选择，d 下载，c 复制链接，o 打开原图，Enter 预览");
        }
        Phase::Failed(msg) => {
            app.status = msg.clone();
            return false;
        }
        Phase::Idle | Phase::Checking => return false,
    }

    let cards = app
        .submission
        .thumbnails()
        .records()
        .iter()
        .cloned()
        .map(Card::new)
        .collect();
    app.replace_cards(cards);
    app.focus = Focus::Cards;
    true
}

fn start_image_loads(app: &App) {
    let Some(video_id) = app.submission.video_id() else {
        return;
    };
    debug!(target: "fetch", video_id = %video_id, count = app.cards.len(), "loading previews");
    for card in &app.cards {
        start_image_load(app, &card.record);
    }
}

fn start_image_load(app: &App, record: &ThumbnailRecord) {
    let generation = app.generation;
    let tx = app.worker_tx.clone();
    let fetcher = app.fetcher.clone();
    let url = record.url.clone();
    let quality = record.quality;
    thread::spawn(move || {
        let result = fetcher
            .fetch_bytes(&url)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| preview::decode_preview(&bytes));
        let _ = tx.send(WorkerMsg::ImageLoaded {
            generation,
            quality,
            result,
        });
    });
}

pub(super) fn start_download(app: &mut App, idx: usize) {
    let generation = app.generation;
    let Some(card) = app.cards.get_mut(idx) else {
        return;
    };
    if card.state.is_errored() {
        app.status = format!("{}: Not Available", card.record.label);
        return;
    }
    if !card.state.begin_download() {
        return;
    }

    let record = card.record.clone();
    app.status = format!("Downloading {}…", record.filename);
    let tx = app.worker_tx.clone();
    let fetcher = app.fetcher.clone();
    let config = app.config.clone();
    thread::spawn(move || {
        let result = saver::download_thumbnail(&fetcher, &record, &config);
        let _ = tx.send(WorkerMsg::DownloadDone {
            generation,
            quality: record.quality,
            result,
        });
    });
}

pub(super) fn copy_link(app: &mut App, idx: usize) {
    let Some(card) = app.cards.get_mut(idx) else {
        return;
    };
    if !card.state.can_copy() {
        app.status = format!("{}: Not Available", card.record.label);
        return;
    }
    match clipboard::set_text(&card.record.url) {
        Ok(CopyOutcome::Copied) => {
            card.state.copy_confirmed(Instant::now());
            app.status = format!("Copied! {}", card.record.url);
        }
        Ok(CopyOutcome::Unavailable) => {
            app.status = format!("当前构建没有剪贴板后端，链接: {}", card.record.url);
        }
        Err(err) => {
            warn!(target: "ui", "复制失败: {err:#}");
            app.status = format!("复制失败: {err}");
        }
    }
}

pub(super) fn open_selected(app: &mut App) {
    let Some(card) = app.cards.get(app.selected) else {
        return;
    };
    if card.state.is_errored() {
        app.status = format!("{}: Not Available", card.record.label);
        return;
    }
    let url = card.record.url.clone();
    match open_in_browser(&url) {
        Ok(_) => app.status = format!("已尝试在浏览器打开: {url}"),
        Err(e) => app.status = format!("打开浏览器失败: {e}"),
    }
    // Some openers toggle console modes; re-assert ours.
    let _ = enable_raw_mode();
    let _ = execute!(std::io::stdout(), EnableMouseCapture);
}

fn poll_worker(app: &mut App) {
    while let Ok(msg) = app.worker_rx.try_recv() {
        match msg {
            WorkerMsg::SubmitReady(attempt) => {
                if apply_submission(app, attempt) {
                    start_image_loads(app);
                }
            }
            WorkerMsg::ImageLoaded {
                generation,
                quality,
                result,
            } => {
                let Some(card) = app.card_mut(generation, quality) else {
                    continue;
                };
                match result {
                    Ok(img) => {
                        debug!(target: "fetch", tier = quality.token(), w = img.width, h = img.height, "image loaded");
                        card.image = Some(img);
                        card.state.image_loaded();
                    }
                    Err(err) => {
                        debug!(target: "fetch", tier = quality.token(), "image unavailable: {err:#}");
                        card.state.image_failed();
                    }
                }
            }
            WorkerMsg::DownloadDone {
                generation,
                quality,
                result,
            } => {
                let Some(card) = app.card_mut(generation, quality) else {
                    continue;
                };
                card.state.finish_download();
                match result {
                    Ok(path) => app.status = format!("已保存: {}", path.display()),
                    Err(err) => {
                        error!(target: "download", "Download failed: {err:#}");
                        app.notice = Some(DOWNLOAD_FAILED_NOTICE.to_string());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let fetcher = MediaFetcher::new(Duration::from_secs(1)).unwrap();
        let mut config = Config::default();
        config.submit_delay_ms = 0;
        App::new(config, fetcher)
    }

    fn resolve(app: &mut App, input: &str) {
        app.submission.input = input.to_string();
        let attempt = app.submission.begin().unwrap();
        apply_submission(app, attempt);
    }

    #[test]
    fn resolved_submission_builds_five_cards() {
        let mut app = test_app();
        resolve(&mut app, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(app.cards.len(), 5);
        assert_eq!(app.focus, Focus::Cards);
        assert!(app.cards.iter().all(|c| c.state.image == ImageState::Loading));
    }

    #[test]
    fn failed_submission_shows_message_and_no_cards() {
        let mut app = test_app();
        resolve(&mut app, "not a url");
        assert!(app.cards.is_empty());
        assert_eq!(
            app.status,
            crate::session::submission::INVALID_INPUT_MESSAGE
        );
    }

    #[test]
    fn stale_image_results_are_ignored() {
        let mut app = test_app();
        resolve(&mut app, "a-b_c1234XY");
        let old = app.generation;
        resolve(&mut app, "dQw4w9WgXcQ");
        app.worker_tx
            .send(WorkerMsg::ImageLoaded {
                generation: old,
                quality: Quality::Default,
                result: Err(anyhow!("404")),
            })
            .unwrap();
        poll_worker(&mut app);
        assert!(app.cards.iter().all(|c| !c.state.is_errored()));
    }

    #[test]
    fn failed_image_guards_only_its_card() {
        let mut app = test_app();
        resolve(&mut app, "dQw4w9WgXcQ");
        app.worker_tx
            .send(WorkerMsg::ImageLoaded {
                generation: app.generation,
                quality: Quality::MaxResDefault,
                result: Err(anyhow!("404")),
            })
            .unwrap();
        poll_worker(&mut app);

        assert!(app.cards[0].state.is_errored());
        assert!(!app.cards[1].state.is_errored());

        start_download(&mut app, 0);
        assert!(!app.cards[0].state.is_downloading());
        copy_link(&mut app, 0);
        assert!(!app.cards[0].state.is_copied());
    }

    #[test]
    fn download_failure_raises_blocking_notice() {
        let mut app = test_app();
        resolve(&mut app, "dQw4w9WgXcQ");
        assert!(app.cards[2].state.begin_download());
        app.worker_tx
            .send(WorkerMsg::DownloadDone {
                generation: app.generation,
                quality: Quality::HqDefault,
                result: Err(anyhow!("connection reset")),
            })
            .unwrap();
        poll_worker(&mut app);
        assert!(!app.cards[2].state.is_downloading());
        assert_eq!(app.notice.as_deref(), Some(DOWNLOAD_FAILED_NOTICE));
    }

    #[test]
    fn resubmitting_same_id_drops_old_download_result() {
        let mut app = test_app();
        resolve(&mut app, "dQw4w9WgXcQ");
        assert!(app.cards[0].state.begin_download());
        let old = app.generation;

        resolve(&mut app, "dQw4w9WgXcQ");
        assert_ne!(app.generation, old);
        assert!(app.cards[0].state.begin_download());

        app.worker_tx
            .send(WorkerMsg::DownloadDone {
                generation: old,
                quality: Quality::MaxResDefault,
                result: Err(anyhow!("connection reset")),
            })
            .unwrap();
        poll_worker(&mut app);

        assert!(app.cards[0].state.is_downloading());
        assert!(app.notice.is_none());
        assert!(!app.cards[0].state.begin_download());
    }

    #[test]
    fn results_arriving_while_checking_are_dropped() {
        let mut app = test_app();
        resolve(&mut app, "dQw4w9WgXcQ");
        let old = app.generation;
        app.submission.input = "dQw4w9WgXcQ".to_string();
        start_submit(&mut app);
        assert!(app.cards.is_empty());
        assert_ne!(app.generation, old);
    }

    #[test]
    fn selection_wraps_around() {
        let mut app = test_app();
        resolve(&mut app, "dQw4w9WgXcQ");
        app.select_prev();
        assert_eq!(app.selected, 4);
        app.select_next();
        assert_eq!(app.selected, 0);
    }
}
