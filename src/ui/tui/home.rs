//! TUI 首页：输入框、提交按钮、错误提示与卡片网格。

use super::*;

use super::super::COPYRIGHT_NOTICE;

pub(super) fn handle_event_home(app: &mut App, event: Event) -> Result<()> {
    match event {
        Event::Paste(s) => {
            if app.focus == Focus::Input {
                app.submission.input.push_str(s.trim_end_matches(['\r', '\n']));
            }
        }
        Event::Key(key) if key.kind == KeyEventKind::Press => match app.focus {
            Focus::Input => handle_key_input(app, key.code, key.modifiers),
            Focus::Submit => handle_key_submit(app, key.code),
            Focus::Cards => handle_key_cards(app, key.code),
        },
        Event::Mouse(me) => handle_mouse_home(app, me),
        _ => {}
    }
    Ok(())
}

fn handle_key_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char('v') if modifiers.contains(KeyModifiers::CONTROL) => paste_clipboard(app),
        KeyCode::Char(c)
            if !modifiers.contains(KeyModifiers::CONTROL)
                && !modifiers.contains(KeyModifiers::ALT) =>
        {
            app.submission.input.push(c);
        }
        KeyCode::Backspace => {
            app.submission.input.pop();
        }
        KeyCode::Enter => super::start_submit(app),
        KeyCode::Esc => app.submission.input.clear(),
        KeyCode::Tab => cycle_focus(app, true),
        KeyCode::BackTab => cycle_focus(app, false),
        KeyCode::Down if !app.cards.is_empty() => app.focus = Focus::Cards,
        _ => {}
    }
}

fn handle_key_submit(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter | KeyCode::Char(' ') => super::start_submit(app),
        KeyCode::Char('t') => super::toggle_theme(app),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => app.focus = Focus::Input,
        KeyCode::Tab => cycle_focus(app, true),
        KeyCode::BackTab => cycle_focus(app, false),
        KeyCode::Down if !app.cards.is_empty() => app.focus = Focus::Cards,
        _ => {}
    }
}

fn handle_key_cards(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
            app.select_prev()
        }
        KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
            app.select_next()
        }
        KeyCode::Char('d') => super::start_download(app, app.selected),
        KeyCode::Char('c') => super::copy_link(app, app.selected),
        KeyCode::Char('o') => super::open_selected(app),
        KeyCode::Enter | KeyCode::Char('p') => preview::show_preview(app),
        KeyCode::Char('t') => super::toggle_theme(app),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('/') | KeyCode::Char('i') => app.focus = Focus::Input,
        KeyCode::Tab => cycle_focus(app, true),
        KeyCode::BackTab => cycle_focus(app, false),
        _ => {}
    }
}

fn cycle_focus(app: &mut App, forward: bool) {
    let has_cards = !app.cards.is_empty();
    app.focus = match (app.focus, forward) {
        (Focus::Input, true) => Focus::Submit,
        (Focus::Submit, true) if has_cards => Focus::Cards,
        (Focus::Submit, true) | (Focus::Cards, true) => Focus::Input,
        (Focus::Input, false) if has_cards => Focus::Cards,
        (Focus::Input, false) | (Focus::Cards, false) => Focus::Submit,
        (Focus::Submit, false) => Focus::Input,
    };
}

fn paste_clipboard(app: &mut App) {
    match clipboard::get_text() {
        Ok(Some(text)) => app
            .submission
            .input
            .push_str(text.trim_end_matches(['\r', '\n'])),
        Ok(None) => app.status = "剪贴板为空或当前构建未包含剪贴板后端".to_string(),
        Err(e) => app.status = format!("读取剪贴板失败：{e}"),
    }
}

fn handle_mouse_home(app: &mut App, me: event::MouseEvent) {
    let Some(layout) = app.last_home_layout.clone() else {
        return;
    };
    match me.kind {
        MouseEventKind::ScrollUp if !app.cards.is_empty() => {
            app.focus = Focus::Cards;
            app.select_prev();
        }
        MouseEventKind::ScrollDown if !app.cards.is_empty() => {
            app.focus = Focus::Cards;
            app.select_next();
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if super::pos_in(layout.input, me.column, me.row) {
                app.focus = Focus::Input;
                return;
            }
            if super::pos_in(layout.submit, me.column, me.row) {
                app.focus = Focus::Submit;
                super::start_submit(app);
                return;
            }
            for (idx, card) in layout.cards.iter().enumerate() {
                if super::pos_in(card.image, me.column, me.row) {
                    select_card(app, idx);
                    super::open_selected(app);
                } else if super::pos_in(card.download, me.column, me.row) {
                    select_card(app, idx);
                    super::start_download(app, idx);
                } else if super::pos_in(card.copy, me.column, me.row) {
                    select_card(app, idx);
                    super::copy_link(app, idx);
                } else {
                    continue;
                }
                return;
            }
        }
        _ => {}
    }
}

fn select_card(app: &mut App, idx: usize) {
    app.selected = idx;
    app.focus = Focus::Cards;
}

/// 光标停在输入末尾；超长输入时钉在框内最后一格。
fn input_cursor_x(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    let max_x = area.x.saturating_add(area.width.saturating_sub(2));
    area.x.saturating_add(3).saturating_add(typed).min(max_x)
}

pub(super) fn draw_home(frame: &mut ratatui::Frame, app: &mut App) {
    let palette = app.palette();
    let (main, log_area) = super::split_with_log(frame.size());
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(main);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "ThumbFetch",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  保存到: "),
        Span::styled(
            app.config.default_save_dir().display().to_string(),
            Style::default().fg(palette.ok),
        ),
        Span::raw(format!(
            "  |  主题: {} (Ctrl+T)  |  Ctrl+C 退出",
            app.theme.as_str()
        )),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.muted))
            .title("YouTube Thumbnail Fetcher"),
    );
    frame.render_widget(header, layout[0]);

    let input_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(22)])
        .split(layout[1]);
    let (input_area, submit_area) = (input_row[0], input_row[1]);

    let focused = |f: Focus| {
        if app.focus == f {
            Style::default().fg(palette.focus)
        } else {
            Style::default().fg(palette.muted)
        }
    };

    let input_text = if app.submission.input.is_empty() && app.focus != Focus::Input {
        Span::styled("e.g., dQw4w9WgXcQ", Style::default().fg(palette.muted))
    } else {
        Span::styled(app.submission.input.clone(), Style::default().fg(palette.fg))
    };
    let input = Paragraph::new(Line::from(vec![Span::raw("> "), input_text])).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused(Focus::Input))
            .title("YouTube 链接 / 视频 ID (Enter 提交, Tab 切换)"),
    );
    frame.render_widget(input, input_area);
    if app.focus == Focus::Input && app.view == View::Home {
        frame.set_cursor(
            input_cursor_x(input_area, &app.submission.input),
            input_area.y + 1,
        );
    }

    let checking = app.submission.is_checking();
    let (submit_label, submit_style) = if checking {
        (
            format!("Checking {}", super::spinner_frame(app)),
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::DIM),
        )
    } else {
        (
            "Get Thumbnails".to_string(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
    };
    let submit = Paragraph::new(submit_label)
        .style(submit_style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused(Focus::Submit)),
        );
    frame.render_widget(submit, submit_area);

    let message = match app.submission.error() {
        Some(err) => Line::from(Span::styled(
            err.to_string(),
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            app.status.clone(),
            Style::default().fg(palette.fg),
        )),
    };
    frame.render_widget(Paragraph::new(message), layout[2]);

    let cards_block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused(Focus::Cards))
        .title("Available Thumbnails (←/→ 选择, d 下载, c 复制, o 打开, Enter 预览, i 输入, q 退出)");
    let cards_inner = cards_block.inner(layout[3]);
    frame.render_widget(cards_block, layout[3]);

    let card_layouts = if app.cards.is_empty() {
        let hint = if checking {
            "Checking…"
        } else {
            "Paste a YouTube link or video ID to get all available thumbnails."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(palette.muted)))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            cards_inner,
        );
        Vec::new()
    } else {
        cards::draw_cards(frame, cards_inner, app)
    };

    frame.render_widget(
        Paragraph::new(Span::styled(
            COPYRIGHT_NOTICE,
            Style::default().fg(palette.muted),
        ))
        .alignment(Alignment::Center),
        layout[4],
    );

    app.last_home_layout = Some(HomeLayout {
        input: input_area,
        submit: submit_area,
        cards: card_layouts,
    });
    super::render_log_box(frame, log_area, app);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let fetcher = MediaFetcher::new(Duration::from_secs(1)).unwrap();
        App::new(Config::default(), fetcher)
    }

    fn press(app: &mut App, code: KeyCode) {
        let evt = Event::Key(event::KeyEvent::new(code, KeyModifiers::NONE));
        handle_event_home(app, evt).unwrap();
    }

    #[test]
    fn typing_goes_into_input_including_shortcut_letters() {
        let mut app = app();
        for c in "dq".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.submission.input, "dq");
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.submission.input, "d");
    }

    #[test]
    fn paste_event_appends_to_input() {
        let mut app = app();
        handle_event_home(&mut app, Event::Paste("https://youtu.be/dQw4w9WgXcQ\n".into()))
            .unwrap();
        assert_eq!(app.submission.input, "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn enter_starts_checking_and_disables_resubmit() {
        let mut app = app();
        app.submission.input = "dQw4w9WgXcQ".to_string();
        press(&mut app, KeyCode::Enter);
        assert!(app.submission.is_checking());
        press(&mut app, KeyCode::Enter);
        assert!(app.submission.is_checking());
    }

    #[test]
    fn cursor_stays_inside_input_box() {
        let area = Rect::new(2, 4, 40, 3);
        assert_eq!(input_cursor_x(area, ""), 5);
        assert_eq!(input_cursor_x(area, "abc"), 8);
        assert_eq!(input_cursor_x(area, &"x".repeat(70_000)), 40);

        let edge = Rect::new(u16::MAX - 10, 0, 10, 3);
        assert_eq!(input_cursor_x(edge, &"x".repeat(100)), u16::MAX - 2);
    }

    #[test]
    fn tab_skips_cards_when_there_are_none() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Submit);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Input);
    }
}
