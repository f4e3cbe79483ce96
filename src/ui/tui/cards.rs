//! 缩略图卡片网格。

use super::*;

const MIN_CARD_WIDTH: u16 = 26;

/// 列数按宽度自适应，最多一行五张。
fn grid_columns(width: u16, count: usize) -> usize {
    let fit = (width / MIN_CARD_WIDTH).max(1) as usize;
    fit.min(count.max(1))
}

pub(super) fn draw_cards(frame: &mut ratatui::Frame, area: Rect, app: &App) -> Vec<CardLayout> {
    let cols = grid_columns(area.width, app.cards.len());
    let rows = app.cards.len().div_ceil(cols);
    if rows == 0 {
        return Vec::new();
    }

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    let mut layouts = Vec::with_capacity(app.cards.len());
    for (row_idx, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
            .split(*row_area);
        for (col_idx, cell) in cells.iter().enumerate() {
            let idx = row_idx * cols + col_idx;
            let Some(card) = app.cards.get(idx) else {
                break;
            };
            layouts.push(draw_card(frame, *cell, app, card, idx == app.selected));
        }
    }
    layouts
}

fn draw_card(
    frame: &mut ratatui::Frame,
    area: Rect,
    app: &App,
    card: &Card,
    selected: bool,
) -> CardLayout {
    let palette = app.palette();
    let border = if selected && app.focus == Focus::Cards {
        Style::default()
            .fg(palette.focus)
            .add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(
            format!(" {} ", card.record.label),
            Style::default()
                .fg(palette.fg)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);
    let (image_area, info_area, download_area, copy_area) = (parts[0], parts[1], parts[2], parts[3]);

    frame.render_widget(image_widget(app, card, image_area), image_area);

    let mut info = vec![Span::styled(
        card.record.resolution,
        Style::default().fg(palette.muted),
    )];
    if let Some(img) = card.image.as_ref() {
        let actual = format!("{}x{}", img.width, img.height);
        if actual != card.record.resolution {
            info.push(Span::styled(
                format!(" (actual {actual})"),
                Style::default().fg(palette.muted),
            ));
        }
    }
    frame.render_widget(
        Paragraph::new(Line::from(info)).alignment(Alignment::Center),
        info_area,
    );

    let errored = card.state.is_errored();
    let disabled = Style::default()
        .fg(palette.muted)
        .add_modifier(Modifier::DIM);

    let (download_label, download_style) = if errored {
        ("[ Download ]".to_string(), disabled)
    } else if card.state.is_downloading() {
        (
            format!("[ Downloading... {} ]", super::spinner_frame(app)),
            Style::default()
                .fg(palette.ok)
                .add_modifier(Modifier::SLOW_BLINK),
        )
    } else {
        (
            "[ Download ]".to_string(),
            Style::default().fg(palette.ok).add_modifier(Modifier::BOLD),
        )
    };
    frame.render_widget(
        Paragraph::new(download_label)
            .style(download_style)
            .alignment(Alignment::Center),
        download_area,
    );

    let (copy_label, copy_style) = if errored {
        ("[ Copy Link ]", disabled)
    } else if card.state.is_copied() {
        (
            "[ Copied! ]",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ("[ Copy Link ]", Style::default().fg(palette.fg))
    };
    frame.render_widget(
        Paragraph::new(copy_label)
            .style(copy_style)
            .alignment(Alignment::Center),
        copy_area,
    );

    CardLayout {
        image: image_area,
        download: download_area,
        copy: copy_area,
    }
}

fn image_widget(app: &App, card: &Card, area: Rect) -> Paragraph<'static> {
    let palette = app.palette();
    let centered = |text: String, style: Style| {
        let pad = area.height.saturating_sub(1) / 2;
        let mut lines = vec![Line::from(""); pad as usize];
        lines.push(Line::from(Span::styled(text, style)));
        Paragraph::new(lines).alignment(Alignment::Center)
    };

    match (card.state.image, card.image.as_ref()) {
        (ImageState::Errored, _) => centered(
            "Not Available".to_string(),
            Style::default().fg(palette.muted),
        ),
        (ImageState::Loaded, Some(img)) if app.config.image_preview => {
            let lines: Vec<Line> = preview::luma_to_ascii(
                &img.luma,
                area.width,
                area.height,
                app.theme == Theme::Light,
            )
            .into_iter()
            .map(Line::from)
            .collect();
            Paragraph::new(lines)
                .style(Style::default().fg(palette.fg))
                .alignment(Alignment::Center)
        }
        (ImageState::Loaded, _) => centered(
            "✓ available (o: open)".to_string(),
            Style::default().fg(palette.ok),
        ),
        (ImageState::Loading, _) => centered(
            format!("Loading {}", super::spinner_frame(app)),
            Style::default().fg(palette.muted),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_adapt_to_width() {
        assert_eq!(grid_columns(200, 5), 5);
        assert_eq!(grid_columns(80, 5), 3);
        assert_eq!(grid_columns(20, 5), 1);
        assert_eq!(grid_columns(200, 2), 2);
    }
}
