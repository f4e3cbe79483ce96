//! 缩略图字符画预览（卡片内小图与全屏大图）。

use super::*;
use image::imageops::{self, FilterType};
use image::{GenericImageView, GrayImage};

/// 预览缓存的最大尺寸；原图解码后立即缩小，只保留灰度。
const CACHE_W: u32 = 192;
const CACHE_H: u32 = 108;

const PALETTE: &[u8] = b" .:-=+*#%@";

#[derive(Debug, Clone)]
pub(super) struct LoadedImage {
    pub(super) width: u32,
    pub(super) height: u32,
    pub(super) luma: GrayImage,
}

pub(super) fn decode_preview(bytes: &[u8]) -> Result<LoadedImage> {
    let img = image::load_from_memory(bytes).context("decode thumbnail")?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(anyhow!("empty image"));
    }
    Ok(LoadedImage {
        width,
        height,
        luma: img.thumbnail(CACHE_W, CACHE_H).to_luma8(),
    })
}

/// 字符单元约为 1:2，所以高度按一半换算。`invert` 用于浅色背景。
pub(super) fn luma_to_ascii(img: &GrayImage, max_w: u16, max_h: u16, invert: bool) -> Vec<String> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || max_w == 0 || max_h == 0 {
        return Vec::new();
    }

    let mut target_w = (max_w as u32).min(w * 2).max(1);
    let mut target_h = (h * target_w / w / 2).max(1);
    if target_h > max_h as u32 {
        target_h = max_h as u32;
        target_w = (w * target_h * 2 / h).clamp(1, max_w as u32);
    }

    let small = imageops::resize(img, target_w, target_h, FilterType::Triangle);
    let last = (PALETTE.len() - 1) as f32;
    small
        .rows()
        .map(|row| {
            row.map(|px| {
                let mut v = px[0] as f32 / 255.0;
                if invert {
                    v = 1.0 - v;
                }
                PALETTE[(v * last).round() as usize] as char
            })
            .collect()
        })
        .collect()
}

pub(super) fn show_preview(app: &mut App) {
    let Some(card) = app.cards.get(app.selected) else {
        return;
    };
    if card.state.is_errored() {
        app.status = format!("{}: Not Available", card.record.label);
        return;
    }
    app.view = View::Preview;
    app.status = format!(
        "{} ({})  o: 浏览器打开  d: 下载  c: 复制链接  q/Esc: 返回",
        card.record.label, card.record.resolution
    );
}

pub(super) fn handle_event_preview(app: &mut App, event: Event) -> Result<()> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => {
                app.view = View::Home;
            }
            KeyCode::Char('o') => super::open_selected(app),
            KeyCode::Char('d') => super::start_download(app, app.selected),
            KeyCode::Char('c') => super::copy_link(app, app.selected),
            KeyCode::Left => {
                app.select_prev();
                show_preview(app);
            }
            KeyCode::Right => {
                app.select_next();
                show_preview(app);
            }
            _ => {}
        },
        Event::Mouse(me) => {
            if let MouseEventKind::Down(MouseButton::Left) = me.kind {
                super::open_selected(app);
            }
        }
        _ => {}
    }
    Ok(())
}

pub(super) fn draw_preview(frame: &mut ratatui::Frame, app: &mut App) {
    let palette = app.palette();
    let (main, log_area) = super::split_with_log(frame.size());
    let Some(card) = app.cards.get(app.selected) else {
        app.view = View::Home;
        return;
    };

    let title = format!(" {} | {} ", card.record.label, card.record.url);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(title);
    let inner = block.inner(main);

    let lines: Vec<Line> = match (&card.image, card.state.image) {
        (Some(img), _) => {
            let mut lines: Vec<Line> = luma_to_ascii(
                &img.luma,
                inner.width,
                inner.height.saturating_sub(1),
                app.theme == Theme::Light,
            )
            .into_iter()
            .map(Line::from)
            .collect();
            lines.push(Line::from(Span::styled(
                format!("{}x{}  ->  {}", img.width, img.height, card.record.filename),
                Style::default().fg(palette.muted),
            )));
            lines
        }
        (None, ImageState::Loading) => vec![Line::from("Loading…")],
        (None, _) => vec![Line::from("Not Available")],
    };

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(palette.fg))
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, main);
    super::render_log_box(frame, log_area, app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn gradient(w: u32, h: u32) -> GrayImage {
        ImageBuffer::from_fn(w, h, |x, _| Luma([(x * 255 / (w - 1)) as u8]))
    }

    #[test]
    fn ascii_fits_requested_box() {
        let img = gradient(160, 90);
        let lines = luma_to_ascii(&img, 40, 10, false);
        assert!(!lines.is_empty());
        assert!(lines.len() <= 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 40));
    }

    #[test]
    fn tall_box_keeps_aspect_ratio() {
        let img = gradient(160, 90);
        let lines = luma_to_ascii(&img, 32, 100, false);
        // 32 列宽的 16:9 图，字符高度约为 32 * 9 / 16 / 2 = 9
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0].chars().count(), 32);
    }

    #[test]
    fn brightness_maps_to_density() {
        let white: GrayImage = ImageBuffer::from_pixel(8, 8, Luma([255]));
        let dark = luma_to_ascii(&white, 4, 4, false);
        assert!(dark.iter().all(|l| l.chars().all(|c| c == '@')));
        let light = luma_to_ascii(&white, 4, 4, true);
        assert!(light.iter().all(|l| l.chars().all(|c| c == ' ')));
    }

    #[test]
    fn degenerate_sizes_render_nothing() {
        let img = gradient(16, 9);
        assert!(luma_to_ascii(&img, 0, 5, false).is_empty());
        assert!(luma_to_ascii(&img, 5, 0, false).is_empty());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_preview(b"definitely not a jpeg").is_err());
    }

    #[test]
    fn decode_downscales_into_cache() {
        let img = image::DynamicImage::ImageLuma8(gradient(640, 360));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let loaded = decode_preview(&bytes).unwrap();
        assert_eq!((loaded.width, loaded.height), (640, 360));
        assert!(loaded.luma.width() <= CACHE_W && loaded.luma.height() <= CACHE_H);
    }
}
