// ============================================================================
// SHARE - 1080x1080 share card for one of today's three cards
// ============================================================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::canvas::{Align, Area, Canvas, Font, Rgb, SvgCanvas, ellipsize, wrap_text};
use crate::schedule::Slot;
use crate::theme::Theme;
use crate::today::{Closing, SlotContent, TodayView, quote_cite};

pub const CARD_SIZE: f32 = 1080.0;
const PADDING: f32 = 96.0;
const CONTENT_WIDTH: f32 = CARD_SIZE - PADDING * 2.0;
const BODY_TOP: f32 = 280.0;
const BODY_BOTTOM: f32 = 930.0;
const BOX_PADDING: f32 = 40.0;
const BOX_ACCENT: f32 = 10.0;
const LINE_HEIGHT: f32 = 1.3;
const BADGE_PAD_X: f32 = 28.0;
const BADGE_HEIGHT: f32 = 56.0;
const MIN_SCALE: f32 = 0.55;
const SCALE_STEP: f32 = 0.05;

/// Which of today's three cards to share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardIndex {
    Prompt,
    Action,
    Closing,
}

impl CardIndex {
    pub const ALL: [CardIndex; 3] = [CardIndex::Prompt, CardIndex::Action, CardIndex::Closing];

    pub fn from_number(n: u8) -> Option<CardIndex> {
        match n {
            1 => Some(CardIndex::Prompt),
            2 => Some(CardIndex::Action),
            3 => Some(CardIndex::Closing),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            CardIndex::Prompt => 1,
            CardIndex::Action => 2,
            CardIndex::Closing => 3,
        }
    }
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("card {0} has nothing to share for this slot")]
    NothingToShare(u8),

    #[error("could not write share card to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not hand share card to the system: {0}")]
    Launch(#[source] io::Error),
}

struct Palette {
    background: Rgb,
    text: Rgb,
    muted: Rgb,
    panel: Rgb,
    accent: Rgb,
}

fn palette(slot: Slot, theme: Theme) -> Palette {
    let accent = match theme {
        Theme::PersonalIdentity => Rgb(0xb5, 0x6c, 0xe0),
        Theme::HealthBody => Rgb(0x3f, 0xb6, 0x8f),
        Theme::Burnout => Rgb(0xe9, 0x7a, 0x53),
        Theme::Financial => Rgb(0xd9, 0xa4, 0x2b),
        Theme::Social => Rgb(0x4a, 0x96, 0xd8),
    };
    match slot {
        Slot::Morning => Palette {
            background: Rgb(0xff, 0xf6, 0xe9),
            text: Rgb(0x2b, 0x21, 0x18),
            muted: Rgb(0x8a, 0x78, 0x66),
            panel: Rgb(0xff, 0xff, 0xff),
            accent,
        },
        Slot::Afternoon => Palette {
            background: Rgb(0xea, 0xf4, 0xfb),
            text: Rgb(0x14, 0x26, 0x3a),
            muted: Rgb(0x5d, 0x73, 0x8a),
            panel: Rgb(0xff, 0xff, 0xff),
            accent,
        },
        Slot::Night => Palette {
            background: Rgb(0x1b, 0x1f, 0x3b),
            text: Rgb(0xf1, 0xf1, 0xf7),
            muted: Rgb(0xa6, 0xa8, 0xc6),
            panel: Rgb(0x2a, 0x2f, 0x55),
            accent,
        },
    }
}

/// Body description before wrapping.
#[derive(Debug, Clone)]
enum Piece {
    Text { text: String, font: Font, color: Rgb },
    Boxed { accent: bool, children: Vec<Piece> },
    Gap(f32),
}

/// Body after wrapping; heights are known. `width` is the column the text
/// was wrapped to.
#[derive(Debug, Clone)]
enum Laid {
    Text { lines: Vec<String>, font: Font, color: Rgb, width: f32 },
    Boxed { accent: bool, children: Vec<Laid> },
    Gap(f32),
}

impl Laid {
    fn height(&self) -> f32 {
        match self {
            Laid::Text { lines, font, .. } => lines.len() as f32 * font.size * LINE_HEIGHT,
            Laid::Boxed { children, .. } => {
                BOX_PADDING * 2.0 + children.iter().map(Laid::height).sum::<f32>()
            }
            Laid::Gap(h) => *h,
        }
    }
}

fn layout(canvas: &dyn Canvas, piece: &Piece, width: f32, scale: f32) -> Laid {
    match piece {
        Piece::Text { text, font, color } => {
            let font = font.scaled(scale);
            Laid::Text {
                lines: wrap_text(canvas, text, font, width),
                font,
                color: *color,
                width,
            }
        }
        Piece::Boxed { accent, children } => {
            let inner = width - BOX_PADDING * 2.0 - if *accent { BOX_ACCENT } else { 0.0 };
            Laid::Boxed {
                accent: *accent,
                children: children
                    .iter()
                    .map(|child| layout(canvas, child, inner, scale))
                    .collect(),
            }
        }
        Piece::Gap(h) => Laid::Gap(h * scale),
    }
}

fn total_height(blocks: &[Laid]) -> f32 {
    blocks.iter().map(Laid::height).sum()
}

/// A word longer than its column stays whole when wrapped, so a line can be
/// wider than the column even when the block height fits.
fn too_wide(canvas: &dyn Canvas, blocks: &[Laid]) -> bool {
    blocks.iter().any(|block| match block {
        Laid::Text { lines, font, width, .. } => lines
            .iter()
            .any(|line| canvas.measure_text(line, *font) > *width),
        Laid::Boxed { children, .. } => too_wide(canvas, children),
        Laid::Gap(_) => false,
    })
}

fn clip_wide_lines(canvas: &dyn Canvas, blocks: &mut [Laid]) {
    for block in blocks.iter_mut() {
        match block {
            Laid::Text { lines, font, width, .. } => {
                for line in lines.iter_mut() {
                    if canvas.measure_text(line, *font) > *width {
                        *line = ellipsize(canvas, line, *font, *width);
                    }
                }
            }
            Laid::Boxed { children, .. } => clip_wide_lines(canvas, children),
            Laid::Gap(_) => {}
        }
    }
}

/// Drops lines from the longest text block until the body fits, marking the
/// cut with an ellipsis.
fn truncate_to_fit(canvas: &dyn Canvas, blocks: &mut [Laid], max_height: f32) {
    while total_height(blocks) > max_height {
        let Some((lines, font, width)) = longest_text(blocks) else {
            return;
        };
        if lines.len() <= 1 {
            return;
        }
        lines.pop();
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(canvas, last, font, width);
        }
    }
}

fn longest_text(blocks: &mut [Laid]) -> Option<(&mut Vec<String>, Font, f32)> {
    let mut best: Option<(&mut Vec<String>, Font, f32)> = None;
    for block in blocks.iter_mut() {
        let candidate = match block {
            Laid::Text { lines, font, width, .. } => Some((lines, *font, *width)),
            Laid::Boxed { children, .. } => longest_text(children),
            Laid::Gap(_) => None,
        };
        if let Some((lines, font, width)) = candidate {
            let longer = best.as_ref().is_none_or(|(current, ..)| lines.len() > current.len());
            if longer {
                best = Some((lines, font, width));
            }
        }
    }
    best
}

fn text(text: impl Into<String>, font: Font, color: Rgb) -> Piece {
    Piece::Text {
        text: text.into(),
        font,
        color,
    }
}

fn eyebrow(label: &str, colors: &Palette) -> Piece {
    text(label.to_uppercase(), Font::sans(26.0).bold(), colors.accent)
}

fn body_pieces(content: &SlotContent, card: CardIndex, colors: &Palette) -> Result<Vec<Piece>, ShareError> {
    let pieces = match card {
        CardIndex::Prompt => {
            let prompt = content.prompt();
            if prompt.text.trim().is_empty() {
                return Err(ShareError::NothingToShare(card.number()));
            }
            vec![
                eyebrow(prompt.label, colors),
                Piece::Gap(28.0),
                text(prompt.text, Font::serif(64.0), colors.text),
            ]
        }
        CardIndex::Action => {
            let micro = content
                .micro_action()
                .ok_or(ShareError::NothingToShare(card.number()))?;
            let mut impact = vec![
                text("CHANGED BY", Font::sans(22.0).bold(), colors.muted),
                Piece::Gap(8.0),
                text(micro.whose_life.clone(), Font::sans(34.0).bold(), colors.text),
            ];
            if !micro.impact.trim().is_empty() {
                impact.push(Piece::Gap(14.0));
                impact.push(text(micro.impact.clone(), Font::sans(32.0), colors.text));
            }
            vec![
                eyebrow("Today's micro-action", colors),
                Piece::Gap(24.0),
                text(micro.action.clone(), Font::sans(54.0).bold(), colors.text),
                Piece::Gap(36.0),
                Piece::Boxed {
                    accent: false,
                    children: impact,
                },
            ]
        }
        CardIndex::Closing => {
            let closing = content.closing();
            let boxed = match closing {
                Closing::Wisdom(quote) => {
                    if quote.text.trim().is_empty() {
                        return Err(ShareError::NothingToShare(card.number()));
                    }
                    vec![Piece::Boxed {
                        accent: true,
                        children: vec![
                            text(
                                format!("“{}”", quote.text),
                                Font::serif(46.0).italic(),
                                colors.text,
                            ),
                            Piece::Gap(20.0),
                            text(quote_cite(quote), Font::sans(30.0), colors.muted),
                        ],
                    }]
                }
                Closing::Permission(slip) => {
                    if slip.trim().is_empty() {
                        return Err(ShareError::NothingToShare(card.number()));
                    }
                    vec![Piece::Boxed {
                        accent: true,
                        children: vec![text(slip, Font::serif(50.0), colors.text)],
                    }]
                }
                Closing::Release { gratitude, release } => {
                    if gratitude.trim().is_empty() && release.trim().is_empty() {
                        return Err(ShareError::NothingToShare(card.number()));
                    }
                    vec![
                        Piece::Boxed {
                            accent: false,
                            children: vec![text(gratitude, Font::sans(40.0), colors.text)],
                        },
                        Piece::Gap(28.0),
                        Piece::Boxed {
                            accent: true,
                            children: vec![text(release, Font::serif(44.0).italic(), colors.text)],
                        },
                    ]
                }
            };
            let mut pieces = vec![eyebrow(closing.label(), colors), Piece::Gap(28.0)];
            pieces.extend(boxed);
            pieces
        }
    };
    Ok(pieces)
}

/// Shrinks fonts until the body fits between `BODY_TOP` and `BODY_BOTTOM`
/// and every line fits its column. At the smallest scale, overlong words and
/// surplus lines are cut with an ellipsis.
fn fit_body(canvas: &dyn Canvas, pieces: &[Piece]) -> Vec<Laid> {
    let max_height = BODY_BOTTOM - BODY_TOP;
    let mut scale = 1.0;
    loop {
        let mut blocks: Vec<Laid> = pieces
            .iter()
            .map(|piece| layout(canvas, piece, CONTENT_WIDTH, scale))
            .collect();
        if total_height(&blocks) <= max_height && !too_wide(canvas, &blocks) {
            return blocks;
        }
        if scale - SCALE_STEP < MIN_SCALE {
            clip_wide_lines(canvas, &mut blocks);
            truncate_to_fit(canvas, &mut blocks, max_height);
            return blocks;
        }
        scale -= SCALE_STEP;
    }
}

fn paint(canvas: &mut dyn Canvas, block: &Laid, x: f32, y: f32, width: f32, colors: &Palette) -> f32 {
    match block {
        Laid::Text { lines, font, color, .. } => {
            let step = font.size * LINE_HEIGHT;
            for (i, line) in lines.iter().enumerate() {
                let baseline = y + step * i as f32 + font.size;
                canvas.fill_text(line, x, baseline, *font, *color, Align::Left);
            }
            block.height()
        }
        Laid::Boxed { accent, children } => {
            let height = block.height();
            canvas.fill_rect(Area::new(x, y, width, height), colors.panel, 24.0);
            let mut inner_x = x + BOX_PADDING;
            if *accent {
                canvas.fill_rect(
                    Area::new(x + BOX_PADDING * 0.5, y + BOX_PADDING, BOX_ACCENT * 0.6, height - BOX_PADDING * 2.0),
                    colors.accent,
                    2.0,
                );
                inner_x += BOX_ACCENT;
            }
            let inner_width = width - (inner_x - x) - BOX_PADDING;
            let mut cursor = y + BOX_PADDING;
            for child in children {
                cursor += paint(canvas, child, inner_x, cursor, inner_width, colors);
            }
            height
        }
        Laid::Gap(h) => *h,
    }
}

/// Draws card `card` of today's view onto `canvas`.
pub fn render_card(canvas: &mut dyn Canvas, view: &TodayView, card: CardIndex) -> Result<(), ShareError> {
    let content = view
        .content
        .as_ref()
        .ok_or(ShareError::NothingToShare(card.number()))?;
    let colors = palette(view.slot, view.theme);
    let pieces = body_pieces(content, card, &colors)?;
    let width = canvas.width();
    let height = canvas.height();

    canvas.fill_rect(Area::new(0.0, 0.0, width, height), colors.background, 0.0);
    canvas.fill_rect(Area::new(0.0, 0.0, width, 16.0), colors.accent, 0.0);

    canvas.fill_text("daily nudge", PADDING, 148.0, Font::serif(40.0).bold(), colors.text, Align::Left);

    let badge_font = Font::sans(26.0).bold();
    let badge_label = view.slot.label().to_uppercase();
    let badge_width = canvas.measure_text(&badge_label, badge_font) + BADGE_PAD_X * 2.0;
    let badge_x = width - PADDING - badge_width;
    canvas.fill_rect(Area::new(badge_x, 108.0, badge_width, BADGE_HEIGHT), colors.accent, BADGE_HEIGHT / 2.0);
    canvas.fill_text(
        &badge_label,
        badge_x + badge_width / 2.0,
        108.0 + BADGE_HEIGHT / 2.0 + badge_font.size * 0.35,
        badge_font,
        colors.background,
        Align::Center,
    );

    let blocks = fit_body(canvas, &pieces);
    let mut cursor = BODY_TOP;
    for block in &blocks {
        cursor += paint(canvas, block, PADDING, cursor, CONTENT_WIDTH, &colors);
    }

    let footer_font = Font::sans(26.0);
    let footer = if canvas.measure_text(&view.day_context, footer_font) > CONTENT_WIDTH {
        ellipsize(canvas, &view.day_context, footer_font, CONTENT_WIDTH)
    } else {
        view.day_context.clone()
    };
    canvas.fill_text(&footer, PADDING, CARD_SIZE - 80.0, footer_font, colors.muted, Align::Left);

    Ok(())
}

/// Whether card `card` has anything to draw, without drawing it.
pub fn card_has_body(view: &TodayView, card: CardIndex) -> bool {
    view.content.as_ref().is_some_and(|content| {
        body_pieces(content, card, &palette(view.slot, view.theme)).is_ok()
    })
}

/// An encoded card ready to hand to a share target.
#[derive(Debug, Clone)]
pub struct SharePayload {
    pub title: String,
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

pub fn build_payload(view: &TodayView, card: CardIndex) -> Result<SharePayload, ShareError> {
    let mut canvas = SvgCanvas::new(CARD_SIZE, CARD_SIZE);
    render_card(&mut canvas, view, card)?;
    let id = uuid::Uuid::new_v4().simple().to_string();
    Ok(SharePayload {
        title: format!("Today's {} nudge", view.slot.label()),
        file_name: format!("nudge-{}-{}-{}.svg", view.slot.label(), card.number(), &id[..8]),
        mime: SvgCanvas::MIME,
        bytes: canvas.encode(),
    })
}

/// The platform's share surface. Optional: absence disables sharing.
pub trait ShareTarget {
    fn share(&self, payload: &SharePayload) -> Result<PathBuf, ShareError>;
}

/// Writes the card into a share directory and opens it with the system's
/// default application.
pub struct SystemShare {
    dir: PathBuf,
}

impl SystemShare {
    /// Returns `None` when sharing is disabled or no writable directory exists.
    pub fn detect(dir_override: Option<PathBuf>, disabled: bool) -> Option<SystemShare> {
        if disabled {
            log::info!("event=share_detect status=disabled");
            return None;
        }
        let dir = dir_override.or_else(default_share_dir)?;
        match fs::create_dir_all(&dir) {
            Ok(()) => {
                log::info!("event=share_detect status=ok dir={}", dir.display());
                Some(SystemShare { dir })
            }
            Err(err) => {
                log::warn!(
                    "event=share_detect status=unavailable dir={} error={}",
                    dir.display(),
                    err
                );
                None
            }
        }
    }
}

pub fn default_share_dir() -> Option<PathBuf> {
    dirs::picture_dir()
        .or_else(dirs::data_dir)
        .map(|base| base.join("dailynudge").join("share"))
}

pub fn write_payload(dir: &Path, payload: &SharePayload) -> Result<PathBuf, ShareError> {
    let path = dir.join(&payload.file_name);
    fs::write(&path, &payload.bytes).map_err(|source| ShareError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

impl ShareTarget for SystemShare {
    fn share(&self, payload: &SharePayload) -> Result<PathBuf, ShareError> {
        let path = write_payload(&self.dir, payload)?;
        open::that(&path).map_err(ShareError::Launch)?;
        log::info!(
            "event=share status=ok title=\"{}\" mime={} path={}",
            payload.title,
            payload.mime,
            path.display()
        );
        Ok(path)
    }
}
