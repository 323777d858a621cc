// ============================================================================
// RENDERING (Drawing) - all UI output functions
// ============================================================================

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::actions::ActionEntry;
use crate::app::{App, Panel, ViewMode};
use crate::schedule::Slot;
use crate::share::CardIndex;
use crate::stories::StoryCard;
use crate::theme::{Filter, Theme};
use crate::today::{Closing, SlotContent, TodayView, quote_cite};

/// One help entry; `view` ties it to a tab, `None` means it applies everywhere.
struct HelpTopic {
    view: Option<ViewMode>,
    title: &'static str,
    detail: &'static str,
}

const HELP_TOPICS: &[HelpTopic] = &[
    HelpTopic {
        view: None,
        title: "Open Help",
        detail: "Press ? to pop this help open, type to filter, Esc to hide it.",
    },
    HelpTopic {
        view: None,
        title: "Switching Views",
        detail: "Tab / Shift+Tab cycle Today, Explore and Stories. Jump straight there with t, e or s, or click a tab.",
    },
    HelpTopic {
        view: Some(ViewMode::Today),
        title: "Today's Nudge",
        detail: "What you see depends on the clock: morning 5-12, afternoon 12-20, night otherwise. Press d when you did the micro-action, r to read the whole story.",
    },
    HelpTopic {
        view: Some(ViewMode::Today),
        title: "Sharing Cards",
        detail: "Press 1, 2 or 3 on Today to turn that card into a 1080x1080 image. Enter shares, Esc backs out. Run with --share-dir to choose where cards go, or --no-share to hide sharing.",
    },
    HelpTopic {
        view: Some(ViewMode::Explore),
        title: "Explore Filters",
        detail: "Left/Right or 0-5 pick a category. 'all' shows two actions from each category, a single category shows three. Space marks the selected action done.",
    },
    HelpTopic {
        view: Some(ViewMode::Stories),
        title: "Stories",
        detail: "Up/Down select a story, Enter or r opens the rest of it. PageUp/PageDown scroll long stories.",
    },
    HelpTopic {
        view: None,
        title: "Mouse Basics",
        detail: "Click tabs, filter pills, the circle on an action, 'I did this', 'Read more' and share buttons. The wheel scrolls the current view.",
    },
    HelpTopic {
        view: None,
        title: "Missing Content",
        detail: "Everything comes from content.json next to where you start the app (or --content PATH). If it is missing, run python generate_content.py and restart.",
    },
];

pub fn theme_color(theme: Theme) -> Color {
    match theme {
        Theme::PersonalIdentity => Color::Magenta,
        Theme::HealthBody => Color::Green,
        Theme::Burnout => Color::LightRed,
        Theme::Financial => Color::Yellow,
        Theme::Social => Color::Cyan,
    }
}

fn slot_color(slot: Slot) -> Color {
    match slot {
        Slot::Morning => Color::Yellow,
        Slot::Afternoon => Color::LightBlue,
        Slot::Night => Color::Blue,
    }
}

/// A `percent_x` by `percent_y` slice of `area`, centered in it.
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width.saturating_mul(percent_x) / 100;
    let height = area.height.saturating_mul(percent_y) / 100;
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

/// Popup frame shared by the share, error and success dialogs. Returns the
/// message area; the bottom line carries `hint`.
fn popup_frame(frame: &mut Frame, area: Rect, title: &str, color: Color, hint: &str) -> Rect {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(color).bg(Color::Black));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(inner);
    let hint = Paragraph::new(hint.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray).italic());
    frame.render_widget(hint, chunks[1]);
    chunks[0]
}

// Helper: Split a rectangular area into N equal horizontal chunks
fn split_equal_horizontal(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let constraints = vec![Constraint::Ratio(1, count as u32); count];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

fn draw_message(frame: &mut Frame, area: Rect, title: &str, message: &str, color: Color) {
    let para = Paragraph::new(message.to_string())
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(color));
    frame.render_widget(para, area);
}

fn theme_tag(theme: Theme) -> Span<'static> {
    Span::styled(
        format!(" {} ", theme.display_label()),
        Style::default()
            .fg(Color::Black)
            .bg(theme_color(theme))
            .add_modifier(Modifier::BOLD),
    )
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(frame.size());

    draw_view_mode_selector(frame, app, chunks[0]);

    match app.view_mode {
        ViewMode::Today => draw_today_view(frame, app, chunks[1]),
        ViewMode::Explore => draw_explore_view(frame, app, chunks[1]),
        ViewMode::Stories => draw_stories_view(frame, app, chunks[1]),
    }

    draw_status_line(frame, app, chunks[2]);

    if app.pending_share.is_some() {
        draw_share_confirm_popup(frame, app);
    }

    if app.show_error_popup {
        draw_error_popup(frame, app);
    }

    if app.show_success_popup {
        draw_success_popup(frame, app);
    }

    if app.show_help_overlay {
        draw_help_overlay(frame, app);
    }
}

fn draw_view_mode_selector(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = split_equal_horizontal(area, ViewMode::ALL.len());
    app.view_mode_btns.clear();

    for (mode, rect) in ViewMode::ALL.into_iter().zip(chunks) {
        let style = if app.view_mode == mode {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let btn = Paragraph::new(mode.title())
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center)
            .style(style);
        app.view_mode_btns.push((mode, rect));
        frame.render_widget(btn, rect);
    }
}

fn draw_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.view_mode {
        ViewMode::Today if app.share_available() => "d did this · r read more · 1-3 share · ? help · q quit",
        ViewMode::Today => "d did this · r read more · ? help · q quit",
        ViewMode::Explore => "←/→ or 0-5 filter · ↑/↓ select · space mark done · ? help · q quit",
        ViewMode::Stories => "↑/↓ select · enter read more · ? help · q quit",
    };
    let line = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(line, area);
}

// ----------------------------------------------------------------------------
// Today
// ----------------------------------------------------------------------------

fn draw_today_view(frame: &mut Frame, app: &mut App, area: Rect) {
    app.did_this_btn = Rect::default();
    app.today_read_more_btn = Rect::default();
    app.share_btns.clear();

    let view = match &app.today {
        Panel::Loading => {
            draw_message(frame, area, "Today", "Loading today's nudge...", Color::DarkGray);
            return;
        }
        Panel::Empty => {
            draw_message(frame, area, "Today", "No content for today yet.", Color::Gray);
            return;
        }
        Panel::Error(message) => {
            draw_message(frame, area, "Today", message, Color::Red);
            return;
        }
        Panel::Ready(view) => view.clone(),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(13), Constraint::Min(6)])
        .split(area);

    let header = Line::from(vec![
        Span::styled(
            format!(" {} ", view.slot.label()),
            Style::default()
                .fg(Color::Black)
                .bg(slot_color(view.slot))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(view.day_context.clone(), Style::default().fg(Color::Gray)),
    ]);
    let header = Paragraph::new(header).block(
        Block::default()
            .title("Today's Nudge")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    frame.render_widget(header, chunks[0]);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(chunks[1]);

    match &view.content {
        Some(content) => {
            draw_prompt_card(frame, app, content, cards[0]);
            draw_action_card(frame, app, &view, content, cards[1]);
            draw_closing_card(frame, app, content, cards[2]);
        }
        None => {
            let message = format!("Nothing planned for this {}.", view.slot.label());
            let para = Paragraph::new(message)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(para, chunks[1]);
        }
    }

    draw_today_story(frame, app, &view, chunks[2]);
}

/// Bordered card with an optional share row along its bottom edge.
fn card_frame(frame: &mut Frame, app: &mut App, title: &str, card: CardIndex, area: Rect) -> Rect {
    let block = Block::default()
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !app.can_share(card) || inner.height < 2 {
        return inner;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    let share = Paragraph::new(format!("[{}] share", card.number()))
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(share, parts[1]);
    app.share_btns.push((card, parts[1]));
    parts[0]
}

fn draw_prompt_card(frame: &mut Frame, app: &mut App, content: &SlotContent, area: Rect) {
    let prompt = content.prompt();
    let body = card_frame(frame, app, prompt.label, CardIndex::Prompt, area);
    let style = match content.slot() {
        Slot::Morning => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        Slot::Afternoon | Slot::Night => Style::default().fg(Color::White).italic(),
    };
    let para = Paragraph::new(prompt.text.to_string())
        .wrap(Wrap { trim: true })
        .style(style);
    frame.render_widget(para, body);
}

fn draw_action_card(frame: &mut Frame, app: &mut App, view: &TodayView, content: &SlotContent, area: Rect) {
    let body = card_frame(frame, app, "Micro-action", CardIndex::Action, area);

    let Some(micro) = content.micro_action() else {
        let para = Paragraph::new("No micro-action for this slot.")
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(para, body);
        return;
    };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(body);

    let lines = vec![
        Line::from(theme_tag(view.theme)),
        Line::from(Span::styled(
            micro.action.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Changed by ", Style::default().fg(Color::DarkGray)),
            Span::styled(micro.whose_life.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(micro.impact.clone()),
    ];
    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(para, parts[0]);

    let style = if app.did_this {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let btn = Paragraph::new(app.did_this_label())
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
        .alignment(Alignment::Center)
        .style(style);
    frame.render_widget(btn, parts[1]);
    app.did_this_btn = parts[1];
}

fn draw_closing_card(frame: &mut Frame, app: &mut App, content: &SlotContent, area: Rect) {
    let closing = content.closing();
    let body = card_frame(frame, app, closing.label(), CardIndex::Closing, area);

    let lines = match closing {
        Closing::Wisdom(quote) => vec![
            Line::from(Span::styled(
                format!("\"{}\"", quote.text),
                Style::default().fg(Color::White).italic(),
            )),
            Line::from(""),
            Line::from(Span::styled(quote_cite(quote), Style::default().fg(Color::DarkGray))),
        ],
        Closing::Permission(slip) => vec![Line::from(Span::styled(
            slip.to_string(),
            Style::default().fg(Color::White),
        ))],
        Closing::Release { gratitude, release } => vec![
            Line::from(Span::styled(gratitude.to_string(), Style::default().fg(Color::White))),
            Line::from(""),
            Line::from(Span::styled(release.to_string(), Style::default().fg(Color::Gray).italic())),
        ],
    };
    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(para, body);
}

fn story_lines(story: &StoryCard, open: bool) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", story.initials()),
                Style::default()
                    .fg(Color::Black)
                    .bg(theme_color(story.theme))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(story.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(
            story.who_she_is.clone(),
            Style::default().fg(Color::DarkGray).italic(),
        )),
        Line::from(""),
        Line::from(story.first_paragraph().to_string()),
    ];
    if open {
        for para in story.remaining_paragraphs() {
            lines.push(Line::from(""));
            lines.push(Line::from(para.clone()));
        }
    }
    lines
}

fn read_more_label(open: bool) -> &'static str {
    if open { "Read less" } else { "Read more" }
}

fn draw_today_story(frame: &mut Frame, app: &mut App, view: &TodayView, area: Rect) {
    let Some(story) = view.story.as_ref() else {
        return;
    };

    let block = Block::default()
        .title("Today's Story")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let para = Paragraph::new(story_lines(story, app.today_story_open))
        .wrap(Wrap { trim: true })
        .scroll((app.today_scroll, 0));
    frame.render_widget(para, parts[0]);

    if story.has_more() {
        let btn = Paragraph::new(format!("[r] {}", read_more_label(app.today_story_open)))
            .style(Style::default().fg(Color::Cyan));
        frame.render_widget(btn, parts[1]);
        app.today_read_more_btn = parts[1];
    }
}

// ----------------------------------------------------------------------------
// Explore
// ----------------------------------------------------------------------------

fn draw_explore_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    draw_filter_pills(frame, app, chunks[0]);
    app.check_btns.clear();

    match &app.explore {
        Panel::Loading => {
            draw_message(frame, chunks[1], "Explore", "Loading actions...", Color::DarkGray);
            return;
        }
        Panel::Empty => {
            draw_message(frame, chunks[1], "Explore", "No actions yet.", Color::Gray);
            return;
        }
        Panel::Error(hint) => {
            draw_message(frame, chunks[1], "Explore", hint, Color::Yellow);
            return;
        }
        Panel::Ready(_) => {}
    }

    let items: Vec<ActionEntry> = app.visible_actions().into_iter().cloned().collect();
    if items.is_empty() {
        draw_message(
            frame,
            chunks[1],
            "Explore",
            "No actions found for this category yet.",
            Color::Gray,
        );
        return;
    }

    let grid = chunks[1];
    let rows = items.len().div_ceil(2);
    let row_height = (grid.height / (rows as u16).max(1)).clamp(5, 8);
    let visible_rows = usize::from(grid.height / row_height).max(1);
    follow_selection(&mut app.explore_row_offset, app.explore_selected / 2, visible_rows, rows);

    for (slot, rect) in grid_cells(grid, row_height, visible_rows) {
        let idx = app.explore_row_offset * 2 + slot;
        let Some(item) = items.get(idx) else {
            break;
        };
        let done = app.explore_done.get(idx).copied().unwrap_or(false);
        let selected = idx == app.explore_selected;
        let check_rect = draw_action_tile(frame, item, done, selected, rect);
        app.check_btns.push((idx, check_rect));
    }
}

/// Scrolls a grid window of `visible` rows so `selected_row` stays on screen.
fn follow_selection(offset: &mut usize, selected_row: usize, visible: usize, total: usize) {
    let visible = visible.max(1);
    if selected_row < *offset {
        *offset = selected_row;
    } else if selected_row >= *offset + visible {
        *offset = selected_row + 1 - visible;
    }
    *offset = (*offset).min(total.saturating_sub(visible));
}

/// Two-column cells, row by row, for the rows that fit in `area`.
fn grid_cells(area: Rect, row_height: u16, rows: usize) -> Vec<(usize, Rect)> {
    let col_width = area.width / 2;
    let mut cells = Vec::new();
    for row in 0..rows as u16 {
        let y = area.y + row * row_height;
        if y + row_height > area.y + area.height {
            break;
        }
        cells.push((usize::from(row) * 2, Rect::new(area.x, y, col_width, row_height)));
        cells.push((
            usize::from(row) * 2 + 1,
            Rect::new(area.x + col_width, y, area.width - col_width, row_height),
        ));
    }
    cells
}

fn draw_filter_pills(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = split_equal_horizontal(area, Filter::PILLS.len());
    app.filter_pill_btns.clear();

    for (n, (filter, rect)) in Filter::PILLS.into_iter().zip(chunks).enumerate() {
        let color = match filter {
            Filter::All => Color::White,
            Filter::Only(theme) => theme_color(theme),
        };
        let style = if app.filter == filter {
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        let pill = Paragraph::new(format!("{n} {}", filter.label()))
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .alignment(Alignment::Center)
            .style(style);
        frame.render_widget(pill, rect);
        app.filter_pill_btns.push((filter, rect));
    }
}

/// Returns the clickable check control area.
fn draw_action_tile(frame: &mut Frame, item: &ActionEntry, done: bool, selected: bool, area: Rect) -> Rect {
    let border = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(theme_tag(item.theme))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let text_style = if done {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    let lines = vec![
        Line::from(Span::styled(item.action.clone(), text_style)),
        Line::from(Span::styled(item.whose_life.clone(), Style::default().fg(Color::Cyan))),
        Line::from(Span::styled(item.impact.clone(), Style::default().fg(Color::Gray))),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), parts[0]);

    let (mark, label, color) = if done {
        ("✓", "done", Color::Green)
    } else {
        ("○", "mark done", Color::DarkGray)
    };
    let footer = Line::from(vec![
        Span::styled(mark, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(label, Style::default().fg(color)),
        Span::styled(
            format!("   {} {}", item.day_of_week, item.slot.label()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(footer), parts[1]);

    Rect::new(parts[1].x, parts[1].y, parts[1].width.min(12), 1)
}

// ----------------------------------------------------------------------------
// Stories
// ----------------------------------------------------------------------------

fn draw_stories_view(frame: &mut Frame, app: &mut App, area: Rect) {
    app.story_read_more_btns.clear();

    let stories = match &app.stories {
        Panel::Loading => {
            draw_message(frame, area, "Stories", "Loading stories...", Color::DarkGray);
            return;
        }
        Panel::Empty => {
            draw_message(
                frame,
                area,
                "Stories",
                "Stories will appear here once content is loaded.",
                Color::Gray,
            );
            return;
        }
        Panel::Error(message) => {
            draw_message(frame, area, "Stories", message, Color::Gray);
            return;
        }
        Panel::Ready(stories) => stories.clone(),
    };

    let rows = stories.len().div_ceil(2);
    let row_height = (area.height / (rows as u16).max(1)).max(STORY_MIN_ROW_HEIGHT);
    let visible_rows = usize::from(area.height / row_height).max(1);
    follow_selection(&mut app.story_row_offset, app.story_selected / 2, visible_rows, rows);

    for (slot, rect) in grid_cells(area, row_height, visible_rows) {
        let idx = app.story_row_offset * 2 + slot;
        let Some(story) = stories.get(idx) else {
            break;
        };
        let open = app.story_open.get(idx).copied().unwrap_or(false);
        let selected = idx == app.story_selected;
        let scroll = if selected { app.stories_scroll } else { 0 };
        if let Some(btn) = draw_story_tile(frame, story, open, selected, scroll, rect) {
            app.story_read_more_btns.push((idx, btn));
        }
    }
}

const STORY_MIN_ROW_HEIGHT: u16 = 6;

fn draw_story_tile(
    frame: &mut Frame,
    story: &StoryCard,
    open: bool,
    selected: bool,
    scroll: u16,
    area: Rect,
) -> Option<Rect> {
    let border = if selected {
        Style::default().fg(theme_color(story.theme))
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(Span::styled(
            story.theme.display_label(),
            Style::default().fg(theme_color(story.theme)),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let para = Paragraph::new(story_lines(story, open))
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0));
    frame.render_widget(para, parts[0]);

    if !story.has_more() {
        return None;
    }
    let btn = Paragraph::new(read_more_label(open)).style(Style::default().fg(Color::Cyan));
    frame.render_widget(btn, parts[1]);
    Some(parts[1])
}

// ----------------------------------------------------------------------------
// Popups
// ----------------------------------------------------------------------------

fn draw_share_confirm_popup(frame: &mut Frame, app: &App) {
    let Some(card) = app.pending_share else {
        return;
    };
    let area = centered(frame.size(), 50, 24);
    let body = popup_frame(frame, area, "Share Card", Color::Cyan, "Enter to share · Esc to cancel");
    let para = Paragraph::new(format!("Render card {} as an image and share it?", card.number()))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
    frame.render_widget(para, body);
}

fn draw_error_popup(frame: &mut Frame, app: &App) {
    let area = centered(frame.size(), 70, 30);
    let body = popup_frame(frame, area, "[!] Share Failed", Color::Red, "Press Esc to dismiss");
    let para = Paragraph::new(app.error_message.as_str())
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
    frame.render_widget(para, body);
}

fn draw_success_popup(frame: &mut Frame, app: &App) {
    let area = centered(frame.size(), 55, 28);
    let body = popup_frame(frame, area, "[OK] Shared", Color::Green, "Press Esc to dismiss");
    let para = Paragraph::new(app.success_message.as_str())
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
    frame.render_widget(para, body);
}

fn draw_help_overlay(frame: &mut Frame, app: &App) {
    let area = centered(frame.size(), 75, 75);
    frame.render_widget(Clear, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let query_text = if app.help_search_query.is_empty() {
        "Type to filter tips".to_string()
    } else {
        app.help_search_query.clone()
    };
    let input_widget = Paragraph::new(query_text)
        .block(
            Block::default()
                .title(format!("Help · {} (Esc to close)", app.view_mode.title()))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(input_widget, layout[0]);

    let topics = help_topics_for(app.view_mode, &app.help_search_query);
    let mut lines: Vec<Line> = Vec::new();
    for topic in &topics {
        let marker = match topic.view {
            Some(view) if view == app.view_mode => Span::styled("▸ ", Style::default().fg(Color::Cyan)),
            Some(view) => Span::styled(
                format!("[{}] ", view.title()),
                Style::default().fg(Color::DarkGray),
            ),
            None => Span::raw("  "),
        };
        lines.push(Line::from(vec![
            marker,
            Span::styled(
                topic.title,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(format!("  {}", topic.detail)));
        lines.push(Line::from(""));
    }
    if topics.is_empty() {
        lines.push(Line::from(
            "No tips match that search. Try 'share', 'mouse' or 'filter'.",
        ));
    }

    let help_block = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!("{} of {} tips · ↑↓ to scroll", topics.len(), HELP_TOPICS.len()))
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0))
        .style(Style::default().fg(Color::White));
    frame.render_widget(help_block, layout[1]);
}

/// Tips matching `query`, with the ones for `view` first, then general
/// ones, then those for other tabs.
fn help_topics_for(view: ViewMode, query: &str) -> Vec<&'static HelpTopic> {
    let query = query.trim().to_lowercase();
    let mut topics: Vec<&HelpTopic> = HELP_TOPICS
        .iter()
        .filter(|topic| {
            query.is_empty()
                || topic.title.to_lowercase().contains(&query)
                || topic.detail.to_lowercase().contains(&query)
        })
        .collect();
    topics.sort_by_key(|topic| match topic.view {
        Some(v) if v == view => 0,
        None => 1,
        Some(_) => 2,
    });
    topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{FakeShare, loaded_app};
    use crate::content::LoadError;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    fn render(app: &mut App) -> String {
        render_sized(app, 120, 40)
    }

    fn render_sized(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn help_filter_matches_title_and_detail() {
        assert_eq!(help_topics_for(ViewMode::Today, "").len(), HELP_TOPICS.len());
        assert!(help_topics_for(ViewMode::Today, "SHARE").iter().any(|t| t.title == "Sharing Cards"));
        assert!(help_topics_for(ViewMode::Today, "zzz").is_empty());
    }

    #[test]
    fn help_lists_current_view_tips_first() {
        let explore = help_topics_for(ViewMode::Explore, "");
        assert_eq!(explore[0].title, "Explore Filters");
        assert!(explore[1].view.is_none());
        let last = explore.last().unwrap();
        assert!(last.view.is_some_and(|v| v != ViewMode::Explore));

        let today = help_topics_for(ViewMode::Today, "");
        assert_eq!(today[0].title, "Today's Nudge");
        assert_eq!(today[1].title, "Sharing Cards");
    }

    #[test]
    fn today_view_shows_slot_cards_and_records_buttons() {
        let mut app = loaded_app(None, 22);
        let screen = render(&mut app);
        assert!(screen.contains("night"));
        assert!(screen.contains("Reflect"));
        assert!(screen.contains("Release"));
        assert!(screen.contains("I did this"));
        assert!(screen.contains("Today's Story"));
        assert!(app.did_this_btn.width > 0);
        assert!(app.share_btns.is_empty());
    }

    #[test]
    fn share_buttons_appear_when_sharing_is_available() {
        let target = FakeShare {
            fail: false,
            shared: Rc::new(RefCell::new(Vec::new())),
        };
        let mut app = loaded_app(Some(Box::new(target)), 9);
        let screen = render(&mut app);
        assert!(screen.contains("[1] share"));
        assert_eq!(app.share_btns.len(), 3);
    }

    #[test]
    fn explore_records_pills_and_checks() {
        let mut app = loaded_app(None, 9);
        app.view_mode = ViewMode::Explore;
        let screen = render(&mut app);
        assert_eq!(app.filter_pill_btns.len(), 6);
        assert!(!app.check_btns.is_empty());
        assert!(screen.contains("mark done"));
    }

    #[test]
    fn load_error_shows_hint_in_explore() {
        let mut app = App::new(None);
        app.apply_load(
            Err(LoadError::Missing(PathBuf::from("content.json"))),
            crate::app::tests::now(9),
            &mut rand::thread_rng(),
        );
        let screen = render(&mut app);
        assert!(screen.contains("Could not load today's content"));

        app.view_mode = ViewMode::Explore;
        let screen = render(&mut app);
        assert!(screen.contains("generate_content.py"));
        assert!(app.check_btns.is_empty());
    }

    #[test]
    fn explore_grid_scrolls_to_every_selected_tile() {
        let mut app = loaded_app(None, 9);
        app.view_mode = ViewMode::Explore;
        render_sized(&mut app, 80, 24);
        let total = app.visible_actions().len();
        assert!(app.check_btns.len() < total);

        let mut seen = std::collections::BTreeSet::new();
        for idx in 0..total {
            app.explore_selected = idx;
            render_sized(&mut app, 80, 24);
            assert!(app.check_btns.iter().any(|(i, _)| *i == idx), "tile {idx} not drawn");
            seen.extend(app.check_btns.iter().map(|(i, _)| *i));
        }
        assert_eq!(seen.len(), total);

        app.set_filter(Filter::Only(Theme::Financial));
        assert_eq!(app.explore_row_offset, 0);
    }

    #[test]
    fn stories_grid_scrolls_on_short_terminals() {
        let mut app = loaded_app(None, 9);
        app.view_mode = ViewMode::Stories;
        render_sized(&mut app, 80, 14);
        assert!(app.story_read_more_btns.len() < 6);

        for _ in 0..5 {
            app.move_story_selection(true);
        }
        let screen = render_sized(&mut app, 80, 14);
        assert!(app.story_read_more_btns.iter().any(|(i, _)| *i == 5));
        assert!(screen.contains("Person 6"));
    }

    #[test]
    fn follow_selection_keeps_row_in_window() {
        let mut offset = 0;
        follow_selection(&mut offset, 4, 3, 5);
        assert_eq!(offset, 2);
        follow_selection(&mut offset, 1, 3, 5);
        assert_eq!(offset, 1);
        follow_selection(&mut offset, 0, 10, 5);
        assert_eq!(offset, 0);
    }

    #[test]
    fn stories_view_lists_names() {
        let mut app = loaded_app(None, 9);
        app.view_mode = ViewMode::Stories;
        let screen = render(&mut app);
        assert!(screen.contains("Person 1"));
        assert_eq!(app.story_read_more_btns.len(), 6);
    }
}
