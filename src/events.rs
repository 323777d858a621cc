// ============================================================================
// EVENT HANDLING - keyboard and mouse
// ============================================================================

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, ViewMode};
use crate::share::CardIndex;
use crate::theme::Filter;

/// Returns `true` when the app should exit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.show_help_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => close_help(app),
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(10),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(10),
            KeyCode::Backspace => {
                app.help_search_query.pop();
                app.help_scroll = 0;
            }
            KeyCode::Char('?') => close_help(app),
            KeyCode::Char(c) => {
                app.help_search_query.push(c);
                app.help_scroll = 0;
            }
            _ => {}
        }
        return false;
    }

    if app.show_error_popup || app.show_success_popup {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.dismiss_popups();
        }
        return false;
    }

    if app.pending_share.is_some() {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => app.confirm_share(),
            KeyCode::Esc | KeyCode::Char('n') => app.cancel_share(),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            app.show_help_overlay = true;
            return false;
        }
        KeyCode::Tab => {
            app.view_mode = app.view_mode.next();
            return false;
        }
        KeyCode::BackTab => {
            app.view_mode = app.view_mode.prev();
            return false;
        }
        KeyCode::Char('t') => {
            app.view_mode = ViewMode::Today;
            return false;
        }
        KeyCode::Char('e') => {
            app.view_mode = ViewMode::Explore;
            return false;
        }
        KeyCode::Char('s') => {
            app.view_mode = ViewMode::Stories;
            return false;
        }
        _ => {}
    }

    match app.view_mode {
        ViewMode::Today => handle_today_key(app, key),
        ViewMode::Explore => handle_explore_key(app, key),
        ViewMode::Stories => handle_stories_key(app, key),
    }
    false
}

fn close_help(app: &mut App) {
    app.show_help_overlay = false;
    app.help_search_query.clear();
    app.help_scroll = 0;
}

fn handle_today_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('d') => app.toggle_did_this(),
        KeyCode::Char('r') | KeyCode::Enter => app.toggle_today_story(),
        KeyCode::Char(c @ '1'..='3') => {
            let card = c.to_digit(10).and_then(|n| CardIndex::from_number(n as u8));
            if let Some(card) = card {
                app.request_share(card);
            }
        }
        KeyCode::Up => app.today_scroll = app.today_scroll.saturating_sub(1),
        KeyCode::Down => app.today_scroll = app.today_scroll.saturating_add(1),
        KeyCode::PageUp => app.today_scroll = app.today_scroll.saturating_sub(10),
        KeyCode::PageDown => app.today_scroll = app.today_scroll.saturating_add(10),
        _ => {}
    }
}

fn handle_explore_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left => app.cycle_filter(false),
        KeyCode::Right => app.cycle_filter(true),
        KeyCode::Char(c @ '0'..='5') => {
            let pick = c
                .to_digit(10)
                .and_then(|n| Filter::PILLS.get(n as usize).copied());
            if let Some(filter) = pick {
                app.set_filter(filter);
            }
        }
        KeyCode::Up => app.move_explore_selection(false),
        KeyCode::Down => app.move_explore_selection(true),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_done(app.explore_selected),
        _ => {}
    }
}

fn handle_stories_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.move_story_selection(false),
        KeyCode::Down => app.move_story_selection(true),
        KeyCode::Char(' ') | KeyCode::Char('r') | KeyCode::Enter => {
            app.toggle_story(app.story_selected)
        }
        KeyCode::PageUp => app.stories_scroll = app.stories_scroll.saturating_sub(5),
        KeyCode::PageDown => app.stories_scroll = app.stories_scroll.saturating_add(5),
        _ => {}
    }
}

pub fn inside_rect(mouse: MouseEvent, rect: Rect) -> bool {
    mouse.row >= rect.y
        && mouse.row < rect.y + rect.height
        && mouse.column >= rect.x
        && mouse.column < rect.x + rect.width
}

// Helper: Find clicked item from mouse event
fn find_clicked<T: Copy>(mouse: MouseEvent, items: &[(T, Rect)]) -> Option<T> {
    items
        .iter()
        .find(|(_, rect)| inside_rect(mouse, *rect))
        .map(|(item, _)| *item)
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.show_help_overlay {
        match mouse.kind {
            MouseEventKind::ScrollUp => app.help_scroll = app.help_scroll.saturating_sub(3),
            MouseEventKind::ScrollDown => app.help_scroll = app.help_scroll.saturating_add(3),
            _ => {}
        }
        return;
    }

    if app.show_error_popup || app.show_success_popup || app.pending_share.is_some() {
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(mode) = find_clicked(mouse, &app.view_mode_btns) {
                app.view_mode = mode;
                return;
            }
            match app.view_mode {
                ViewMode::Today => handle_today_click(app, mouse),
                ViewMode::Explore => handle_explore_click(app, mouse),
                ViewMode::Stories => handle_stories_click(app, mouse),
            }
        }
        MouseEventKind::ScrollUp => match app.view_mode {
            ViewMode::Today => app.today_scroll = app.today_scroll.saturating_sub(3),
            ViewMode::Stories => app.stories_scroll = app.stories_scroll.saturating_sub(3),
            ViewMode::Explore => app.move_explore_selection(false),
        },
        MouseEventKind::ScrollDown => match app.view_mode {
            ViewMode::Today => app.today_scroll = app.today_scroll.saturating_add(3),
            ViewMode::Stories => app.stories_scroll = app.stories_scroll.saturating_add(3),
            ViewMode::Explore => app.move_explore_selection(true),
        },
        _ => {}
    }
}

fn handle_today_click(app: &mut App, mouse: MouseEvent) {
    if inside_rect(mouse, app.did_this_btn) {
        app.toggle_did_this();
        return;
    }
    if inside_rect(mouse, app.today_read_more_btn) {
        app.toggle_today_story();
        return;
    }
    if let Some(card) = find_clicked(mouse, &app.share_btns) {
        app.request_share(card);
    }
}

fn handle_explore_click(app: &mut App, mouse: MouseEvent) {
    if let Some(filter) = find_clicked(mouse, &app.filter_pill_btns) {
        app.set_filter(filter);
        return;
    }
    if let Some(idx) = find_clicked(mouse, &app.check_btns) {
        app.explore_selected = idx;
        app.toggle_done(idx);
    }
}

fn handle_stories_click(app: &mut App, mouse: MouseEvent) {
    if let Some(idx) = find_clicked(mouse, &app.story_read_more_btns) {
        app.story_selected = idx;
        app.toggle_story(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{FakeShare, loaded_app};
    use crate::theme::Theme;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn quit_keys() {
        let mut app = loaded_app(None, 9);
        assert!(handle_key(&mut app, press(KeyCode::Char('q'))));
        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..press(KeyCode::Char('c'))
        };
        assert!(handle_key(&mut app, ctrl_c));
    }

    #[test]
    fn tab_cycles_views() {
        let mut app = loaded_app(None, 9);
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.view_mode, ViewMode::Explore);
        handle_key(&mut app, press(KeyCode::BackTab));
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.view_mode, ViewMode::Stories);
    }

    #[test]
    fn number_keys_pick_filter_in_explore() {
        let mut app = loaded_app(None, 9);
        handle_key(&mut app, press(KeyCode::Char('e')));
        handle_key(&mut app, press(KeyCode::Char('3')));
        assert_eq!(app.filter, Filter::Only(Theme::Burnout));
        handle_key(&mut app, press(KeyCode::Down));
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert_eq!(app.explore_done, vec![false, true, false]);
        handle_key(&mut app, press(KeyCode::Char('0')));
        assert_eq!(app.filter, Filter::All);
    }

    #[test]
    fn share_confirmation_flow() {
        let shared = Rc::new(RefCell::new(Vec::new()));
        let target = FakeShare {
            fail: false,
            shared: Rc::clone(&shared),
        };
        let mut app = loaded_app(Some(Box::new(target)), 9);

        handle_key(&mut app, press(KeyCode::Char('2')));
        assert_eq!(app.pending_share, Some(CardIndex::Action));
        // other keys are swallowed while confirming
        handle_key(&mut app, press(KeyCode::Char('e')));
        assert_eq!(app.view_mode, ViewMode::Today);
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(app.pending_share.is_none());
        assert!(shared.borrow().is_empty());

        handle_key(&mut app, press(KeyCode::Char('1')));
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(shared.borrow().len(), 1);
        assert!(app.show_success_popup);
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(!app.show_success_popup);
    }

    #[test]
    fn help_overlay_captures_typing() {
        let mut app = loaded_app(None, 9);
        handle_key(&mut app, press(KeyCode::Char('?')));
        assert!(app.show_help_overlay);
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert_eq!(app.help_search_query, "q");
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(!app.show_help_overlay);
        assert!(app.help_search_query.is_empty());
    }

    #[test]
    fn clicks_hit_recorded_areas() {
        let mut app = loaded_app(None, 9);
        app.view_mode = ViewMode::Explore;
        app.filter_pill_btns = vec![(Filter::Only(Theme::Financial), Rect::new(10, 2, 8, 3))];
        handle_mouse(&mut app, click(12, 3));
        assert_eq!(app.filter, Filter::Only(Theme::Financial));

        app.check_btns = vec![(2, Rect::new(40, 10, 3, 1))];
        handle_mouse(&mut app, click(41, 10));
        assert!(app.explore_done[2]);
        handle_mouse(&mut app, click(44, 10));
        assert!(app.explore_done[2]);

        app.view_mode_btns = vec![(ViewMode::Stories, Rect::new(0, 0, 10, 3))];
        handle_mouse(&mut app, click(1, 1));
        assert_eq!(app.view_mode, ViewMode::Stories);
    }
}
