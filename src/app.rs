// ============================================================================
// APP STATE - everything the views read and the handlers write
// ============================================================================

use chrono::NaiveDateTime;
use rand::Rng;
use ratatui::layout::Rect;

use crate::actions::{ActionEntry, ActionIndex};
use crate::content::{Content, LoadError};
use crate::logging::single_line;
use crate::share::{CardIndex, ShareError, ShareTarget, build_payload, card_has_body};
use crate::stories::{StoryCard, collect_stories};
use crate::theme::Filter;
use crate::today::TodayView;

pub const LOAD_HINT: &str = "Run python generate_content.py to generate this month's content.";

// A single failed share stays silent; this many in a row gets a popup.
const SHARE_FAILURES_BEFORE_POPUP: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Today,
    Explore,
    Stories,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Today, ViewMode::Explore, ViewMode::Stories];

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Today => "Today",
            ViewMode::Explore => "Explore",
            ViewMode::Stories => "Stories",
        }
    }

    pub fn next(self) -> ViewMode {
        match self {
            ViewMode::Today => ViewMode::Explore,
            ViewMode::Explore => ViewMode::Stories,
            ViewMode::Stories => ViewMode::Today,
        }
    }

    pub fn prev(self) -> ViewMode {
        match self {
            ViewMode::Today => ViewMode::Stories,
            ViewMode::Explore => ViewMode::Today,
            ViewMode::Stories => ViewMode::Explore,
        }
    }
}

/// What a view region currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    Loading,
    Ready(T),
    Empty,
    Error(String),
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            _ => None,
        }
    }
}

pub struct App {
    pub view_mode: ViewMode,

    // View regions
    pub today: Panel<TodayView>,
    pub explore: Panel<ActionIndex>,
    pub stories: Panel<Vec<StoryCard>>,

    // Today toggles
    pub did_this: bool,
    pub today_story_open: bool,
    pub today_scroll: u16,

    // Explore grid; marks are reset whenever the grid is re-rendered
    pub filter: Filter,
    pub explore_done: Vec<bool>,
    pub explore_selected: usize,
    pub explore_row_offset: usize,

    // Stories
    pub story_open: Vec<bool>,
    pub story_selected: usize,
    pub story_row_offset: usize,
    pub stories_scroll: u16,

    // Share
    share: Option<Box<dyn ShareTarget>>,
    pub pending_share: Option<CardIndex>,
    pub share_failures: u32,

    // Popups
    pub show_help_overlay: bool,
    pub help_search_query: String,
    pub help_scroll: u16,
    pub show_error_popup: bool,
    pub error_message: String,
    pub show_success_popup: bool,
    pub success_message: String,

    // UI areas for mouse support
    pub view_mode_btns: Vec<(ViewMode, Rect)>,
    pub filter_pill_btns: Vec<(Filter, Rect)>,
    pub check_btns: Vec<(usize, Rect)>,
    pub story_read_more_btns: Vec<(usize, Rect)>,
    pub share_btns: Vec<(CardIndex, Rect)>,
    pub did_this_btn: Rect,
    pub today_read_more_btn: Rect,
}

impl App {
    pub fn new(share: Option<Box<dyn ShareTarget>>) -> Self {
        Self {
            view_mode: ViewMode::Today,
            today: Panel::Loading,
            explore: Panel::Loading,
            stories: Panel::Loading,
            did_this: false,
            today_story_open: false,
            today_scroll: 0,
            filter: Filter::All,
            explore_done: Vec::new(),
            explore_selected: 0,
            explore_row_offset: 0,
            story_open: Vec::new(),
            story_selected: 0,
            story_row_offset: 0,
            stories_scroll: 0,
            share,
            pending_share: None,
            share_failures: 0,
            show_help_overlay: false,
            help_search_query: String::new(),
            help_scroll: 0,
            show_error_popup: false,
            error_message: String::new(),
            show_success_popup: false,
            success_message: String::new(),
            view_mode_btns: Vec::new(),
            filter_pill_btns: Vec::new(),
            check_btns: Vec::new(),
            story_read_more_btns: Vec::new(),
            share_btns: Vec::new(),
            did_this_btn: Rect::default(),
            today_read_more_btn: Rect::default(),
        }
    }

    /// Fills every view from the load result. A failed load puts all three
    /// views into their error state.
    pub fn apply_load<R: Rng + ?Sized>(
        &mut self,
        result: Result<Content, LoadError>,
        now: NaiveDateTime,
        rng: &mut R,
    ) {
        let content = match result {
            Ok(content) => content,
            Err(err) => {
                log::error!(
                    "event=content_load status=error error={}",
                    single_line(&err.to_string(), 240)
                );
                let message = format!("Could not load today's content: {err}");
                self.today = Panel::Error(message);
                self.explore = Panel::Error(LOAD_HINT.to_string());
                self.stories = Panel::Error(String::new());
                return;
            }
        };

        self.today = match TodayView::build(&content, now) {
            Some(view) => Panel::Ready(view),
            None => Panel::Empty,
        };

        let index = ActionIndex::build(&content, rng);
        log::info!(
            "event=action_index status=ok entries={}",
            index.len()
        );
        self.explore = Panel::Ready(index);
        self.set_filter(Filter::All);

        let stories = collect_stories(&content);
        self.story_open = vec![false; stories.len()];
        self.story_selected = 0;
        self.story_row_offset = 0;
        self.stories = if stories.is_empty() {
            Panel::Empty
        } else {
            Panel::Ready(stories)
        };
    }

    pub fn visible_actions(&self) -> Vec<&ActionEntry> {
        match &self.explore {
            Panel::Ready(index) => index.select(self.filter),
            _ => Vec::new(),
        }
    }

    /// Replaces the grid; completion marks do not survive a re-render.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.explore_done = vec![false; self.visible_actions().len()];
        self.explore_selected = 0;
        self.explore_row_offset = 0;
    }

    pub fn cycle_filter(&mut self, forward: bool) {
        let pills = Filter::PILLS;
        let pos = pills.iter().position(|f| *f == self.filter).unwrap_or(0);
        let next = if forward {
            (pos + 1) % pills.len()
        } else {
            (pos + pills.len() - 1) % pills.len()
        };
        self.set_filter(pills[next]);
    }

    pub fn toggle_done(&mut self, idx: usize) {
        if let Some(done) = self.explore_done.get_mut(idx) {
            *done = !*done;
        }
    }

    pub fn move_explore_selection(&mut self, down: bool) {
        let count = self.explore_done.len();
        if count == 0 {
            return;
        }
        self.explore_selected = if down {
            (self.explore_selected + 1).min(count - 1)
        } else {
            self.explore_selected.saturating_sub(1)
        };
    }

    pub fn toggle_did_this(&mut self) {
        if self.today.ready().is_some() {
            self.did_this = !self.did_this;
        }
    }

    pub fn did_this_label(&self) -> &'static str {
        if self.did_this {
            "Done! Come back next time ✓"
        } else {
            "I did this"
        }
    }

    pub fn toggle_today_story(&mut self) {
        let has_more = self
            .today
            .ready()
            .and_then(|view| view.story.as_ref())
            .is_some_and(StoryCard::has_more);
        if has_more {
            self.today_story_open = !self.today_story_open;
        }
    }

    pub fn toggle_story(&mut self, idx: usize) {
        if let Some(open) = self.story_open.get_mut(idx) {
            *open = !*open;
        }
    }

    pub fn move_story_selection(&mut self, down: bool) {
        let count = self.story_open.len();
        if count == 0 {
            return;
        }
        self.story_selected = if down {
            (self.story_selected + 1).min(count - 1)
        } else {
            self.story_selected.saturating_sub(1)
        };
    }

    pub fn share_available(&self) -> bool {
        self.share.is_some()
    }

    /// Whether card `card` of today's view can be shared right now.
    pub fn can_share(&self, card: CardIndex) -> bool {
        self.share_available()
            && self
                .today
                .ready()
                .is_some_and(|view| card_has_body(view, card))
    }

    pub fn request_share(&mut self, card: CardIndex) {
        if self.can_share(card) {
            self.pending_share = Some(card);
        }
    }

    /// User backed out of the confirmation; not an error.
    pub fn cancel_share(&mut self) {
        if let Some(card) = self.pending_share.take() {
            log::debug!("event=share status=cancelled card={}", card.number());
        }
    }

    pub fn confirm_share(&mut self) {
        let Some(card) = self.pending_share.take() else {
            return;
        };
        let result = match (&self.share, self.today.ready()) {
            (Some(target), Some(view)) => {
                build_payload(view, card).and_then(|payload| target.share(&payload))
            }
            _ => return,
        };
        self.record_share_result(card, result);
    }

    fn record_share_result(&mut self, card: CardIndex, result: Result<std::path::PathBuf, ShareError>) {
        match result {
            Ok(path) => {
                self.share_failures = 0;
                self.show_success_popup = true;
                self.success_message = format!("Card {} saved to {}", card.number(), path.display());
            }
            Err(ShareError::NothingToShare(n)) => {
                log::info!("event=share status=skipped card={n} reason=empty");
            }
            Err(err) => {
                self.share_failures += 1;
                log::warn!(
                    "event=share status=error card={} failures={} error={}",
                    card.number(),
                    self.share_failures,
                    single_line(&err.to_string(), 240)
                );
                if self.share_failures >= SHARE_FAILURES_BEFORE_POPUP {
                    self.show_error_popup = true;
                    self.error_message = format!("Sharing keeps failing: {err}");
                }
            }
        }
    }

    pub fn dismiss_popups(&mut self) {
        self.show_error_popup = false;
        self.show_success_popup = false;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::fixtures::day;
    use crate::share::SharePayload;
    use crate::theme::Theme;
    use crate::today::SlotContent;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    pub(crate) struct FakeShare {
        pub fail: bool,
        pub shared: Rc<RefCell<Vec<String>>>,
    }

    impl ShareTarget for FakeShare {
        fn share(&self, payload: &SharePayload) -> Result<PathBuf, ShareError> {
            if self.fail {
                return Err(ShareError::Launch(std::io::Error::other("no opener")));
            }
            self.shared.borrow_mut().push(payload.file_name.clone());
            Ok(PathBuf::from("/tmp").join(&payload.file_name))
        }
    }

    pub(crate) fn now(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    pub(crate) fn sample_content() -> Content {
        let labels = [
            "Personal Identity",
            "Health & Body Image",
            "Burnout",
            "Financial Knowledge",
            "Social Pressure vs. Authentic Living",
        ];
        Content {
            days: (1..=20)
                .map(|n| day(&format!("2026-10-{n:02}"), n, labels[n as usize % 5]))
                .collect(),
        }
    }

    pub(crate) fn loaded_app(share: Option<Box<dyn ShareTarget>>, hour: u32) -> App {
        let mut app = App::new(share);
        app.apply_load(Ok(sample_content()), now(hour), &mut StdRng::seed_from_u64(9));
        app
    }

    #[test]
    fn views_start_loading() {
        let app = App::new(None);
        assert_eq!(app.today, Panel::Loading);
        assert!(matches!(app.explore, Panel::Loading));
        assert_eq!(app.stories, Panel::Loading);
    }

    #[test]
    fn missing_content_puts_every_view_in_error() {
        let mut app = App::new(None);
        let err = LoadError::Missing(PathBuf::from("content.json"));
        app.apply_load(Err(err), now(9), &mut StdRng::seed_from_u64(1));

        assert!(matches!(app.today, Panel::Error(ref msg) if msg.contains("content.json")));
        assert!(matches!(app.explore, Panel::Error(ref msg) if msg == LOAD_HINT));
        assert!(matches!(app.stories, Panel::Error(_)));
        assert!(app.visible_actions().is_empty());
    }

    #[test]
    fn empty_day_list_renders_empty_states() {
        let mut app = App::new(None);
        app.apply_load(Ok(Content::default()), now(9), &mut StdRng::seed_from_u64(1));
        assert_eq!(app.today, Panel::Empty);
        assert_eq!(app.stories, Panel::Empty);
        assert!(app.visible_actions().is_empty());
        app.toggle_did_this();
        assert!(!app.did_this);
    }

    #[test]
    fn loaded_app_fills_views() {
        let app = loaded_app(None, 9);
        assert_eq!(app.today.ready().unwrap().date, "2026-10-17");
        assert_eq!(app.visible_actions().len(), 10);
        assert_eq!(app.explore_done.len(), 10);
        assert_eq!(app.stories.ready().unwrap().len(), 6);
        assert_eq!(app.story_open, vec![false; 6]);
    }

    #[test]
    fn changing_filter_resets_marks() {
        let mut app = loaded_app(None, 9);
        app.toggle_done(0);
        app.toggle_done(3);
        assert!(app.explore_done[0] && app.explore_done[3]);

        app.set_filter(Filter::Only(Theme::Burnout));
        assert_eq!(app.explore_done, vec![false; 3]);
        assert!(app.visible_actions().iter().all(|a| a.theme == Theme::Burnout));

        app.toggle_done(1);
        app.toggle_done(1);
        assert!(!app.explore_done[1]);
    }

    #[test]
    fn cycle_filter_wraps_both_ways() {
        let mut app = loaded_app(None, 9);
        app.cycle_filter(false);
        assert_eq!(app.filter, Filter::Only(Theme::Social));
        app.cycle_filter(true);
        assert_eq!(app.filter, Filter::All);
        app.cycle_filter(true);
        assert_eq!(app.filter, Filter::Only(Theme::PersonalIdentity));
    }

    #[test]
    fn did_this_flips_label() {
        let mut app = loaded_app(None, 9);
        assert_eq!(app.did_this_label(), "I did this");
        app.toggle_did_this();
        assert_eq!(app.did_this_label(), "Done! Come back next time ✓");
        app.toggle_did_this();
        assert!(!app.did_this);
    }

    #[test]
    fn story_disclosures_toggle_independently() {
        let mut app = loaded_app(None, 9);
        app.toggle_story(2);
        assert_eq!(app.story_open, vec![false, false, true, false, false, false]);
        app.toggle_today_story();
        assert!(app.today_story_open);
        app.toggle_story(42);
    }

    #[test]
    fn share_is_disabled_without_a_target() {
        let mut app = loaded_app(None, 9);
        assert!(!app.share_available());
        app.request_share(CardIndex::Prompt);
        assert!(app.pending_share.is_none());
    }

    #[test]
    fn confirmed_share_reaches_target() {
        let shared = Rc::new(RefCell::new(Vec::new()));
        let target = FakeShare {
            fail: false,
            shared: Rc::clone(&shared),
        };
        let mut app = loaded_app(Some(Box::new(target)), 14);
        app.request_share(CardIndex::Closing);
        assert_eq!(app.pending_share, Some(CardIndex::Closing));
        app.confirm_share();

        assert!(app.pending_share.is_none());
        assert!(app.show_success_popup);
        assert_eq!(shared.borrow().len(), 1);
        assert!(shared.borrow()[0].starts_with("nudge-afternoon-3-"));
    }

    #[test]
    fn cancelled_share_is_a_silent_no_op() {
        let shared = Rc::new(RefCell::new(Vec::new()));
        let target = FakeShare {
            fail: false,
            shared: Rc::clone(&shared),
        };
        let mut app = loaded_app(Some(Box::new(target)), 9);
        app.request_share(CardIndex::Action);
        app.cancel_share();
        app.confirm_share();

        assert!(shared.borrow().is_empty());
        assert!(!app.show_success_popup);
        assert!(!app.show_error_popup);
        assert_eq!(app.share_failures, 0);
    }

    #[test]
    fn blank_card_cannot_be_shared_and_is_not_a_failure() {
        let shared = Rc::new(RefCell::new(Vec::new()));
        let target = FakeShare {
            fail: false,
            shared: Rc::clone(&shared),
        };
        let mut app = loaded_app(Some(Box::new(target)), 9);
        if let Panel::Ready(view) = &mut app.today {
            if let Some(SlotContent::Morning(morning)) = view.content.as_mut() {
                morning.affirmation.clear();
            }
        }

        assert!(!app.can_share(CardIndex::Prompt));
        assert!(app.can_share(CardIndex::Action));
        app.request_share(CardIndex::Prompt);
        assert!(app.pending_share.is_none());

        for _ in 0..2 {
            app.pending_share = Some(CardIndex::Prompt);
            app.confirm_share();
        }
        assert_eq!(app.share_failures, 0);
        assert!(!app.show_error_popup);
        assert!(shared.borrow().is_empty());
    }

    #[test]
    fn repeated_share_failures_surface_a_popup() {
        let target = FakeShare {
            fail: true,
            shared: Rc::new(RefCell::new(Vec::new())),
        };
        let mut app = loaded_app(Some(Box::new(target)), 21);

        app.request_share(CardIndex::Prompt);
        app.confirm_share();
        assert_eq!(app.share_failures, 1);
        assert!(!app.show_error_popup);

        app.request_share(CardIndex::Prompt);
        app.confirm_share();
        assert_eq!(app.share_failures, 2);
        assert!(app.show_error_popup);
        assert!(app.error_message.contains("no opener"));
    }
}
