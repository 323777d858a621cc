// ============================================================================
// TODAY - what the primary view shows for the current slot
// ============================================================================

use chrono::NaiveDateTime;

use crate::content::{AfternoonSlot, Content, Day, MicroAction, MorningSlot, NightSlot, Quote};
use crate::schedule::{Slot, select_day};
use crate::stories::StoryCard;
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    Morning(MorningSlot),
    Afternoon(AfternoonSlot),
    Night(NightSlot),
}

impl SlotContent {
    /// `None` when the day record has nothing for that slot.
    pub fn for_day(day: &Day, slot: Slot) -> Option<SlotContent> {
        match slot {
            Slot::Morning => day.morning.clone().map(SlotContent::Morning),
            Slot::Afternoon => day.afternoon.clone().map(SlotContent::Afternoon),
            Slot::Night => day.night.clone().map(SlotContent::Night),
        }
    }

    pub fn slot(&self) -> Slot {
        match self {
            SlotContent::Morning(_) => Slot::Morning,
            SlotContent::Afternoon(_) => Slot::Afternoon,
            SlotContent::Night(_) => Slot::Night,
        }
    }

    pub fn micro_action(&self) -> Option<&MicroAction> {
        let micro = match self {
            SlotContent::Morning(m) => m.micro_action.as_ref(),
            SlotContent::Afternoon(a) => a.micro_action.as_ref(),
            SlotContent::Night(n) => n.micro_action.as_ref(),
        };
        micro.filter(|m| m.is_actionable())
    }

    /// Card 1: affirmation or question.
    pub fn prompt(&self) -> Prompt<'_> {
        match self {
            SlotContent::Morning(m) => Prompt {
                label: "Affirmation",
                text: &m.affirmation,
            },
            SlotContent::Afternoon(a) => Prompt {
                label: "Check in",
                text: &a.recentering_question,
            },
            SlotContent::Night(n) => Prompt {
                label: "Reflect",
                text: &n.reflection_question,
            },
        }
    }

    /// Card 3: quote, permission slip, or release.
    pub fn closing(&self) -> Closing<'_> {
        match self {
            SlotContent::Morning(m) => Closing::Wisdom(&m.quote),
            SlotContent::Afternoon(a) => Closing::Permission(&a.permission_slip),
            SlotContent::Night(n) => Closing::Release {
                gratitude: &n.gratitude_nudge,
                release: &n.release_statement,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt<'a> {
    pub label: &'static str,
    pub text: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Closing<'a> {
    Wisdom(&'a Quote),
    Permission(&'a str),
    Release { gratitude: &'a str, release: &'a str },
}

impl Closing<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Closing::Wisdom(_) => "Wisdom",
            Closing::Permission(_) => "Permission",
            Closing::Release { .. } => "Release",
        }
    }
}

pub fn quote_cite(quote: &Quote) -> String {
    if quote.context.is_empty() {
        format!("— {}", quote.author)
    } else {
        format!("— {}, {}", quote.author, quote.context)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TodayView {
    pub slot: Slot,
    pub date: String,
    pub day_context: String,
    pub theme: Theme,
    pub content: Option<SlotContent>,
    pub story: Option<StoryCard>,
}

impl TodayView {
    /// `None` only when the content has no days at all.
    pub fn build(content: &Content, now: NaiveDateTime) -> Option<TodayView> {
        let day = select_day(&content.days, now.date())?;
        let slot = Slot::at(now);
        let theme = Theme::normalize(&day.theme);

        Some(TodayView {
            slot,
            date: day.date.clone(),
            day_context: format!("{} · {} · {}", day.day_of_week, day.day_energy, day.theme),
            theme,
            content: SlotContent::for_day(day, slot),
            story: day
                .inspirational_story
                .as_ref()
                .map(|story| StoryCard::from_story(story, theme, &day.day_of_week)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::day;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap()
    }

    #[test]
    fn empty_content_has_no_view() {
        assert!(TodayView::build(&Content::default(), at(2026, 10, 17, 9)).is_none());
    }

    #[test]
    fn morning_view_uses_affirmation_and_quote() {
        let content = Content {
            days: vec![day("2026-10-17", 17, "Burnout")],
        };
        let view = TodayView::build(&content, at(2026, 10, 17, 8)).unwrap();
        assert_eq!(view.slot, Slot::Morning);
        assert_eq!(view.theme, Theme::Burnout);
        assert_eq!(view.day_context, "Tuesday · steady · Burnout");

        let slot = view.content.as_ref().unwrap();
        assert_eq!(slot.prompt().label, "Affirmation");
        assert_eq!(slot.prompt().text, "2026-10-17 affirmation");
        match slot.closing() {
            Closing::Wisdom(quote) => {
                assert_eq!(quote_cite(quote), "— Arthur Ashe, tennis champion")
            }
            other => panic!("unexpected closing {other:?}"),
        }
        assert_eq!(slot.micro_action().unwrap().action, "2026-10-17 morning");
    }

    #[test]
    fn night_only_day_renders_night_fields() {
        let mut d = day("2026-10-17", 17, "Burnout");
        d.morning = None;
        d.afternoon = None;
        let content = Content { days: vec![d] };

        let view = TodayView::build(&content, at(2026, 10, 17, 22)).unwrap();
        assert_eq!(view.slot, Slot::Night);
        let slot = view.content.as_ref().unwrap();
        assert_eq!(slot.prompt().text, "2026-10-17 reflection");
        assert_eq!(
            slot.closing(),
            Closing::Release {
                gratitude: "Name one good thing.",
                release: "I let today go.",
            }
        );
        assert!(crate::actions::build_entries(&content).is_empty());
    }

    #[test]
    fn missing_slot_leaves_content_empty_but_keeps_story() {
        let mut d = day("2026-10-17", 17, "Burnout");
        d.afternoon = None;
        let view = TodayView::build(&Content { days: vec![d] }, at(2026, 10, 17, 13)).unwrap();
        assert_eq!(view.slot, Slot::Afternoon);
        assert!(view.content.is_none());
        assert_eq!(view.story.as_ref().unwrap().name, "Person 17");
    }
}
