// ============================================================================
// STORIES - deduplicated narrative cards
// ============================================================================

use std::collections::HashSet;

use crate::content::{Content, Story};
use crate::theme::Theme;

const MAX_STORIES: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct StoryCard {
    pub name: String,
    pub who_she_is: String,
    pub paragraphs: Vec<String>,
    pub theme: Theme,
    pub day_of_week: String,
}

impl StoryCard {
    pub fn from_story(story: &Story, theme: Theme, day_of_week: &str) -> Self {
        Self {
            name: story.name.clone(),
            who_she_is: story.who_she_is.clone(),
            paragraphs: story.story.paragraphs(),
            theme,
            day_of_week: day_of_week.to_string(),
        }
    }

    pub fn first_paragraph(&self) -> &str {
        self.paragraphs.first().map(String::as_str).unwrap_or("")
    }

    pub fn remaining_paragraphs(&self) -> &[String] {
        self.paragraphs.get(1..).unwrap_or(&[])
    }

    pub fn has_more(&self) -> bool {
        self.paragraphs.len() > 1
    }

    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

/// First letter of each space-separated name token, at most two, uppercased.
pub fn initials(name: &str) -> String {
    let picked: String = name
        .split(' ')
        .filter_map(|token| token.chars().next())
        .take(2)
        .collect();
    picked.to_uppercase()
}

/// Up to six stories in day order, first occurrence of each name wins.
pub fn collect_stories(content: &Content) -> Vec<StoryCard> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cards = Vec::new();

    for day in &content.days {
        if cards.len() >= MAX_STORIES {
            break;
        }
        let Some(story) = day.inspirational_story.as_ref() else {
            continue;
        };
        if story.name.is_empty() || !seen.insert(story.name.as_str()) {
            continue;
        }
        cards.push(StoryCard::from_story(
            story,
            Theme::normalize(&day.theme),
            &day.day_of_week,
        ));
    }

    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::day;
    use crate::content::{Content, StoryBody};

    #[test]
    fn initials_use_first_two_tokens() {
        assert_eq!(initials("Maya Angelou"), "MA");
        assert_eq!(initials("ruth bader ginsburg"), "RB");
        assert_eq!(initials("Cher"), "C");
        assert_eq!(initials("  Ada  Lovelace"), "AL");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn duplicates_keep_first_in_day_order() {
        let mut first = day("2026-10-01", 1, "Burnout");
        let mut second = day("2026-10-02", 2, "Financial Knowledge");
        for d in [&mut first, &mut second] {
            if let Some(story) = d.inspirational_story.as_mut() {
                story.name = "Maya Angelou".to_string();
            }
        }
        let cards = collect_stories(&Content {
            days: vec![first, second],
        });
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].theme, Theme::Burnout);
    }

    #[test]
    fn capped_at_six() {
        let days = (1..=10)
            .map(|n| day(&format!("2026-10-{n:02}"), n, "Burnout"))
            .collect();
        let cards = collect_stories(&Content { days });
        assert_eq!(cards.len(), 6);
        assert_eq!(cards[5].name, "Person 6");
    }

    #[test]
    fn nameless_and_absent_stories_are_skipped() {
        let mut nameless = day("2026-10-01", 1, "Burnout");
        if let Some(story) = nameless.inspirational_story.as_mut() {
            story.name.clear();
        }
        let mut absent = day("2026-10-02", 2, "Burnout");
        absent.inspirational_story = None;
        assert!(collect_stories(&Content {
            days: vec![nameless, absent]
        })
        .is_empty());
    }

    #[test]
    fn single_string_story_has_no_more() {
        let card = StoryCard::from_story(
            &crate::content::Story {
                name: "Ada".to_string(),
                who_she_is: "mathematician".to_string(),
                story: StoryBody::Text("Only one.".to_string()),
            },
            Theme::Financial,
            "Monday",
        );
        assert_eq!(card.first_paragraph(), "Only one.");
        assert!(!card.has_more());
        assert!(card.remaining_paragraphs().is_empty());
    }
}
