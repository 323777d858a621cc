// ============================================================================
// ACTION INDEX - flat, shuffled list of explorable micro-actions
// ============================================================================

use rand::Rng;
use rand::seq::SliceRandom;

use crate::content::{Content, MicroAction};
use crate::schedule::Slot;
use crate::theme::{Filter, Theme};

const PER_THEME_IN_ALL: usize = 2;
const PER_THEME_FOCUSED: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionEntry {
    pub action: String,
    pub whose_life: String,
    pub impact: String,
    pub theme: Theme,
    pub day_of_week: String,
    pub slot: Slot,
}

/// Morning and afternoon micro-actions across every day, in content order.
/// Night is reflective and never enters the index.
pub fn build_entries(content: &Content) -> Vec<ActionEntry> {
    let mut entries = Vec::new();
    for day in &content.days {
        let theme = Theme::normalize(&day.theme);
        let slots: [(Slot, Option<&MicroAction>); 2] = [
            (
                Slot::Morning,
                day.morning.as_ref().and_then(|m| m.micro_action.as_ref()),
            ),
            (
                Slot::Afternoon,
                day.afternoon.as_ref().and_then(|a| a.micro_action.as_ref()),
            ),
        ];
        for (slot, micro) in slots {
            let Some(micro) = micro else { continue };
            if !micro.is_actionable() {
                continue;
            }
            entries.push(ActionEntry {
                action: micro.action.clone(),
                whose_life: micro.whose_life.clone(),
                impact: micro.impact.clone(),
                theme,
                day_of_week: day.day_of_week.clone(),
                slot,
            });
        }
    }
    entries
}

/// Uniform Fisher-Yates permutation of `items`.
pub fn shuffle<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}

/// Built once per load; its order never changes afterwards, so repeated
/// filtering yields a stable relative order.
#[derive(Debug, Clone, Default)]
pub struct ActionIndex {
    entries: Vec<ActionEntry>,
}

impl ActionIndex {
    pub fn build<R: Rng + ?Sized>(content: &Content, rng: &mut R) -> Self {
        Self {
            entries: shuffle(build_entries(content), rng),
        }
    }

    pub fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_for(&self, theme: Theme) -> usize {
        self.entries.iter().filter(|e| e.theme == theme).count()
    }

    /// `All` takes up to two per theme across the five themes; a single
    /// theme takes up to three.
    pub fn select(&self, filter: Filter) -> Vec<&ActionEntry> {
        match filter {
            Filter::All => Theme::ALL
                .iter()
                .flat_map(|&theme| self.first_of(theme, PER_THEME_IN_ALL))
                .collect(),
            Filter::Only(theme) => self.first_of(theme, PER_THEME_FOCUSED),
        }
    }

    fn first_of(&self, theme: Theme, limit: usize) -> Vec<&ActionEntry> {
        self.entries
            .iter()
            .filter(|e| e.theme == theme)
            .take(limit)
            .collect()
    }
}
