// ============================================================================
// THEMES - the five fixed categories and the explore filter
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    PersonalIdentity,
    HealthBody,
    Burnout,
    Financial,
    Social,
}

impl Theme {
    /// Fixed display and grouping order.
    pub const ALL: [Theme; 5] = [
        Theme::PersonalIdentity,
        Theme::HealthBody,
        Theme::Burnout,
        Theme::Financial,
        Theme::Social,
    ];

    /// Maps the generator's free-text theme label to a stable key.
    /// Anything unrecognized falls back to personal identity.
    pub fn normalize(label: &str) -> Theme {
        match label.trim() {
            "Personal Identity" => Theme::PersonalIdentity,
            "Health & Body Image" => Theme::HealthBody,
            "Burnout" => Theme::Burnout,
            "Financial Knowledge" => Theme::Financial,
            "Social Pressure vs. Authentic Living" => Theme::Social,
            _ => Theme::PersonalIdentity,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Theme::PersonalIdentity => "personal-identity",
            Theme::HealthBody => "health-body",
            Theme::Burnout => "burnout",
            Theme::Financial => "financial",
            Theme::Social => "social",
        }
    }

    pub fn from_key(key: &str) -> Option<Theme> {
        Theme::ALL.into_iter().find(|theme| theme.key() == key)
    }

    pub fn display_label(self) -> &'static str {
        match self {
            Theme::PersonalIdentity => "personal identity",
            Theme::HealthBody => "health & body",
            Theme::Burnout => "burnout",
            Theme::Financial => "financial",
            Theme::Social => "social pressure",
        }
    }
}

/// Display label for a raw key; unknown keys are echoed back.
pub fn display_label_for_key(key: &str) -> &str {
    match Theme::from_key(key) {
        Some(theme) => theme.display_label(),
        None => key,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Only(Theme),
}

impl Filter {
    /// Pill order in the explore view.
    pub const PILLS: [Filter; 6] = [
        Filter::All,
        Filter::Only(Theme::PersonalIdentity),
        Filter::Only(Theme::HealthBody),
        Filter::Only(Theme::Burnout),
        Filter::Only(Theme::Financial),
        Filter::Only(Theme::Social),
    ];

    pub fn key(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Only(theme) => theme.key(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Only(theme) => theme.display_label(),
        }
    }

    pub fn parse(key: &str) -> Option<Filter> {
        if key == "all" {
            return Some(Filter::All);
        }
        Theme::from_key(key).map(Filter::Only)
    }
}
