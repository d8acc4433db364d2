use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Storage key of the sidebar state.
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebar-collapsed";
/// Storage key of the colour theme.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Dashboard display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct Preferences {
    pub sidebar_collapsed: bool,
    pub theme: Theme,
}

impl Preferences {
    /// Reads preferences from stored key/value entries.
    ///
    /// Only the exact strings `"true"` and `"dark"` switch the defaults.
    pub fn from_entries(entries: &BTreeMap<String, String>) -> Self {
        let sidebar_collapsed = entries
            .get(SIDEBAR_COLLAPSED_KEY)
            .is_some_and(|v| v == "true");
        let theme = match entries.get(THEME_KEY).map(String::as_str) {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        };
        Self {
            sidebar_collapsed,
            theme,
        }
    }

    pub fn to_entries(&self) -> BTreeMap<String, String> {
        let theme = match self.theme {
            Theme::Light => "light",
            Theme::Dark => "dark",
        };
        BTreeMap::from([
            (
                SIDEBAR_COLLAPSED_KEY.to_string(),
                self.sidebar_collapsed.to_string(),
            ),
            (THEME_KEY.to_string(), theme.to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_round_trip() {
        let prefs = Preferences {
            sidebar_collapsed: true,
            theme: Theme::Dark,
        };
        let entries = prefs.to_entries();
        assert_eq!(entries["sidebar-collapsed"], "true");
        assert_eq!(entries["theme"], "dark");
        assert_eq!(Preferences::from_entries(&entries), prefs);
    }

    #[test]
    fn test_unknown_values_fall_back_to_defaults() {
        let entries = BTreeMap::from([
            ("sidebar-collapsed".to_string(), "yes".to_string()),
            ("theme".to_string(), "solarized".to_string()),
        ]);
        assert_eq!(Preferences::from_entries(&entries), Preferences::default());
    }
}
