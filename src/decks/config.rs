use serde::{Deserialize, Serialize};

/// Id of the single option group every generated deck uses.
pub const DEFAULT_OPTION_GROUP_ID: i64 = 1;

/// Per-deck settings stored in the deck JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckOptions {
    /// Option group (`dconf`) the deck points at.
    pub option_group: i64,

    /// How far "custom study" may extend today's limits.
    pub extend_new: u32,
    pub extend_rev: u32,

    pub collapsed: bool,
    pub browser_collapsed: bool,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            option_group: DEFAULT_OPTION_GROUP_ID,
            extend_new: 10,
            extend_rev: 50,
            collapsed: false,
            browser_collapsed: true,
        }
    }
}

/// Scheduling defaults for the option group, matching a fresh Anki profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub id: i64,
    pub name: String,

    /// New cards introduced per day.
    pub new_per_day: u32,
    /// Learning steps in minutes.
    pub learning_steps: Vec<f64>,
    /// Graduating and easy intervals in days.
    pub graduating_interval: u32,
    pub easy_interval: u32,
    /// Starting ease in permille.
    pub initial_factor: u32,

    pub reviews_per_day: u32,
    pub easy_bonus: f64,
    pub interval_modifier: f64,
    pub max_interval: u32,

    /// Relearning steps in minutes.
    pub lapse_steps: Vec<f64>,
    pub lapse_min_interval: u32,
    pub leech_threshold: u32,

    pub max_answer_secs: u32,
}

impl Default for OptionGroup {
    fn default() -> Self {
        Self {
            id: DEFAULT_OPTION_GROUP_ID,
            name: "Default".into(),
            new_per_day: 20,
            learning_steps: vec![1.0, 10.0],
            graduating_interval: 1,
            easy_interval: 4,
            initial_factor: 2500,
            reviews_per_day: 200,
            easy_bonus: 1.3,
            interval_modifier: 1.0,
            max_interval: 36500,
            lapse_steps: vec![10.0],
            lapse_min_interval: 1,
            leech_threshold: 8,
            max_answer_secs: 60,
        }
    }
}
