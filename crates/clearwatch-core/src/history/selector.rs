//! Filter selectors and their string forms.
//!
//! The string forms are what preferences store and what the CLI accepts:
//! timespans `1`, `7`, `30`; categories `all`, `raids`, `dungeons`, `strikes`,
//! `lost-sectors`, `story`, `grouped-raid-<key>`, `grouped-dungeon-<key>`,
//! `raid-<hash>`, `dungeon-<hash>`, `activity-<hash>`, or a bare alias such as
//! `vog`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::activity::ActivityHash;
use crate::catalog::{self, ActivityType};
use crate::error::SelectorError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timespan {
    #[default]
    OneDay,
    SevenDay,
    ThirtyDay,
}

impl Timespan {
    pub fn days(self) -> i64 {
        match self {
            Timespan::OneDay => 1,
            Timespan::SevenDay => 7,
            Timespan::ThirtyDay => 30,
        }
    }

    /// Length of the literal rolling window.
    pub fn rolling_window(self) -> Duration {
        Duration::days(self.days())
    }

    /// Human label for the calendar period this timespan stands for.
    pub fn label(self) -> &'static str {
        match self {
            Timespan::OneDay => "today",
            Timespan::SevenDay => "this week",
            Timespan::ThirtyDay => "this month",
        }
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

impl FromStr for Timespan {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "day" | "today" => Ok(Timespan::OneDay),
            "7" | "week" => Ok(Timespan::SevenDay),
            "30" | "month" => Ok(Timespan::ThirtyDay),
            other => Err(SelectorError::UnknownTimespan(other.to_string())),
        }
    }
}

impl TryFrom<String> for Timespan {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timespan> for String {
    fn from(value: Timespan) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    #[default]
    All,
    Raids,
    Dungeons,
    Strikes,
    LostSectors,
    Story,
    GroupedRaid(String),
    GroupedDungeon(String),
    SpecificActivity(ActivityHash),
}

impl Category {
    /// Activity type a named-type selector stands for.
    pub fn activity_type(&self) -> Option<ActivityType> {
        match self {
            Category::Raids => Some(ActivityType::Raid),
            Category::Dungeons => Some(ActivityType::Dungeon),
            Category::Strikes => Some(ActivityType::Strike),
            Category::LostSectors => Some(ActivityType::LostSector),
            Category::Story => Some(ActivityType::Story),
            _ => None,
        }
    }
}

fn parse_hash(original: &str, digits: &str) -> Result<ActivityHash, SelectorError> {
    digits
        .parse()
        .map_err(|_| SelectorError::InvalidHash(original.to_string()))
}

impl FromStr for Category {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        let category = match value.as_str() {
            "all" => Category::All,
            "raids" => Category::Raids,
            "dungeons" => Category::Dungeons,
            "strikes" => Category::Strikes,
            "lost-sectors" => Category::LostSectors,
            "story" => Category::Story,
            _ => {
                if let Some(key) = value.strip_prefix("grouped-raid-") {
                    Category::GroupedRaid(key.to_string())
                } else if let Some(key) = value.strip_prefix("grouped-dungeon-") {
                    Category::GroupedDungeon(key.to_string())
                } else if let Some(hash) = value
                    .strip_prefix("raid-")
                    .or_else(|| value.strip_prefix("dungeon-"))
                    .or_else(|| value.strip_prefix("activity-"))
                {
                    Category::SpecificActivity(parse_hash(s, hash)?)
                } else if let Some(key) = catalog::resolve_alias(&value) {
                    if catalog::grouped_raids().get(key).is_some() {
                        Category::GroupedRaid(key.to_string())
                    } else {
                        Category::GroupedDungeon(key.to_string())
                    }
                } else {
                    return Err(SelectorError::UnknownCategory(s.to_string()));
                }
            }
        };
        Ok(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::All => f.write_str("all"),
            Category::Raids => f.write_str("raids"),
            Category::Dungeons => f.write_str("dungeons"),
            Category::Strikes => f.write_str("strikes"),
            Category::LostSectors => f.write_str("lost-sectors"),
            Category::Story => f.write_str("story"),
            Category::GroupedRaid(key) => write!(f, "grouped-raid-{key}"),
            Category::GroupedDungeon(key) => write!(f, "grouped-dungeon-{key}"),
            Category::SpecificActivity(hash) => write!(f, "activity-{hash}"),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.to_string()
    }
}

/// What the history view is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelector {
    pub timespan: Timespan,
    pub category: Category,
}

impl FilterSelector {
    pub fn new(timespan: Timespan, category: Category) -> Self {
        Self { timespan, category }
    }
}
