//! Static activity tables: mode types, known raids and dungeons, groupings.
//!
//! Difficulty tiers of the same encounter ("Vow of the Disciple" and
//! "Vow of the Disciple (Master)") collapse into one [`ActivityGroup`] keyed by
//! a slug of the base name. Groups are built once on first use.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::activity::{ActivityHash, ModeId};

/// Broad activity type derived from an activity's mode list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityType {
    Story,
    Raid,
    Dungeon,
    Strike,
    LostSector,
}

/// Mode id → type. Order matters only for lookup of a single mode.
const MODE_TYPES: &[(ModeId, ActivityType)] = &[
    (2, ActivityType::Story),
    (4, ActivityType::Raid),
    (82, ActivityType::Dungeon),
    (18, ActivityType::Strike),
    (87, ActivityType::LostSector),
];

impl ActivityType {
    pub fn from_mode(mode: ModeId) -> Option<Self> {
        MODE_TYPES
            .iter()
            .find(|(id, _)| *id == mode)
            .map(|(_, kind)| *kind)
    }

    /// First mode in `modes` with a known type wins.
    pub fn from_modes(modes: &[ModeId]) -> Option<Self> {
        modes.iter().find_map(|&mode| Self::from_mode(mode))
    }

    pub fn name(self) -> &'static str {
        match self {
            ActivityType::Story => "Story",
            ActivityType::Raid => "Raid",
            ActivityType::Dungeon => "Dungeon",
            ActivityType::Strike => "Strike",
            ActivityType::LostSector => "Lost Sector",
        }
    }

    /// Title used on completion popups.
    pub fn notification_title(self) -> &'static str {
        match self {
            ActivityType::Strike => "Strike / Portal",
            other => other.name(),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A timer is only worth running for activities of a known type.
pub fn is_trackable(modes: &[ModeId]) -> bool {
    ActivityType::from_modes(modes).is_some()
}

pub const KNOWN_RAIDS: &[(ActivityHash, &str)] = &[
    (2122313384, "Last Wish"),
    (1042180643, "Garden of Salvation"),
    (910380154, "Deep Stone Crypt"),
    (3881495763, "Vault of Glass"),
    (3022541210, "Vault of Glass (Master)"),
    (1441982566, "Vow of the Disciple"),
    (3889634515, "Vow of the Disciple (Master)"),
    (1374392663, "King's Fall"),
    (3257594522, "King's Fall (Master)"),
    (2381413764, "Root of Nightmares"),
    (2918919505, "Root of Nightmares (Master)"),
    (107319834, "Crota's End"),
    (1507509200, "Crota's End (Master)"),
    (1541433876, "Salvation's Edge"),
    (4129614942, "Salvation's Edge (Master)"),
    (1044919065, "The Desert Perpetual"),
    (3817322389, "The Desert Perpetual (Epic)"),
];

pub const KNOWN_DUNGEONS: &[(ActivityHash, &str)] = &[
    (2032534090, "The Shattered Throne"),
    (2582501063, "Pit of Heresy"),
    (1077850348, "Prophecy"),
    (4078656646, "Grasp of Avarice"),
    (1112917203, "Grasp of Avarice (Master)"),
    (2823159265, "Duality"),
    (3012587626, "Duality (Master)"),
    (1262462921, "Spire of the Watcher"),
    (2296818662, "Spire of the Watcher (Master)"),
    (313828469, "Ghosts of the Deep"),
    (2716998124, "Ghosts of the Deep (Master)"),
    (2004855007, "Warlord's Ruin"),
    (2534833093, "Warlord's Ruin (Master)"),
    (300092127, "Vesper's Host"),
    (4293676253, "Vesper's Host (Master)"),
    (3834447244, "The Sundered Doctrine"),
    (3521648250, "The Sundered Doctrine (Master)"),
    (2727361621, "Equilibrium"),
];

/// Non-gameplay entries that never count toward clears.
pub const EXCLUDED_ACTIVITIES: &[ActivityHash] = &[
    3830679567, // Shooting Range
];

/// Short names players use for grouped activities.
const ACTIVITY_ALIASES: &[(&str, &str)] = &[
    ("lw", "last-wish"),
    ("gos", "garden-of-salvation"),
    ("dsc", "deep-stone-crypt"),
    ("vog", "vault-of-glass"),
    ("votd", "vow-of-the-disciple"),
    ("kf", "king-s-fall"),
    ("ron", "root-of-nightmares"),
    ("ce", "crota-s-end"),
    ("se", "salvation-s-edge"),
    ("dp", "the-desert-perpetual"),
    ("st", "the-shattered-throne"),
    ("poh", "pit-of-heresy"),
    ("goa", "grasp-of-avarice"),
    ("sotw", "spire-of-the-watcher"),
    ("gotd", "ghosts-of-the-deep"),
    ("wr", "warlord-s-ruin"),
    ("vh", "vesper-s-host"),
    ("sd", "the-sundered-doctrine"),
];

pub fn is_excluded(hash: ActivityHash) -> bool {
    EXCLUDED_ACTIVITIES.contains(&hash)
}

/// Known raid or dungeon name for `hash`, including any difficulty suffix.
pub fn resolve_activity_name(hash: ActivityHash) -> Option<&'static str> {
    KNOWN_RAIDS
        .iter()
        .chain(KNOWN_DUNGEONS.iter())
        .find(|(known, _)| *known == hash)
        .map(|(_, name)| *name)
}

/// Group key an alias points at, if `alias` is one.
pub fn resolve_alias(alias: &str) -> Option<&'static str> {
    let alias = alias.to_ascii_lowercase();
    ACTIVITY_ALIASES
        .iter()
        .find(|(short, _)| *short == alias)
        .map(|(_, key)| *key)
}

/// Drops one trailing parenthetical: "Duality (Master)" → "Duality".
pub fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end();
    if trimmed.ends_with(')') {
        if let Some(open) = trimmed.rfind('(') {
            return trimmed[..open].trim_end();
        }
    }
    trimmed
}

/// Lowercases and replaces every run of non-alphanumerics with one `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_gap = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('-');
            in_gap = true;
        }
    }
    slug
}

pub fn group_key(name: &str) -> String {
    slugify(base_name(name))
}

/// An activity and its harder difficulty tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityGroup {
    pub key: String,
    pub name: String,
    pub hashes: Vec<ActivityHash>,
}

impl ActivityGroup {
    pub fn contains(&self, hash: ActivityHash) -> bool {
        self.hashes.contains(&hash)
    }
}

/// Groups keyed by slug; iteration is in key order.
#[derive(Debug, Clone, Default)]
pub struct GroupTable {
    groups: BTreeMap<String, ActivityGroup>,
}

impl GroupTable {
    pub fn build(activities: &[(ActivityHash, &str)]) -> Self {
        let mut groups: BTreeMap<String, ActivityGroup> = BTreeMap::new();
        for &(hash, name) in activities {
            let base = base_name(name);
            groups
                .entry(slugify(base))
                .or_insert_with_key(|key| ActivityGroup {
                    key: key.clone(),
                    name: base.to_string(),
                    hashes: Vec::new(),
                })
                .hashes
                .push(hash);
        }
        Self { groups }
    }

    pub fn get(&self, key: &str) -> Option<&ActivityGroup> {
        self.groups.get(key)
    }

    /// True when the group exists and includes `hash`. Unknown keys match nothing.
    pub fn matches(&self, key: &str, hash: ActivityHash) -> bool {
        self.get(key).is_some_and(|group| group.contains(hash))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

static GROUPED_RAIDS: LazyLock<GroupTable> = LazyLock::new(|| GroupTable::build(KNOWN_RAIDS));
static GROUPED_DUNGEONS: LazyLock<GroupTable> =
    LazyLock::new(|| GroupTable::build(KNOWN_DUNGEONS));

pub fn grouped_raids() -> &'static GroupTable {
    &GROUPED_RAIDS
}

pub fn grouped_dungeons() -> &'static GroupTable {
    &GROUPED_DUNGEONS
}
