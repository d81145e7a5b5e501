//! Idea entity - a posted proposal open to timed, reaction-based voting

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Maximum number of sections (ungrouped plus grouped) an idea may have
pub const MAX_SECTIONS: usize = 15;

/// Symbols handed out to sections, in message order
pub const SECTION_EMOJIS: [&str; MAX_SECTIONS] = [
    "🇦", "🇧", "🇨", "🇩", "🇪", "🇫", "🇬", "🇭", "🇮", "🇯", "🇰", "🇱", "🇲", "🇳", "🇴",
];

/// Idea entity
///
/// Identified by the id of the message carrying its post. `vote_until` of
/// `None` means the vote never closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    /// Symbols of the ungrouped sections, one per section
    pub global_section_emojis: Vec<String>,
    pub groups: Vec<SectionGroup>,
    pub vote_type: VoteType,
    pub vote_until: Option<DateTime<Utc>>,
}

/// A set of mutually exclusive sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionGroup {
    pub title: String,
    pub emojis: Vec<String>,
}

impl SectionGroup {
    pub fn new(title: impl Into<String>, emojis: Vec<String>) -> Self {
        Self {
            title: title.into(),
            emojis,
        }
    }

    #[inline]
    pub fn contains(&self, emoji: &str) -> bool {
        self.emojis.iter().any(|e| e == emoji)
    }
}

impl Idea {
    /// Total number of sections, ungrouped and grouped
    pub fn section_count(&self) -> usize {
        self.global_section_emojis.len() + self.groups.iter().map(|g| g.emojis.len()).sum::<usize>()
    }

    /// Whether the idea has any votable sections
    #[inline]
    pub fn has_sections(&self) -> bool {
        self.section_count() > 0
    }

    /// All section symbols in seeding order: ungrouped first, then each group
    pub fn section_emojis(&self) -> impl Iterator<Item = &str> {
        self.global_section_emojis
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.emojis.iter()))
            .map(String::as_str)
    }

    /// The group a section symbol belongs to, if any
    pub fn group_of(&self, emoji: &str) -> Option<&SectionGroup> {
        self.groups.iter().find(|g| g.contains(emoji))
    }

    /// Ordering key inside the deadline window
    #[inline]
    pub fn deadline_key(&self) -> Option<(DateTime<Utc>, Snowflake)> {
        self.vote_until.map(|until| (until, self.message_id))
    }

    /// Whether the vote has closed at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.vote_until.is_some_and(|until| until < now)
    }

    /// Check the entity invariants before persisting
    ///
    /// Violations here are defects, the parser rejects bad input first.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.message_id.is_zero() || self.channel_id.is_zero() {
            return Err(DomainError::InvariantViolation(
                "idea is missing its channel or message id".to_string(),
            ));
        }

        let count = self.section_count();
        if count > MAX_SECTIONS {
            return Err(DomainError::TooManySections(count));
        }

        let mut seen = HashSet::with_capacity(count + self.vote_type.emojis().len());
        for emoji in self.vote_type.emojis().iter().copied().chain(self.section_emojis()) {
            if !seen.insert(emoji) {
                return Err(DomainError::DuplicateEmoji(emoji.to_string()));
            }
        }

        Ok(())
    }
}

/// The emoji scale used for an idea's overall rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    #[default]
    Thumbs,
    TwoEmojis,
    ThreeEmojis,
    FiveEmojis,
}

impl VoteType {
    /// Emojis in display and seeding order, most positive first
    pub fn emojis(self) -> &'static [&'static str] {
        match self {
            Self::Thumbs => &["👍", "👎"],
            Self::TwoEmojis => &["😀", "☹"],
            Self::ThreeEmojis => &["😀", "😐", "☹"],
            Self::FiveEmojis => &["😀", "🙂", "😐", "🙁", "☹"],
        }
    }

    /// Emojis ordered worst to best; rank `i + 1` is the weight of index `i`
    pub fn rating_scale(self) -> impl Iterator<Item = &'static str> {
        self.emojis().iter().rev().copied()
    }

    /// Number of points on the scale
    #[inline]
    pub fn points(self) -> usize {
        self.emojis().len()
    }

    /// Two-point scales are rated as a percentage instead of a weighted mean
    #[inline]
    pub fn is_binary(self) -> bool {
        self.points() == 2
    }

    #[inline]
    pub fn contains(self, emoji: &str) -> bool {
        self.emojis().contains(&emoji)
    }

    pub fn to_i16(self) -> i16 {
        match self {
            Self::Thumbs => 0,
            Self::TwoEmojis => 1,
            Self::ThreeEmojis => 2,
            Self::FiveEmojis => 3,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Thumbs),
            1 => Some(Self::TwoEmojis),
            2 => Some(Self::ThreeEmojis),
            3 => Some(Self::FiveEmojis),
            _ => None,
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Thumbs => "thumbs",
            Self::TwoEmojis => "two emojis",
            Self::ThreeEmojis => "three emojis",
            Self::FiveEmojis => "five emojis",
        };
        f.write_str(name)
    }
}
