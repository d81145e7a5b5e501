//! Permissions bitflags for the bot's own channel access
//!
//! Bit positions follow the chat platform's permission integer so values
//! reported by the gateway can be wrapped directly.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Channel permission flags relevant to posting and moderating ideas
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Permissions: u64 {
        /// Bypass all permission checks
        const ADMINISTRATOR    = 1 << 3;
        /// Add emoji reactions
        const ADD_REACTIONS    = 1 << 6;
        /// View channel and read messages
        const VIEW_CHANNEL     = 1 << 10;
        /// Send messages in text channels
        const SEND_MESSAGES    = 1 << 11;
        /// Delete other users' messages and reactions
        const MANAGE_MESSAGES  = 1 << 13;
        /// Send embedded content
        const EMBED_LINKS      = 1 << 14;
        /// Read message history (needed to fetch posts for closing)
        const READ_MESSAGE_HISTORY = 1 << 16;

        /// Everything the bot needs to run an idea channel
        const IDEA_CHANNEL = Self::VIEW_CHANNEL.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::EMBED_LINKS.bits()
            | Self::ADD_REACTIONS.bits()
            | Self::MANAGE_MESSAGES.bits()
            | Self::READ_MESSAGE_HISTORY.bits();
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Permissions out of `required` that are not granted
    pub fn missing(&self, required: Permissions) -> Permissions {
        if self.contains(Permissions::ADMINISTRATOR) {
            return Permissions::empty();
        }
        required.difference(*self)
    }

    /// Human readable names of the set flags, e.g. `Add Reactions, Manage Messages`
    pub fn names(&self) -> String {
        self.iter_names()
            .map(|(name, _)| title_case(name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parse from the platform's decimal string representation
    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<u64>().ok().map(Self::from_bits_truncate)
    }
}

fn title_case(flag: &str) -> String {
    flag.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// Serialize as string, matching the platform payloads
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Permissions::parse(&s).ok_or_else(|| serde::de::Error::custom("invalid permissions value"))
    }
}
