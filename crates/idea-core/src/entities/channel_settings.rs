//! Channel settings - per-channel idea configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::idea::VoteType;
use crate::value_objects::Color;

/// How ideas posted in a channel are turned into votes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub vote_type: VoteType,
    /// Zero means the vote never closes
    #[serde(with = "duration_secs")]
    pub vote_duration: Duration,
    pub anonymous: bool,
    pub color: Color,
}

impl ChannelSettings {
    /// Whether ideas in this channel have a deadline
    #[inline]
    pub fn has_deadline(&self) -> bool {
        self.vote_duration > Duration::zero()
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            vote_type: VoteType::Thumbs,
            vote_duration: Duration::zero(),
            anonymous: false,
            color: Color::BLURPLE,
        }
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        i64::deserialize(d).map(Duration::seconds)
    }
}
