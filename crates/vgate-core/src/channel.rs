use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A distribution target. The set is closed: fan-out matches on it
/// exhaustively and nothing outside these five can be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Long-form video platform.
    YouTube,
    /// Short-form video platform.
    TikTok,
    /// Image platform.
    Instagram,
    /// Professional network.
    LinkedIn,
    /// Microblogging platform.
    Twitter,
}

impl Channel {
    /// Every channel, in fan-out order.
    pub const ALL: [Channel; 5] = [
        Channel::YouTube,
        Channel::TikTok,
        Channel::Instagram,
        Channel::LinkedIn,
        Channel::Twitter,
    ];

    /// Stable lowercase identifier used on the wire and in the ledger.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::YouTube => "youtube",
            Channel::TikTok => "tiktok",
            Channel::Instagram => "instagram",
            Channel::LinkedIn => "linkedin",
            Channel::Twitter => "twitter",
        }
    }

    /// Human-facing name, used when tagging fallback copy.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Channel::YouTube => "YouTube",
            Channel::TikTok => "TikTok",
            Channel::Instagram => "Instagram",
            Channel::LinkedIn => "LinkedIn",
            Channel::Twitter => "Twitter",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "youtube" => Ok(Channel::YouTube),
            "tiktok" => Ok(Channel::TikTok),
            "instagram" => Ok(Channel::Instagram),
            "linkedin" => Ok(Channel::LinkedIn),
            "twitter" | "x" => Ok(Channel::Twitter),
            _ => Err(CoreError::UnknownChannel(s.to_string())),
        }
    }
}
