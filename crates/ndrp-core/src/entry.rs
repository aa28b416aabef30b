use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Assistant,
}

impl Role {
    pub const ALL: [Self; 2] = [Self::User, Self::Assistant];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(Error::UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Coarse communicative intent of a record.
///
/// Variants are declared in classification priority order: when several
/// rules match, the earliest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Instruction,
    Reasoning,
    Conversation,
    Narrative,
    #[default]
    Unknown,
}

impl Mode {
    pub const ALL: [Self; 5] = [
        Self::Instruction,
        Self::Reasoning,
        Self::Conversation,
        Self::Narrative,
        Self::Unknown,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instruction => "instruction",
            Self::Reasoning => "reasoning",
            Self::Conversation => "conversation",
            Self::Narrative => "narrative",
            Self::Unknown => "unknown",
        }
    }

    /// Lower ranks win ties during classification.
    pub const fn priority(self) -> u8 {
        match self {
            Self::Instruction => 0,
            Self::Reasoning => 1,
            Self::Conversation => 2,
            Self::Narrative => 3,
            Self::Unknown => 4,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "mode",
                value: s.to_string(),
            })
    }
}

/// Three-step qualitative tier shared by the `density` and `entropy` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

pub type Density = Level;
pub type Entropy = Level;

impl Level {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub const fn distance(self, other: Self) -> u8 {
        self.rank().abs_diff(other.rank())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "level",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Structure {
    #[default]
    Coherent,
}

impl Structure {
    pub const COHERENT: &'static str = "coherent";
}

/// One fine-tuning record in the NDRP-1.0 shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub role: Role,
    pub content: String,
    pub intent: String,
    pub mode: Mode,
    pub context: String,
    pub structure: Structure,
    pub density: Density,
    pub entropy: Entropy,
    pub meaning_preserved: bool,
}

impl Entry {
    pub const FIELDS: [&'static str; 9] = [
        "role",
        "content",
        "intent",
        "mode",
        "context",
        "structure",
        "density",
        "entropy",
        "meaning_preserved",
    ];

    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
