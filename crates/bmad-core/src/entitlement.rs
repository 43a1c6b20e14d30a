use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use super::config::QuotaConfig;
use super::error::WorkspaceError;

pub const DEFAULT_FREE_CREDITS: u32 = 50;
pub const DEFAULT_PRO_CREDITS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Pro,
    Enterprise,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Pro, Tier::Enterprise];

    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Pro => "Pro",
            Self::Enterprise => "Enterprise",
        }
    }

    pub fn price(self) -> &'static str {
        match self {
            Self::Free => "$0 forever",
            Self::Pro => "$19 per month",
            Self::Enterprise => "$99 per month",
        }
    }

    pub fn is_metered(self) -> bool {
        matches!(self, Self::Free)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = WorkspaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(WorkspaceError::InvalidTier(value.to_string())),
        }
    }
}

/// Remaining usage allowance. Persisted as a JSON number, or the string
/// `"unbounded"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credits {
    Finite(u32),
    Unbounded,
}

const UNBOUNDED_LABEL: &str = "unbounded";

impl Credits {
    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::Finite(0))
    }

    pub fn remaining(self) -> Option<u32> {
        match self {
            Self::Finite(count) => Some(count),
            Self::Unbounded => None,
        }
    }

    pub fn debit(self) -> Self {
        match self {
            Self::Finite(count) => Self::Finite(count.saturating_sub(1)),
            Self::Unbounded => Self::Unbounded,
        }
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(count) => write!(f, "{count}"),
            Self::Unbounded => f.write_str("unlimited"),
        }
    }
}

impl Serialize for Credits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(count) => serializer.serialize_u32(*count),
            Self::Unbounded => serializer.serialize_str(UNBOUNDED_LABEL),
        }
    }
}

impl<'de> Deserialize<'de> for Credits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Count(u32),
            Label(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Count(count) => Ok(Self::Finite(count)),
            Repr::Label(label) if label == UNBOUNDED_LABEL => Ok(Self::Unbounded),
            Repr::Label(label) => Err(serde::de::Error::custom(format!(
                "unknown credit value '{label}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntitlement {
    pub tier: Tier,
    pub credits: Credits,
}

impl Default for UserEntitlement {
    fn default() -> Self {
        Self {
            tier: Tier::Free,
            credits: Credits::Finite(DEFAULT_FREE_CREDITS),
        }
    }
}

impl UserEntitlement {
    pub fn for_tier(tier: Tier, quotas: &QuotaConfig) -> Self {
        Self {
            tier,
            credits: quota_for(tier, quotas),
        }
    }

    /// Rebuilds an entitlement from independently persisted tier and credit
    /// values, restoring the Enterprise-is-unbounded invariant.
    pub fn from_persisted(tier: Tier, credits: Credits, quotas: &QuotaConfig) -> Self {
        let credits = match (tier, credits) {
            (Tier::Enterprise, _) => Credits::Unbounded,
            (_, Credits::Unbounded) => quota_for(tier, quotas),
            (_, finite) => finite,
        };
        Self { tier, credits }
    }

    pub fn current_entitlement(&self) -> UserEntitlement {
        *self
    }

    pub fn apply_tier_change(&mut self, tier: Tier, quotas: &QuotaConfig) -> UserEntitlement {
        *self = Self::for_tier(tier, quotas);
        *self
    }

    pub fn usage(&self, quotas: &QuotaConfig) -> Option<UsageSnapshot> {
        if !self.tier.is_metered() {
            return None;
        }
        let remaining = self.credits.remaining()?;
        let max = quotas.free_credits.max(1);
        let level = if remaining <= quotas.critical_threshold {
            UsageLevel::Critical
        } else if remaining <= quotas.low_threshold {
            UsageLevel::Low
        } else {
            UsageLevel::Healthy
        };
        Some(UsageSnapshot {
            remaining,
            max: quotas.free_credits,
            percent_remaining: ((u64::from(remaining) * 100) / u64::from(max)).min(100) as u8,
            level,
        })
    }
}

fn quota_for(tier: Tier, quotas: &QuotaConfig) -> Credits {
    match tier {
        Tier::Free => Credits::Finite(quotas.free_credits),
        Tier::Pro => Credits::Finite(quotas.pro_credits),
        Tier::Enterprise => Credits::Unbounded,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Healthy,
    Low,
    Critical,
}

impl UsageLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Low => "low",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub remaining: u32,
    pub max: u32,
    pub percent_remaining: u8,
    pub level: UsageLevel,
}
