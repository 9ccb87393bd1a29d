//! Tournament tiers, their star budgets and per-tier registration outcomes.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

/// Maximum cumulative stars a deck may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StarBudget {
    Limited(i64),
    Unbounded,
}

impl StarBudget {
    /// Whether a deck totalling `stars` fits within the budget.
    pub fn admits(&self, stars: i64) -> bool {
        match self {
            StarBudget::Limited(max) => stars <= *max,
            StarBudget::Unbounded => true,
        }
    }

    pub fn is_exceeded_by(&self, stars: i64) -> bool {
        !self.admits(stars)
    }
}

impl fmt::Display for StarBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarBudget::Limited(max) => write!(f, "{max}"),
            StarBudget::Unbounded => f.write_str("unbounded"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentTier {
    Bronze,
    Silver,
    Gold,
    Elite,
}

impl TournamentTier {
    pub const ALL: [TournamentTier; 4] = [
        TournamentTier::Bronze,
        TournamentTier::Silver,
        TournamentTier::Gold,
        TournamentTier::Elite,
    ];

    pub fn budget(&self) -> StarBudget {
        match self {
            TournamentTier::Bronze => StarBudget::Limited(18),
            TournamentTier::Silver => StarBudget::Limited(23),
            TournamentTier::Gold => StarBudget::Limited(25),
            TournamentTier::Elite => StarBudget::Unbounded,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TournamentTier::Bronze => "Bronze Tournament",
            TournamentTier::Silver => "Silver Tournament",
            TournamentTier::Gold => "Gold Tournament",
            TournamentTier::Elite => "Elite Tournament",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentTier::Bronze => "bronze",
            TournamentTier::Silver => "silver",
            TournamentTier::Gold => "gold",
            TournamentTier::Elite => "elite",
        }
    }
}

impl fmt::Display for TournamentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tournament tier: {0}")]
pub struct ParseTierError(String);

impl FromStr for TournamentTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TournamentTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTierError(s.to_string()))
    }
}

/// Tournament ids per tier.
///
/// A tier whose id is `Some("")` was requested but has no tournament running; it still shows
/// up (as a failure) when an account has no cards at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentIds {
    pub bronze: Option<String>,
    pub silver: Option<String>,
    pub gold: Option<String>,
    pub elite: Option<String>,
}

impl TournamentIds {
    pub fn get(&self, tier: TournamentTier) -> Option<&str> {
        match tier {
            TournamentTier::Bronze => self.bronze.as_deref(),
            TournamentTier::Silver => self.silver.as_deref(),
            TournamentTier::Gold => self.gold.as_deref(),
            TournamentTier::Elite => self.elite.as_deref(),
        }
    }

    pub fn set(&mut self, tier: TournamentTier, id: impl Into<String>) {
        let slot = match tier {
            TournamentTier::Bronze => &mut self.bronze,
            TournamentTier::Silver => &mut self.silver,
            TournamentTier::Gold => &mut self.gold,
            TournamentTier::Elite => &mut self.elite,
        };
        *slot = Some(id.into());
    }

    /// Tiers present in the mapping, in bronze..elite order.
    pub fn requested(&self) -> impl Iterator<Item = TournamentTier> + '_ {
        TournamentTier::ALL
            .into_iter()
            .filter(|tier| self.get(*tier).is_some())
    }

    /// First tier (bronze..elite) with a non-empty tournament id.
    pub fn active(&self) -> Option<(TournamentTier, &str)> {
        TournamentTier::ALL.into_iter().find_map(|tier| {
            self.get(tier)
                .filter(|id| !id.is_empty())
                .map(|id| (tier, id))
        })
    }
}

/// Whether at least one deck was registered, per tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome(BTreeMap<TournamentTier, bool>);

impl RegistrationOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every listed tier marked as failed.
    pub fn all_failed(tiers: impl IntoIterator<Item = TournamentTier>) -> Self {
        Self(tiers.into_iter().map(|tier| (tier, false)).collect())
    }

    pub fn record(&mut self, tier: TournamentTier, registered: bool) {
        self.0.insert(tier, registered);
    }

    pub fn get(&self, tier: TournamentTier) -> Option<bool> {
        self.0.get(&tier).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TournamentTier, bool)> + '_ {
        self.0.iter().map(|(tier, ok)| (*tier, *ok))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn any_registered(&self) -> bool {
        self.0.values().any(|ok| *ok)
    }
}
