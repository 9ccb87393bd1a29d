//! Deck selection under a star budget.
//!
//! Selection is a bounded-effort heuristic, not a search for the best possible deck. Three
//! strategies run in order and the first one that yields a full deck wins:
//!
//! 1. [Strategy::StarGreedy]: strongest cards first, skipping any card that would overflow
//!    the budget.
//! 2. [Strategy::ValueRatio]: same accumulation, ordered by weighted score per star.
//! 3. [Strategy::ForcedMinimum]: the five cheapest cards, ignoring the budget. This is the
//!    only strategy that can return an over-budget deck; callers must check
//!    [Selection::exceeds] before registering it.
//!
//! All sorts are stable, so cards with equal keys keep their order from the pool.

use crate::{Card, StarBudget, DECK_SIZE};
use std::collections::HashSet;

/// Which strategy produced a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    StarGreedy,
    ValueRatio,
    ForcedMinimum,
}

/// Outcome of [select].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub cards: Vec<Card>,
    pub total_stars: i64,
    pub strategy: Option<Strategy>,
}

impl Selection {
    fn from_cards(cards: Vec<&Card>, strategy: Strategy) -> Self {
        let total_stars = cards
            .iter()
            .fold(0i64, |total, card| total.saturating_add(card.stars));
        Self {
            cards: cards.into_iter().cloned().collect(),
            total_stars,
            strategy: Some(strategy),
        }
    }

    /// Whether the selection holds a full deck.
    pub fn is_complete(&self) -> bool {
        self.cards.len() == DECK_SIZE
    }

    pub fn exceeds(&self, budget: StarBudget) -> bool {
        budget.is_exceeded_by(self.total_stars)
    }

    pub fn card_ids(&self) -> Vec<String> {
        self.cards.iter().map(|card| card.id.clone()).collect()
    }
}

/// Choose a deck from `pool`, never reusing a card in `used`.
///
/// Returns an empty selection with zero stars when fewer than [DECK_SIZE] cards are eligible.
pub fn select(pool: &[Card], budget: StarBudget, used: &HashSet<String>) -> Selection {
    let eligible: Vec<&Card> = pool.iter().filter(|card| !used.contains(&card.id)).collect();
    if eligible.len() < DECK_SIZE {
        return Selection::default();
    }

    let mut by_stars = eligible;
    by_stars.sort_by(|a, b| b.stars.cmp(&a.stars));
    if let Some(cards) = fill_within_budget(&by_stars, budget) {
        return Selection::from_cards(cards, Strategy::StarGreedy);
    }

    // Sorted from the star ordering so equal ratios keep the strongest card first.
    let mut by_ratio = by_stars.clone();
    by_ratio.sort_by(|a, b| b.value_ratio().total_cmp(&a.value_ratio()));
    if let Some(cards) = fill_within_budget(&by_ratio, budget) {
        return Selection::from_cards(cards, Strategy::ValueRatio);
    }

    let mut cheapest = by_stars;
    cheapest.sort_by_key(|card| card.stars);
    cheapest.truncate(DECK_SIZE);
    Selection::from_cards(cheapest, Strategy::ForcedMinimum)
}

/// Greedily take cards in order while the running total stays within budget.
fn fill_within_budget<'a>(ordered: &[&'a Card], budget: StarBudget) -> Option<Vec<&'a Card>> {
    let mut chosen = Vec::with_capacity(DECK_SIZE);
    let mut total: i64 = 0;
    for card in ordered {
        let next = total.saturating_add(card.stars);
        if budget.admits(next) {
            chosen.push(*card);
            total = next;
            if chosen.len() == DECK_SIZE {
                return Some(chosen);
            }
        }
    }
    None
}
