//! Multi-deck tournament registration for one account.
//!
//! The card pool is fetched once. Decks are then selected and submitted one after another,
//! each excluding the cards of every deck registered before it, until the pool runs dry, the
//! next deck would break the star budget, or a submission fails.

use crate::{Account, CardCatalog, Client, Credentials, DeckSubmitter, SubmitPolicy};
use fantasy_types::{select, Card, RegistrationOutcome, TournamentIds, TournamentTier};
use std::collections::HashSet;
use tracing::{error, info};

/// Why a tier's registration loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// At least one deck registered before the pool or the star budget ran out.
    Success,
    /// Not enough unused cards for a first deck.
    NoCards,
    /// The first deck could only be built over the star budget.
    BudgetExceeded,
    /// A submission failed for good.
    SubmissionFailed,
}

/// Result of registering decks for one tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierReport {
    pub tier: TournamentTier,
    pub decks_registered: usize,
    pub end: SessionEnd,
}

impl TierReport {
    pub fn registered(&self) -> bool {
        self.decks_registered > 0
    }
}

pub struct Orchestrator {
    client: Client,
    policy: SubmitPolicy,
}

impl Orchestrator {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            policy: SubmitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register as many decks as possible for the first tier in `tournaments` that has a
    /// tournament id.
    ///
    /// Without any available cards every requested tier is reported as failed; without an
    /// active tier the outcome is empty.
    pub async fn register(
        &self,
        account: &Account,
        tournaments: &TournamentIds,
    ) -> RegistrationOutcome {
        let credentials = Credentials::resolve(&self.client, account);
        let cards = CardCatalog::new(&self.client)
            .fetch(account, &credentials)
            .await;
        if cards.is_empty() {
            info!(account = %account.label, "no cards available");
            return RegistrationOutcome::all_failed(tournaments.requested());
        }

        let Some((tier, tournament_id)) = tournaments.active() else {
            info!(account = %account.label, "no active tournament selected");
            return RegistrationOutcome::new();
        };
        info!(
            account = %account.label,
            tournament = tier.display_name(),
            "attempting tournament registration"
        );

        let report = self
            .register_tier(account, tier, tournament_id, &cards)
            .await;
        let mut outcome = RegistrationOutcome::new();
        outcome.record(tier, report.registered());
        outcome
    }

    /// Select and submit decks from `cards` until no further deck can be registered.
    pub async fn register_tier(
        &self,
        account: &Account,
        tier: TournamentTier,
        tournament_id: &str,
        cards: &[Card],
    ) -> TierReport {
        let budget = tier.budget();
        let submitter = DeckSubmitter::new(&self.client, self.policy.clone());
        let mut used: HashSet<String> = HashSet::new();
        let mut deck_number = 1;

        let end = loop {
            let first = deck_number == 1;
            let selection = select(cards, budget, &used);

            if !selection.is_complete() {
                if first {
                    info!(account = %account.label, %tier, "not enough available cards for tournament");
                    break SessionEnd::NoCards;
                }
                info!(
                    account = %account.label,
                    %tier,
                    registered = deck_number - 1,
                    "no more complete decks available"
                );
                break SessionEnd::Success;
            }

            if selection.exceeds(budget) {
                if first {
                    info!(
                        account = %account.label,
                        %tier,
                        total_stars = selection.total_stars,
                        %budget,
                        "selected cards exceed star limit"
                    );
                    break SessionEnd::BudgetExceeded;
                }
                info!(account = %account.label, %tier, "no more valid decks within star limit");
                break SessionEnd::Success;
            }

            let summary = selection
                .cards
                .iter()
                .map(|card| format!("{} ({}*)", card.ascii_name(), card.stars))
                .collect::<Vec<_>>()
                .join(", ");
            info!(
                account = %account.label,
                %tier,
                deck_number,
                total_stars = selection.total_stars,
                strategy = ?selection.strategy,
                cards = %summary,
                "selected deck"
            );

            let card_ids = selection.card_ids();
            let credentials = Credentials::resolve(&self.client, account);
            if !submitter
                .submit(&credentials, account, tournament_id, &card_ids, deck_number)
                .await
            {
                if first {
                    error!(account = %account.label, %tier, "failed to register first deck");
                }
                break SessionEnd::SubmissionFailed;
            }
            used.extend(card_ids);
            deck_number += 1;
        };

        TierReport {
            tier,
            decks_registered: deck_number - 1,
            end,
        }
    }
}
