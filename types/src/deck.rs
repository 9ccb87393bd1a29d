use serde::Serialize;
use uuid::Uuid;

/// Number of cards in a tournament deck.
pub const DECK_SIZE: usize = 5;

/// Body of a deck creation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub deck_id: String,
    pub card_ids: Vec<String>,
    pub tournament_id: String,
}

impl Deck {
    /// Build a deck under a freshly generated id.
    pub fn new(card_ids: Vec<String>, tournament_id: impl Into<String>) -> Self {
        Self {
            deck_id: Uuid::new_v4().to_string(),
            card_ids,
            tournament_id: tournament_id.into(),
        }
    }
}
