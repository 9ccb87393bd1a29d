//! Common types used throughout the tournament registrar.
//!
//! Cards are normalized once at ingestion ([card::RawCard] -> [Card]); everything downstream
//! works with plain integers and floats and never has to handle malformed upstream data.

pub mod card;
pub mod deck;
pub mod selector;
pub mod tier;

pub use card::{Card, CardPage, PageMeta, RawCard};
pub use deck::{Deck, DECK_SIZE};
pub use selector::{select, Selection, Strategy};
pub use tier::{ParseTierError, RegistrationOutcome, StarBudget, TournamentIds, TournamentTier};
