//! Card records as returned by the card listing endpoint and their normalized form.

use serde::Deserialize;
use serde_json::Value;

/// Name and handle used when neither the card nor its hero carries one.
pub const UNKNOWN: &str = "Unknown";

/// A card available for deck building.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub handle: String,
    pub stars: i64,
    pub weighted_score: f64,
}

impl Card {
    pub fn new(id: impl Into<String>, stars: i64, weighted_score: f64) -> Self {
        Self {
            id: id.into(),
            name: UNKNOWN.to_string(),
            handle: UNKNOWN.to_string(),
            stars,
            weighted_score,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Weighted score per star. Zero or negative star counts count as one star.
    pub fn value_ratio(&self) -> f64 {
        self.weighted_score / self.stars.max(1) as f64
    }

    /// Name with non-ASCII characters stripped, for log output.
    pub fn ascii_name(&self) -> String {
        self.name.chars().filter(char::is_ascii).collect()
    }
}

/// A card record exactly as the listing endpoint returns it.
///
/// Every field is optional and loosely typed: the endpoint has returned numbers as strings,
/// moved fields under `heroes`, and omitted them entirely.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawCard {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub handle: Option<Value>,
    pub stars: Option<Value>,
    pub heroes: Option<Value>,
    pub card_weighted_score: Option<Value>,
    pub weighted_score: Option<Value>,
    pub is_in_deck: Option<Value>,
}

impl RawCard {
    fn hero(&self, key: &str) -> Option<&Value> {
        self.heroes
            .as_ref()
            .and_then(|heroes| heroes.get(key))
            .filter(|value| !value.is_null())
    }

    pub fn is_in_deck(&self) -> bool {
        self.is_in_deck.as_ref().is_some_and(truthy)
    }

    /// Normalize into a [Card]. Returns `None` for records without an id.
    pub fn into_card(self) -> Option<Card> {
        let id = self.id.as_ref().and_then(text)?;
        let name = self
            .name
            .as_ref()
            .or_else(|| self.hero("name"))
            .and_then(text)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let handle = self
            .handle
            .as_ref()
            .or_else(|| self.hero("handle"))
            .and_then(text)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let stars = self
            .stars
            .as_ref()
            .or_else(|| self.hero("stars"))
            .map(coerce_int)
            .unwrap_or(0);
        let weighted_score = self
            .card_weighted_score
            .as_ref()
            .or(self.weighted_score.as_ref())
            .map(coerce_score)
            .unwrap_or(0.0);
        Some(Card {
            id,
            name,
            handle,
            stars,
            weighted_score,
        })
    }
}

/// Pagination metadata of a listing page.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageMeta {
    #[serde(rename = "currentPage")]
    pub current_page: Option<Value>,
    #[serde(rename = "lastPage")]
    pub last_page: Option<Value>,
}

/// One page of the card listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CardPage {
    pub data: Option<Vec<RawCard>>,
    pub meta: Option<PageMeta>,
}

impl CardPage {
    /// True when the page carries no card records at all.
    pub fn is_empty(&self) -> bool {
        self.data.as_ref().map_or(true, Vec::is_empty)
    }

    /// True when no further page should be requested after this one.
    pub fn is_last(&self) -> bool {
        let Some(meta) = &self.meta else {
            return true;
        };
        let current = meta.current_page.as_ref().map(coerce_int).unwrap_or(0);
        let last = meta.last_page.as_ref().map(coerce_int).unwrap_or(0);
        current >= last
    }

    /// Cards on this page that are not already assigned to a deck.
    pub fn into_available(self) -> impl Iterator<Item = Card> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .filter(|raw| !raw.is_in_deck())
            .filter_map(RawCard::into_card)
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Integer view of a loosely typed value. Anything unparseable is 0.
///
/// Floats truncate toward zero and numeric strings must be integral ("5", not "5.0").
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(u) = n.as_u64() {
                i64::try_from(u).unwrap_or(i64::MAX)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
                    .unwrap_or(0)
            }
        }
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Float view of a loosely typed value. Anything unparseable or non-finite is 0.
pub fn coerce_score(value: &Value) -> f64 {
    let score = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if score.is_finite() {
        score
    } else {
        0.0
    }
}
