//! Bearer credentials tried in order of preference.

use crate::Client;

/// A player account to register.
#[derive(Clone, Debug)]
pub struct Account {
    /// Name used in log output.
    pub label: String,
    /// Wallet address that owns the cards.
    pub wallet: String,
    /// Statically supplied bearer token.
    pub token: String,
}

/// Ordered, de-duplicated list of bearer tokens.
///
/// The first entry is used until the service rejects it; each rejection moves to the next
/// distinct token. Empty tokens are never included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    chain: Vec<String>,
}

impl Credentials {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        let mut chain: Vec<String> = Vec::new();
        for token in tokens {
            if !token.is_empty() && !chain.contains(&token) {
                chain.push(token);
            }
        }
        Self { chain }
    }

    /// Session-derived token first, then the account's static token.
    pub fn resolve(client: &Client, account: &Account) -> Self {
        Self::new(client.session_token().into_iter().chain([account.token.clone()]))
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn cursor(&self) -> CredentialCursor<'_> {
        CredentialCursor {
            chain: &self.chain,
            index: 0,
        }
    }
}

/// Position within a [Credentials] chain for one request sequence.
#[derive(Clone, Debug)]
pub struct CredentialCursor<'a> {
    chain: &'a [String],
    index: usize,
}

impl<'a> CredentialCursor<'a> {
    pub fn current(&self) -> Option<&'a str> {
        self.chain.get(self.index).map(String::as_str)
    }

    /// Move to the next credential. Returns `false` once the chain is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.index + 1 < self.chain.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(token: &str) -> Account {
        Account {
            label: "1".to_string(),
            wallet: "0xabc".to_string(),
            token: token.to_string(),
        }
    }

    #[test]
    fn test_chain_skips_empty_and_duplicate_tokens() {
        let credentials = Credentials::new(["a".to_string(), String::new(), "a".to_string()]);
        assert_eq!(credentials.len(), 1);

        let mut cursor = credentials.cursor();
        assert_eq!(cursor.current(), Some("a"));
        assert!(!cursor.advance());
        assert_eq!(cursor.current(), Some("a"));
    }

    #[test]
    fn test_cursor_walks_chain_once() {
        let credentials = Credentials::new(["session".to_string(), "static".to_string()]);
        let mut cursor = credentials.cursor();
        assert_eq!(cursor.current(), Some("session"));
        assert!(cursor.advance());
        assert_eq!(cursor.current(), Some("static"));
        assert!(!cursor.advance());
    }

    #[test]
    fn test_empty_chain() {
        let credentials = Credentials::default();
        assert!(credentials.is_empty());
        assert_eq!(credentials.cursor().current(), None);
    }

    #[test]
    fn test_resolve_prefers_session_token() {
        let client = Client::new("https://api.example.com").unwrap();
        let credentials = Credentials::resolve(&client, &account("static"));
        assert_eq!(credentials.cursor().current(), Some("static"));
        assert_eq!(credentials.len(), 1);

        client.set_session_token("session");
        let credentials = Credentials::resolve(&client, &account("static"));
        let mut cursor = credentials.cursor();
        assert_eq!(cursor.current(), Some("session"));
        assert!(cursor.advance());
        assert_eq!(cursor.current(), Some("static"));

        let credentials = Credentials::resolve(&client, &account("session"));
        assert_eq!(credentials.len(), 1);
    }
}
