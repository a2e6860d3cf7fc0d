//! Maps a user id to the name of the table holding that user's transactions.
//!
//! Every user gets a dedicated `transactions_<user_id>` table. Only ids made of
//! ASCII letters, digits, `_` and `-` can name a table, which keeps the derived
//! name a valid quoted identifier that fits PostgreSQL's 63 byte limit together
//! with the suffixes of its indexes.

use thiserror::Error;

pub const TABLE_PREFIX: &str = "transactions_";
pub const MAX_USER_ID_LEN: usize = 40;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("User id {0:?} cannot name a transaction table")]
pub struct InvalidUserId(pub String);

/// Handle to a user's transaction table. The table itself may not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionTable {
    user_id: String,
    name: String,
}

impl TransactionTable {
    /// Derives the table for `user_id`. The same id always resolves to the same table.
    pub fn resolve(user_id: &str) -> Result<TransactionTable, InvalidUserId> {
        if !is_valid_user_id(user_id) {
            return Err(InvalidUserId(user_id.to_owned()));
        }

        Ok(TransactionTable {
            user_id: user_id.to_owned(),
            name: format!("{}{}", TABLE_PREFIX, user_id),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table name as a double quoted SQL identifier
    pub fn quoted_name(&self) -> String {
        format!("\"{}\"", self.name)
    }
}

pub fn is_valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id.len() <= MAX_USER_ID_LEN
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::{is_valid_user_id, InvalidUserId, TransactionTable, MAX_USER_ID_LEN};
    use rstest::rstest;

    #[test]
    fn resolve_is_deterministic() {
        let first = TransactionTable::resolve("42").unwrap();
        let second = TransactionTable::resolve("42").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.name(), "transactions_42");
        assert_eq!(first.user_id(), "42");
        assert_eq!(first.quoted_name(), "\"transactions_42\"");
    }

    #[test]
    fn case_is_preserved() {
        let upper = TransactionTable::resolve("Alice").unwrap();
        let lower = TransactionTable::resolve("alice").unwrap();

        assert_ne!(upper.name(), lower.name());
    }

    #[rstest]
    #[case::empty("")]
    #[case::quote("bob\"; DROP TABLE users; --")]
    #[case::space("bob smith")]
    #[case::dot("bob.smith")]
    #[case::unicode("бюджет")]
    fn rejects_unsafe_ids(#[case] user_id: &str) {
        assert_eq!(
            TransactionTable::resolve(user_id),
            Err(InvalidUserId(user_id.to_owned()))
        );
    }

    #[test]
    fn length_limit() {
        let longest = "a".repeat(MAX_USER_ID_LEN);
        assert!(is_valid_user_id(&longest));

        let too_long = "a".repeat(MAX_USER_ID_LEN + 1);
        assert!(!is_valid_user_id(&too_long));
    }
}
