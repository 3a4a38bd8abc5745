//! Input validation for extension identifiers and search terms

use regex::Regex;

use crate::error::{QueueError, QueueResult};

pub const MIN_IDENTIFIER_LEN: usize = 3;
pub const MIN_SEARCH_TERM_LEN: usize = 2;

lazy_static::lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z0-9-]+\.[A-Za-z0-9-]+$").unwrap();
}

/// `publisher.extension-name`
pub fn validate_identifier(identifier: &str) -> QueueResult<()> {
    if identifier.chars().count() < MIN_IDENTIFIER_LEN {
        return Err(QueueError::Validation(
            "Identifier must be at least 3 characters long.".to_string(),
        ));
    }
    if !IDENTIFIER_RE.is_match(identifier) {
        return Err(QueueError::Validation(
            "Invalid format. Use \"publisher.extension-name\".".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_search_term(term: &str) -> QueueResult<()> {
    if term.chars().count() < MIN_SEARCH_TERM_LEN {
        return Err(QueueError::Validation(
            "Search term must be at least 2 characters.".to_string(),
        ));
    }
    Ok(())
}
