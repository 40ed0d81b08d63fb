//! # Simulated Card Authorization
//!
//! Stand-in for a payment gateway's authorization step. Only test cards
//! starting with `4000` or `5000` are accepted.
//!
//! ```text
//!  "4000 1111-2222 3333", "VISA"
//!            │
//!            ▼  strip spaces and hyphens
//!  "4000111122223333"
//!            │
//!            ├── not 13..=19 digits ──► InvalidCard
//!            ├── prefix not 4000/5000 ──► InvalidCard
//!            ▼
//!  CardAuthorization { last4: "3333", brand: "VISA" }
//! ```
//!
//! The full number is dropped here: nothing past this module ever sees it.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::validation::validate_card_brand;

/// Prefixes of the accepted test cards.
pub const TEST_CARD_PREFIXES: [&str; 2] = ["4000", "5000"];

/// Note attached to every simulated charge.
pub const SIMULATED_PAYMENT_NOTE: &str = "Simulated payment processed successfully";

/// What survives authorization: enough to show the card, not to reuse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardAuthorization {
    pub last4: String,
    pub brand: String,
}

/// Authorizes a card against the simulated processor.
pub fn authorize_test_card(card_number: &str, card_brand: &str) -> CoreResult<CardAuthorization> {
    let brand = validate_card_brand(card_brand)?;

    let digits: String = card_number
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    if digits.is_empty() {
        return Err(invalid_card("card number is required"));
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid_card("card number must contain only digits"));
    }

    if !(13..=19).contains(&digits.len()) {
        return Err(invalid_card("card number must have 13 to 19 digits"));
    }

    if !TEST_CARD_PREFIXES.iter().any(|p| digits.starts_with(p)) {
        return Err(invalid_card("card was declined by the simulated processor"));
    }

    Ok(CardAuthorization {
        last4: digits[digits.len() - 4..].to_string(),
        brand,
    })
}

/// Fresh opaque card token, e.g. `tok_3f2a…` (32 hex chars).
pub fn generate_card_token() -> String {
    format!("tok_{}", Uuid::new_v4().simple())
}

fn invalid_card(reason: &str) -> CoreError {
    CoreError::InvalidCard {
        reason: reason.to_string(),
    }
}
