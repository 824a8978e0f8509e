//! Request integrity checks.

mod csrf;

pub use csrf::{form_token, tokens_match, Bouncer};
