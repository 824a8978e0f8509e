//! Core domain model types for writedesk.
//!
//! This module contains the fundamental types used throughout the editor:
//! - Article status and the persisted article record
//! - Submitted form fields and editor steps
//! - Feedback messages and acting principals

mod article;
mod fields;
mod message;
mod principal;
mod status;
mod step;

pub use article::Article;
pub use fields::{article_vars, names, FormFields};
pub use message::{Message, Severity};
pub use principal::{generate_nonce, Principal, Privilege};
pub use status::ArticleStatus;
pub use step::Step;
