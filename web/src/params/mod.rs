//! Typed parameters for endpoint inputs.
//!
//! JSON bodies deserialize straight into these types. Form bodies arrive as
//! `FormData` and are converted with `TryFrom`, which is where defaults and
//! field validation live.

pub(crate) mod auth;
pub(crate) mod content;
pub(crate) mod generation;
pub(crate) mod output;
