//! Team management chat bot core.
//!
//! The crate turns raw chat messages into actions: a regex cascade and a
//! zero-shot oracle classify intent, an extractor pulls out names, teams,
//! roles, repositories and member lists, a per-user wizard drives the
//! multi-turn team-creation flow, and the router ties it all together in
//! front of a pluggable team store.
//!
//! Hosts provide the chat transport plus implementations of
//! [`nlu::OracleClassifier`], [`nlu::NerProvider`] and [`store::TeamStore`],
//! then feed every incoming [`models::Utterance`] to [`router::Router::route`].

pub mod config;
pub mod dedup;
pub mod error;
pub mod models;
pub mod nlu;
pub mod router;
pub mod store;
pub mod wizard;

pub use config::RouterConfig;
pub use error::AppError;
pub use models::{TeamPatch, TeamRecord, Utterance};
pub use router::{Action, Router};

#[cfg(test)]
mod tests;
