//! # Drive Search Client
//!
//! Session and workflow orchestration for a Drive semantic search backend.
//!
//! The backend lists a user's text and markdown files, ingests them into a
//! search index, and answers semantic queries. This crate is the client
//! side: it tracks who is signed in, decides which screen a location may
//! show, and drives the three long-running backend calls through a shared
//! state machine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌────────────────────┐
//! │ SessionStore │───▶│ Navigation   │───▶│ Screens            │
//! │ (identity)   │    │ Guard        │    │ Dashboard / Search │
//! └──────┬───────┘    └──────────────┘    └─────────┬──────────┘
//!        │                                          │
//!        │            ┌──────────────────────┐      │
//!        └───────────▶│ Backend (HTTP/fake)  │◀─────┘
//!                     └──────────────────────┘   via WorkflowController
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Backend data types |
//! | [`error`] | Classified workflow failures |
//! | [`backend`] | Backend trait and HTTP implementation |
//! | [`session`] | Session store and identity probe |
//! | [`guard`] | Route table and navigation guard |
//! | [`workflow`] | Generic async workflow controller |
//! | [`actions`] | List, ingest and search actions |
//! | [`dashboard`] | Dashboard screen |
//! | [`search`] | Search screen |
//! | [`navbar`] | Navigation bar view model |
//! | [`app`] | Application shell |
//! | [`logging`] | Tracing setup |

pub mod actions;
pub mod app;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod logging;
pub mod models;
pub mod navbar;
pub mod search;
pub mod session;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
