//! Trip Planner - client-side session state for an itinerary planning backend
//!
//! Holds the itinerary a user sees, merges places arriving from chat, search,
//! manual edits and backend confirmations into one consistent view, and keeps
//! the start/end anchors and optimization results in step with the backend.
//!
//! # Core Concepts
//!
//! - **Backend is truth**: every confirmed payload replaces the local itinerary
//! - **Suggestions append**: chat and search results merge in without coordinate duplicates
//! - **Single owner**: one store actor holds the itinerary; everything else sends commands
//! - **Optimistic reorder**: drag reorders show at once and are confirmed in the background
//!
//! # Modules
//!
//! - [`domain`] - Place, itinerary and optimization types
//! - [`backend`] - Backend trait and HTTP implementation
//! - [`state`] - Store actor owning the itinerary
//! - [`reconcile`] - Replace/append merging and de-duplication
//! - [`roles`] - Start/end role assignment
//! - [`projector`] - Optimization response projection
//! - [`planner`] - Intent dispatch and notices
//! - [`repl`] - Interactive shell
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod backend;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod planner;
pub mod projector;
pub mod reconcile;
pub mod repl;
pub mod roles;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use backend::{BackendError, HttpBackend, PlacesBackend, create_backend};
pub use config::Config;
pub use domain::{Algorithm, Field, OptimizeResult, OptimizeStats, Place, PlacesData, Role};
pub use error::PlanError;
pub use planner::{Intent, Notice, NoticeLevel, Outcome, Planner, Precondition};
pub use roles::{Anchor, RoleAssigner};
pub use session::SessionIdFile;
pub use state::{SessionStore, Snapshot, StoreEvent};
