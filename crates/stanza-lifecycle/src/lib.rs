//! Stanza lifecycle — the transition engine for the multi-tenant content
//! platform.
//!
//! The machine is data-driven: `Action` carries the full edge table
//! (allowed source statuses, target status, minimum role, org-match rule),
//! and every operation runs the same ordered guard pipeline before any
//! write. The repository is a port; the bundled in-memory adapter enforces
//! the scope+slug constraint and the version compare-and-write atomically
//! under its write lock, which is the same contract a production adapter
//! must provide at the storage layer.

pub mod action;
pub mod engine;
pub mod guards;
pub mod memory;
pub mod repository;
pub mod uniqueness;

pub use action::Action;
pub use engine::{
    CreateOutcome, LifecycleEngine, TransitionOutcome, TransitionRecord, UpdateOutcome,
};
pub use memory::InMemoryRepository;
pub use repository::EntityRepository;
pub use uniqueness::{check_duplicates, DuplicateCheck, Scope};
