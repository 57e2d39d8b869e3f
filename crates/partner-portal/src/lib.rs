//! Workflow core for the partner side of a local-business discovery portal.
//!
//! The crate covers three concerns: session management for partners and
//! administrators, the gated onboarding roadmap that ends in a one-shot
//! verification transition, and the administrator moderation queue over
//! externally submitted "Get Featured" applications. External collaborators
//! (identity check, profile store, document vault, application store) are
//! trait seams so services and tests can supply their own implementations.

pub mod config;
pub mod error;
pub mod session;
pub mod telemetry;
pub mod workflows;
