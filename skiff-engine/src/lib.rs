//! # skiff-engine
//!
//! The synchronization and promotion core. Call [`deploy`] to reconcile
//! a local directory tree against an environment's bucket, or
//! [`promote`] to mirror one environment's bucket into another without
//! touching local disk. The planners ([`reconcile::plan_deploy`],
//! [`promote::plan_promote`]) are pure functions over explicit input
//! sets; only the executors perform destructive operations, and only
//! through the [`skiff_store`] capability traits.

pub mod content_type;
pub mod deploy;
pub mod enumerate;
pub mod error;
pub mod filter;
pub mod hash;
pub mod invalidate;
pub mod promote;
pub mod reconcile;
pub mod remote;

pub use deploy::{deploy, DeployReport};
pub use error::SyncError;
pub use hash::LocalFile;
pub use promote::{plan_promote, promote, PromotePlan, PromoteReport};
pub use reconcile::{plan_deploy, Decision, DeployPlan};
