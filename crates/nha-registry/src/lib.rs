//! # nha-registry
//!
//! Agent registry model, snapshots, and self-healing.
//!
//! The registry is the catalog of non-human agent identities and their
//! declared capabilities, a YAML document owned outside this pipeline.
//! Every stage reads it; only the self-healing checker in this crate may
//! write it, and only to restore a known-good snapshot.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use nha_registry::{check_registry, load_registry, CheckOptions};
//!
//! let registry = load_registry("agents.yaml").unwrap();
//! assert!(registry.find("nha:crawler-01").is_some());
//!
//! let report = check_registry(
//!     "agents.yaml",
//!     "out/registry.json",
//!     &CheckOptions { check_signature: true, auto_reload: false },
//! )
//! .unwrap();
//! println!("{}", report.state);
//! ```

pub mod error;
pub mod heal;
pub mod model;
pub mod store;

pub use error::RegistryError;
pub use heal::{
    check_registry, load_backup, save_backup, CheckOptions, CheckReport, HealthState,
    RegistryBackup,
};
pub use model::{AgentRegistryEntry, Capability, Registry};
pub use store::{load_registry, registry_digest, save_registry_atomic};
