//! Vault Secret Sync Library
//!
//! One-shot mirroring of HashiCorp Vault KV secrets into Kubernetes `Opaque`
//! Secrets. The binary in `main.rs` wires the pieces together; everything with
//! decision logic lives here so it can be tested without a cluster.
//!
//! - [`source`]: Vault REST client (token / AppRole auth, list, read)
//! - [`store`]: Kubernetes Secret store (get, create, replace)
//! - [`reconciler`]: list → read → transform → upsert driver
//! - [`config`] / [`cli`]: environment and flag handling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vault_secret_sync::prelude::*;
//!
//! let reconciler = Reconciler::new(source, store, config.plan());
//! let report = reconciler.run().await?;
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod reconciler;
pub mod source;
pub mod store;
