//! # Network Module
//!
//! Everything that talks to a gateway node. Signing is fully offline; this
//! layer only moves finished transactions and ledger state around.
//!
//! ## Architecture
//!
//! ```text
//! gateway.rs  NetworkGateway trait, GatewayError, create_transaction
//! http.rs     HttpGateway: REST client over reqwest
//! memory.rs   MemoryGateway: in-process ledger for tests and offline use
//! ```
//!
//! ## Design Decisions
//!
//! - The gateway is a trait object seam, so the CLI and the tests can swap
//!   the live network for an in-memory ledger.
//! - `MemoryGateway` state sits behind a `parking_lot::RwLock`. Lookups
//!   outnumber submissions, and no lock is held across an `.await`.
//! - No retries and no backoff. A failed call returns its error.

pub mod gateway;
pub mod http;
pub mod memory;

pub use gateway::{create_transaction, CreateError, GatewayError, NetworkGateway};
pub use http::HttpGateway;
pub use memory::{MemoryGateway, DEFAULT_PRICE_PER_BYTE};
