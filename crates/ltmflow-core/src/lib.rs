//! ltmflow core
//!
//! Idempotent apply protocol for pushing a declarative resource description
//! to a REST-managed load balancer object.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │       ltmflow CLI (orchestration caller)      │
//! └─────────────────┬────────────────────────────┘
//!                   │ ApplyTarget
//! ┌─────────────────▼────────────────────────────┐
//! │                ltmflow-core                   │
//! │  ┌──────────────┐  ┌──────────────────────┐   │
//! │  │ DesiredState │  │  ResourceIdentity    │   │
//! │  │   parsing    │  │  validation          │   │
//! │  └──────────────┘  └──────────────────────┘   │
//! │  ┌──────────────────────────────────────────┐ │
//! │  │ Reconciler: probe -> create/update/delete│ │
//! │  └──────────────────────────────────────────┘ │
//! └─────────────────┬────────────────────────────┘
//!                   │ trait Transport
//! ┌─────────────────▼────────────────────────────┐
//! │     ltmflow-icontrol (reqwest, Basic auth)    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ltmflow_core::{ApplyIntent, DesiredState, Reconciler, ResourceIdentity};
//!
//! let reconciler = Reconciler::new(client);
//! let node = ResourceIdentity::in_common("node", "host1.example.net")?;
//! let desired = DesiredState::parse("address=192.0.2.35 description=test")?;
//!
//! let result = reconciler.apply(&node, ApplyIntent::Present, Some(&desired)).await;
//! println!("changed={} {}", result.changed, result.message);
//! ```

pub mod action;
pub mod error;
pub mod identity;
pub mod reconciler;
pub mod state;
pub mod target;
pub mod transport;

// Re-exports
pub use action::{ApplyResult, Operation};
pub use error::{ApplyError, Result, TransportError};
pub use identity::{DEFAULT_PARTITION, ResourceIdentity, resolve_collection};
pub use reconciler::Reconciler;
pub use state::DesiredState;
pub use target::{ApplyIntent, ApplyTarget};
pub use transport::{Method, Request, Response, Transport};
