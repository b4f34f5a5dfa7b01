//! iControl REST adapter for ltmflow
//!
//! This crate connects the core reconciler to a BIG-IP style appliance
//! through its iControl REST API.
//!
//! # Features
//!
//! - [`IControlClient`]: reqwest transport with Basic authentication
//! - [`ReadinessProber`]: bounded polling until the control plane is up
//! - [`gather_facts`]: read any collection and hand it back as facts
//! - [`run_command`]: save the configuration or reboot the device
//!
//! # Example
//!
//! ```ignore
//! use ltmflow_icontrol::{ConnectionConfig, IControlClient, ReadinessConfig, ReadinessProber};
//!
//! let client = IControlClient::new(ConnectionConfig::new("192.0.2.1", "admin", password))?;
//! let readiness = ReadinessProber::new(&client, ReadinessConfig::default()).wait().await;
//! ```

pub mod client;
pub mod error;
pub mod facts;
pub mod readiness;
pub mod system;

pub use client::{ConnectionConfig, DEFAULT_API_ROOT, DEFAULT_TIMEOUT, IControlClient};
pub use error::{IControlError, Result};
pub use facts::{ITEMS_KEY, api_path, gather_facts};
pub use readiness::{Readiness, ReadinessConfig, ReadinessProber};
pub use system::{SystemCommand, run_command};
