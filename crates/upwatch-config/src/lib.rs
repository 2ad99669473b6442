//! upwatch-config — endpoint configuration for the upwatch monitor.
//!
//! Endpoints are declared in a YAML file as a sequence of records:
//!
//! ```yaml
//! - name: api
//!   url: https://api.example.com/healthz
//!   method: GET
//!   headers:
//!     user-agent: upwatch/0.1
//! ```
//!
//! The list is loaded once at startup and is read-only for the process
//! lifetime. Load failures are fatal.

pub mod endpoint;
pub mod error;

pub use endpoint::{Endpoint, load_endpoints};
pub use error::{ConfigError, ConfigResult};
