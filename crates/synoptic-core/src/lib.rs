// Shared foundation: configuration, time, and the resilient data-access layer
// every service fetch goes through.

pub mod access;
pub mod clock;
pub mod config;

pub use access::{DataAccess, DataStatus, RetryPolicy, ServiceResponse};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{load_config, Config, ConfigError};
