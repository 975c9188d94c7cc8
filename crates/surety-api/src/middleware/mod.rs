//! Request middleware mounted on the `/v1` router.

pub mod metrics;
pub mod rate_limit;
