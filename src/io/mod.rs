//! Data plumbing: historical input, synthetic demo data, and table export.

pub mod export;
/// Historical catalog loading.
pub mod history;
pub mod synthetic;
