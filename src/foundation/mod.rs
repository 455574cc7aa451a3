pub mod core;
pub mod error;
pub(crate) mod fingerprint;
pub(crate) mod math;
