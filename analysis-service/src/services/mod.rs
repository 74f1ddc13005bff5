//! Service-layer building blocks: image checks and the upstream transport.

pub mod image;
pub mod providers;
