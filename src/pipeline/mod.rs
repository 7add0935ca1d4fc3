//! Payload → records → hour filter → map layers / alert list.

pub mod alerts;
pub mod extract;
pub mod filter;
pub mod layers;
pub mod records;

pub use records::Dataset;
