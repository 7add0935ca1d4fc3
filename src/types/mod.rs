pub mod api;
pub mod config;
pub mod layer;
pub mod record;
pub mod view;
