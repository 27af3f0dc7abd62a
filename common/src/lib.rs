pub mod bench;
pub mod error;
pub mod group;
pub mod plot;
pub mod render;
pub mod setting;
