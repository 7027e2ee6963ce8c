pub mod augment;
pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod font;
pub mod geometry;
pub mod layout;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod seed;
pub mod style;
pub mod transform;
