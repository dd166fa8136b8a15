//! Dalgi: a lightweight 2D entity framework on top of macroquad
//!
//! Everything revolves around the [`EntityGroup`]: a collection of
//! heterogeneous entities that opt into per-frame callbacks (init, update,
//! draw, input, quit...) by declaring [`Capabilities`]. The group fans events
//! out to them, keeps tag and draw-layer indexes, runs a typed message bus,
//! and defers removals to the start of the next update so nothing is removed
//! while it is being iterated.
//!
//! Around it:
//! - [`resources`] and [`level`]: sprites and entity placements from TOML or
//!   RON manifests
//! - [`ui`]: a few ready-made widgets
//! - [`app`]: a minimal macroquad host loop

pub mod app;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod group;
pub mod input;
pub mod level;
pub mod limiter;
pub mod manifest;
pub mod render;
pub mod resources;
pub mod ui;

pub use app::run_simple_main_loop;
pub use config::AppConfig;
pub use entity::{Capabilities, Capability, Context, Entity, EntityRef};
pub use error::{Error, Result};
pub use event::Event;
pub use group::{EntityGroup, Handled, Message, MessageId, WeakGroup, DEFAULT_DRAW_LAYER};
pub use render::{MacroquadRenderer, Renderer};
pub use resources::{Resources, Sprite};
