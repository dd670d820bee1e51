pub mod core {
	pub mod canvas;
	pub mod color;
	pub mod error;
	pub mod renderer;
	pub mod state;
	pub mod surface;
	pub mod terminal;
}

pub mod client {
	pub mod sse;
	pub mod stream;
}

pub mod cli;
pub mod viewer;

// Re-export for convenience
pub use crate::core::renderer::{Renderer, RendererConfig};
pub use crate::core::state::{GameState, Player, Tile};
