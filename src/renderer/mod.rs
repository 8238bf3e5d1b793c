use crate::board::Highlights;
use crate::position::Position;

pub mod wgpu_renderer;

/// Trait for drawing the board.
/// This abstraction allows for different rendering backends and keeps the
/// widget testable without a window or GPU.
pub trait Renderer {
    /// Draw the full board state.
    ///
    /// # Arguments
    /// * `position` - The piece arrangement to draw
    /// * `highlights` - Per-square highlight flags
    /// * `square_size` - Side length of one square in pixels
    fn draw_board(&mut self, position: &Position, highlights: &Highlights, square_size: u32);

    /// Handle window resize events.
    ///
    /// # Arguments
    /// * `new_size` - New window dimensions in pixels
    fn resize(&mut self, new_size: (u32, u32));
}
