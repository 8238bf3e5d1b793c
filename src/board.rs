use crate::position::{Position, Square, COLS, ROWS};
use crate::renderer::Renderer;
use std::cell::RefCell;
use std::sync::Arc;
use winit::dpi::PhysicalPosition;

/// Square side length the board starts with before the first resize event,
/// in pixels. The initial window is sized to fit 8 of these.
pub const DEFAULT_SQUARE_SIZE: u32 = 64;

/// What the widget currently has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// No square is selected; the next click selects one.
    Idle,

    /// A square is selected; the next click relocates its piece.
    Selected(Square),
}

/// Per-square highlight flags, independent of the piece grid.
///
/// At most one flag is ever set in practice: selecting a square resets the
/// whole grid and raises only the new square's flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlights {
    flags: [bool; ROWS * COLS],
}

impl Highlights {
    pub fn new() -> Self {
        Self {
            flags: [false; ROWS * COLS],
        }
    }

    pub fn is_set(&self, square: Square) -> bool {
        self.flags[square.index()]
    }

    /// Reset every flag, then raise only `square`.
    pub fn set_only(&mut self, square: Square) {
        self.flags = [false; ROWS * COLS];
        self.flags[square.index()] = true;
    }

    pub fn clear(&mut self, square: Square) {
        self.flags[square.index()] = false;
    }
}

impl Default for Highlights {
    fn default() -> Self {
        Self::new()
    }
}

/// Board widget: owns the rendering backend, selection, and highlight state,
/// and relocates pieces in the shared position grid on clicks.
///
/// # Architecture
///
/// The piece arrangement is owned outside the widget and injected as
/// `Arc<RefCell<Position>>`; the widget reads it when drawing and writes it
/// directly when relocating pieces. Selection state and the highlight grid
/// are owned exclusively by the widget. Rendering goes through the
/// [`Renderer`] trait so the widget can be tested without a window.
///
/// # Click handling
///
/// A click selects the clicked square and highlights it. While a square is
/// selected, the next click first relocates whatever piece sits on the
/// selected square to the clicked square, unconditionally: there is no
/// legality checking, no turn order, and whatever occupied the destination
/// is silently overwritten. Clicking the selected square itself returns the
/// widget to idle. No validation of any kind is performed.
///
/// # Thread safety and borrowing
///
/// All access happens on the main thread (winit event loop). Borrows of the
/// shared position are kept inside single methods and never held across
/// calls.
///
/// # Usage
///
/// ```rust,ignore
/// let position = Arc::new(RefCell::new(Position::starting()));
/// let mut board = Board::new(position.clone(), Box::new(renderer));
///
/// // In the event loop:
/// board.resize((width, height));
/// board.handle_click(cursor_position);
/// board.draw();
/// ```
pub struct Board {
    /// Shared piece arrangement, created and owned by the caller
    position: Arc<RefCell<Position>>,

    /// Renderer responsible for drawing the board
    renderer: Box<dyn Renderer>,

    /// Current selection state
    selection: Selection,

    /// Per-square highlight flags
    highlights: Highlights,

    /// Side length of one square in pixels, recomputed on every resize
    square_size: u32,
}

impl Board {
    /// Create a widget over a shared position with the default square size.
    pub fn new(position: Arc<RefCell<Position>>, renderer: Box<dyn Renderer>) -> Self {
        Self::with_square_size(position, renderer, DEFAULT_SQUARE_SIZE)
    }

    /// Create a widget with an explicit initial square size in pixels.
    pub fn with_square_size(
        position: Arc<RefCell<Position>>,
        renderer: Box<dyn Renderer>,
        square_size: u32,
    ) -> Self {
        Self {
            position,
            renderer,
            selection: Selection::Idle,
            highlights: Highlights::new(),
            square_size,
        }
    }

    // ===========================
    // State access
    // ===========================

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    /// Current square side length in pixels.
    pub fn square_size(&self) -> u32 {
        self.square_size
    }

    // ===========================
    // UI Interaction
    // ===========================

    /// Convert a pixel position to the square under it.
    ///
    /// # Returns
    ///
    /// * `Some(Square)` - if the position falls inside the tiled 8x8 area
    /// * `None` - outside the board, or while the square size is degenerate
    ///   (zero after a tiny resize)
    pub fn square_at(&self, pos: PhysicalPosition<f64>) -> Option<Square> {
        if self.square_size == 0 {
            return None;
        }

        let col = (pos.x / self.square_size as f64).floor();
        let row = (pos.y / self.square_size as f64).floor();

        if (0.0..COLS as f64).contains(&col) && (0.0..ROWS as f64).contains(&row) {
            Some(Square::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// Process a left-button press at the given pixel position.
    ///
    /// While a square is selected, the clicked square first receives the
    /// selected square's piece (see [`relocate`](Self::relocate)); then the
    /// selection toggles: clicking the selected square itself goes back to
    /// idle, anything else becomes the new selection. Clicks outside the
    /// board leave all state untouched.
    ///
    /// Clicking an occupied square twice therefore relocates its piece onto
    /// itself and then clears the origin, emptying the square. Deliberately
    /// kept: this widget does not judge moves, it executes them.
    pub fn handle_click(&mut self, pos: PhysicalPosition<f64>) {
        let clicked = match self.square_at(pos) {
            Some(square) => square,
            None => {
                log::warn!(
                    "click at ({:.0}, {:.0}) landed outside the board, ignoring",
                    pos.x,
                    pos.y
                );
                return;
            }
        };

        if let Selection::Selected(origin) = self.selection {
            self.relocate(origin, clicked);
        }

        if self.selection == Selection::Selected(clicked) {
            self.selection = Selection::Idle;
            self.highlights.clear(clicked);
        } else {
            self.selection = Selection::Selected(clicked);
            self.highlights.set_only(clicked);
        }
    }

    /// Move whatever piece sits at `origin` to `destination`, overwriting
    /// the destination. An empty origin changes nothing.
    fn relocate(&mut self, origin: Square, destination: Square) {
        let mut position = self.position.borrow_mut();

        if let Some(piece) = position[origin] {
            position[destination] = Some(piece);
            position[origin] = None;
            log::debug!("moved {} from {} to {}", piece, origin, destination);
        }
    }

    // ===========================
    // Rendering
    // ===========================

    /// Recompute the square size for a new window size and pass the resize
    /// on to the renderer.
    ///
    /// The square size is the largest integer size that tiles all 8 columns
    /// and rows inside the window: `min((w - 1) / 8, (h - 1) / 8)`.
    pub fn resize(&mut self, new_size: (u32, u32)) {
        let xsize = new_size.0.saturating_sub(1) / COLS as u32;
        let ysize = new_size.1.saturating_sub(1) / ROWS as u32;
        self.square_size = xsize.min(ysize);

        self.renderer.resize(new_size);
        log::debug!(
            "resized to {}x{}, square size is now {}",
            new_size.0,
            new_size.1,
            self.square_size
        );
    }

    /// Draw the current position, shading highlighted squares.
    pub fn draw(&mut self) {
        let position = self.position.borrow();
        self.renderer
            .draw_board(&position, &self.highlights, self.square_size);
    }
}
