//! Integration tests for the click-select-move loop
//!
//! This test suite drives the board widget the way the event loop would:
//! clicks arrive as physical cursor coordinates, resizes arrive as
//! framebuffer sizes, and every state change is observed either through
//! the shared position handle or through the draw calls the renderer
//! receives.

use chess_board::board::{Board, Highlights, Selection, DEFAULT_SQUARE_SIZE};
use chess_board::position::{Color, Kind, Piece, Position, Square};
use chess_board::renderer::Renderer;
use std::cell::RefCell;
use std::sync::Arc;
use winit::dpi::PhysicalPosition;

/// Mock renderer for testing (no actual rendering)
struct MockRenderer;

impl Renderer for MockRenderer {
    fn draw_board(&mut self, _position: &Position, _highlights: &Highlights, _square_size: u32) {}
    fn resize(&mut self, _new_size: (u32, u32)) {}
}

/// One call on the renderer, as seen from the renderer side
#[derive(Debug, Clone, PartialEq, Eq)]
enum RenderEvent {
    Draw {
        pieces: usize,
        highlighted: usize,
        square_size: u32,
    },
    Resize {
        width: u32,
        height: u32,
    },
}

/// Renderer that records every call so tests can assert on the draw stream
struct RecordingRenderer {
    events: Arc<RefCell<Vec<RenderEvent>>>,
}

impl Renderer for RecordingRenderer {
    fn draw_board(&mut self, position: &Position, highlights: &Highlights, square_size: u32) {
        let pieces = Square::all().filter(|&sq| position[sq].is_some()).count();
        let highlighted = Square::all().filter(|&sq| highlights.is_set(sq)).count();
        self.events.borrow_mut().push(RenderEvent::Draw {
            pieces,
            highlighted,
            square_size,
        });
    }

    fn resize(&mut self, new_size: (u32, u32)) {
        self.events.borrow_mut().push(RenderEvent::Resize {
            width: new_size.0,
            height: new_size.1,
        });
    }
}

/// Build a board over the given position, returning the shared handle too
fn board_with(position: Position) -> (Board, Arc<RefCell<Position>>) {
    let shared = Arc::new(RefCell::new(position));
    let board = Board::new(shared.clone(), Box::new(MockRenderer));
    (board, shared)
}

/// Build a board whose renderer records its calls into the returned log
fn recording_board_with(
    position: Position,
) -> (Board, Arc<RefCell<Position>>, Arc<RefCell<Vec<RenderEvent>>>) {
    let shared = Arc::new(RefCell::new(position));
    let events = Arc::new(RefCell::new(Vec::new()));
    let renderer = RecordingRenderer {
        events: events.clone(),
    };
    let board = Board::new(shared.clone(), Box::new(renderer));
    (board, shared, events)
}

/// Cursor coordinates at the center of a square under the board's current
/// square size
fn center_of(board: &Board, row: usize, col: usize) -> PhysicalPosition<f64> {
    let size = board.square_size() as f64;
    PhysicalPosition::new(
        col as f64 * size + size / 2.0,
        row as f64 * size + size / 2.0,
    )
}

/// Click the center of a square
fn click(board: &mut Board, row: usize, col: usize) {
    let pos = center_of(board, row, col);
    board.handle_click(pos);
}

#[test]
fn test_click_click_relocates_and_redraws() {
    println!("\n=== Test: Click-Click Relocation ===");

    let (mut board, shared, events) = recording_board_with(Position::starting());

    board.draw();
    assert_eq!(
        events.borrow().last(),
        Some(&RenderEvent::Draw {
            pieces: 32,
            highlighted: 0,
            square_size: DEFAULT_SQUARE_SIZE,
        })
    );

    // First click selects the pawn on e2 and lights its square up.
    click(&mut board, 6, 4);
    board.draw();
    assert_eq!(board.selection(), Selection::Selected(Square::new(6, 4)));
    assert_eq!(
        events.borrow().last(),
        Some(&RenderEvent::Draw {
            pieces: 32,
            highlighted: 1,
            square_size: DEFAULT_SQUARE_SIZE,
        })
    );

    // Second click relocates it, and the shared handle sees the move.
    click(&mut board, 4, 4);
    board.draw();
    {
        let position = shared.borrow();
        assert_eq!(position[Square::new(6, 4)], None);
        assert_eq!(
            position[Square::new(4, 4)],
            Some(Piece::new(Color::White, Kind::Pawn))
        );
    }
    assert_eq!(board.selection(), Selection::Selected(Square::new(4, 4)));

    println!("after move: {}", shared.borrow().to_placement());
    assert_eq!(
        shared.borrow().to_placement(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR"
    );
}

#[test]
fn test_drag_chain_keeps_moving_the_same_piece() {
    println!("\n=== Test: Drag Chain ===");

    let (mut board, shared) = board_with(Position::starting());

    // Every click while a square is selected relocates from that square,
    // so a click sequence drags one piece across the board.
    click(&mut board, 6, 4); // select e2
    click(&mut board, 4, 4); // e2 -> e4, e4 now selected
    click(&mut board, 1, 4); // e4 -> e7, replacing the black pawn

    let position = shared.borrow();
    assert_eq!(position[Square::new(6, 4)], None);
    assert_eq!(position[Square::new(4, 4)], None);
    assert_eq!(
        position[Square::new(1, 4)],
        Some(Piece::new(Color::White, Kind::Pawn))
    );
    assert_eq!(board.selection(), Selection::Selected(Square::new(1, 4)));

    println!("after chain: {}", position.to_placement());
    assert_eq!(
        position.to_placement(),
        "rnbqkbnr/ppppPppp/8/8/8/8/PPPP1PPP/RNBQKBNR"
    );

    let remaining = Square::all().filter(|&sq| position[sq].is_some()).count();
    assert_eq!(remaining, 31);
}

#[test]
fn test_blocked_paths_are_not_checked() {
    println!("\n=== Test: No Path Checking ===");

    let (mut board, shared) = board_with(Position::starting());

    // The rook on a1 "jumps" straight over its own pawn. The widget does
    // not judge moves, it executes them.
    click(&mut board, 7, 0);
    click(&mut board, 3, 0);

    let position = shared.borrow();
    assert_eq!(
        position[Square::new(3, 0)],
        Some(Piece::new(Color::White, Kind::Rook))
    );
    assert_eq!(position[Square::new(7, 0)], None);
    assert_eq!(
        position[Square::new(6, 0)],
        Some(Piece::new(Color::White, Kind::Pawn))
    );
}

#[test]
fn test_lone_pawn_walkthrough() {
    println!("\n=== Test: Lone Pawn Walkthrough ===");

    let start = Position::from_placement("8/8/8/8/8/8/4P3/8").unwrap();
    let (mut board, shared, events) = recording_board_with(start);

    // Selecting an empty square and clicking it again is a clean deselect.
    click(&mut board, 4, 4);
    assert_eq!(board.selection(), Selection::Selected(Square::new(4, 4)));
    click(&mut board, 4, 4);
    assert_eq!(board.selection(), Selection::Idle);
    assert_eq!(shared.borrow().to_placement(), "8/8/8/8/8/8/4P3/8");

    // Pick the pawn up and walk it to the center.
    click(&mut board, 6, 4);
    click(&mut board, 4, 4);
    board.draw();
    println!("after move: {}", shared.borrow().to_placement());
    assert_eq!(shared.borrow().to_placement(), "8/8/8/8/4P3/8/8/8");
    assert_eq!(
        events.borrow().last(),
        Some(&RenderEvent::Draw {
            pieces: 1,
            highlighted: 1,
            square_size: DEFAULT_SQUARE_SIZE,
        })
    );

    // Clicking the selected, occupied square relocates it onto itself,
    // which deletes the piece. Kept from the widget's move semantics.
    click(&mut board, 4, 4);
    board.draw();
    assert_eq!(board.selection(), Selection::Idle);
    assert_eq!(shared.borrow().to_placement(), "8/8/8/8/8/8/8/8");
    assert_eq!(
        events.borrow().last(),
        Some(&RenderEvent::Draw {
            pieces: 0,
            highlighted: 0,
            square_size: DEFAULT_SQUARE_SIZE,
        })
    );
}

#[test]
fn test_resize_then_click_uses_new_square_size() {
    println!("\n=== Test: Resize Then Click ===");

    let (mut board, _shared, events) = recording_board_with(Position::starting());

    board.resize((401, 401));
    assert_eq!(board.square_size(), 50);
    assert_eq!(
        events.borrow().last(),
        Some(&RenderEvent::Resize {
            width: 401,
            height: 401,
        })
    );

    // At 50 px per square this lands on (0, 6); at the default 64 px it
    // would have been (0, 5).
    board.handle_click(PhysicalPosition::new(325.0, 25.0));
    assert_eq!(board.selection(), Selection::Selected(Square::new(0, 6)));

    board.draw();
    assert_eq!(
        events.borrow().last(),
        Some(&RenderEvent::Draw {
            pieces: 32,
            highlighted: 1,
            square_size: 50,
        })
    );

    // Shrink until the board spans only 160 px; a click past the edge is
    // ignored and the selection stays where it was.
    board.resize((161, 161));
    assert_eq!(board.square_size(), 20);
    board.handle_click(PhysicalPosition::new(300.0, 80.0));
    assert_eq!(board.selection(), Selection::Selected(Square::new(0, 6)));
}

#[test]
fn test_external_position_edits_are_picked_up() {
    println!("\n=== Test: Shared Position Handle ===");

    let (mut board, shared) = board_with(Position::empty());

    // The position is shared state; whoever holds the handle can edit it
    // and the widget operates on what is there now.
    shared.borrow_mut()[Square::new(3, 3)] = Some(Piece::new(Color::Black, Kind::Queen));

    click(&mut board, 3, 3);
    click(&mut board, 0, 0);

    let position = shared.borrow();
    assert_eq!(position[Square::new(3, 3)], None);
    assert_eq!(
        position[Square::new(0, 0)],
        Some(Piece::new(Color::Black, Kind::Queen))
    );
}
