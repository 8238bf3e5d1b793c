//! Application lifecycle: window creation and event routing.
//!
//! [`App`] implements winit's [`ApplicationHandler`] and owns everything
//! with window lifetime: the window handle, the board widget, and the last
//! known cursor position. The board itself is created lazily in
//! [`resumed`](ApplicationHandler::resumed), because a rendering surface
//! needs a live window.
//!
//! # Event flow
//!
//! ```text
//! Resized          -> board.resize() -> request_redraw()
//! CursorMoved      -> remember cursor position
//! MouseInput(left) -> board.handle_click(cursor) -> request_redraw()
//! RedrawRequested  -> board.draw()
//! CloseRequested   -> exit event loop
//! ```

use crate::assets::IconSet;
use crate::board::{Board, DEFAULT_SQUARE_SIZE};
use crate::position::{Position, COLS, ROWS};
use crate::renderer::wgpu_renderer::WgpuRenderer;
use std::cell::RefCell;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};

/// Root application state driven by the winit event loop.
pub struct App {
    /// Shared piece arrangement, injected at startup and handed to the board
    position: Arc<RefCell<Position>>,

    /// Composited piece bitmaps, prepared before the event loop starts
    icons: IconSet,

    /// Handle to the application window, `None` until `resumed`
    window: Option<Arc<Window>>,

    /// The board widget, `None` until `resumed`
    board: Option<Board>,

    /// Last cursor position reported by `CursorMoved`, used when a click
    /// arrives
    cursor: PhysicalPosition<f64>,
}

impl App {
    pub fn new(position: Arc<RefCell<Position>>, icons: IconSet) -> Self {
        Self {
            position,
            icons,
            window: None,
            board: None,
            cursor: PhysicalPosition::new(0.0, 0.0),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Only initialize once
        if self.board.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title("Chess Board")
            .with_inner_size(LogicalSize::new(
                (COLS as u32 * DEFAULT_SQUARE_SIZE) as f64,
                (ROWS as u32 * DEFAULT_SQUARE_SIZE) as f64,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        let renderer = pollster::block_on(WgpuRenderer::new(window.clone(), &self.icons));
        let mut board = Board::new(self.position.clone(), Box::new(renderer));

        // The actual inner size may differ from the requested logical size,
        // so compute the square size from what we really got
        let size = window.inner_size();
        board.resize((size.width, size.height));
        log::info!("window created at {}x{}", size.width, size.height);

        window.request_redraw();
        self.window = Some(window);
        self.board = Some(board);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, shutting down");
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(board) = &mut self.board {
                    board.resize((new_size.width, new_size.height));
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(board) = &mut self.board {
                    board.draw();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(board) = &mut self.board {
                    board.handle_click(self.cursor);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}
