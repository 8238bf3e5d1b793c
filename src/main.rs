use anyhow::Context;
use chess_board::app::App;
use chess_board::assets::{IconSet, ICON_DIR};
use chess_board::position::Position;
use std::cell::RefCell;
use std::path::Path;
use std::sync::Arc;
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // All 36 icon bitmaps are prepared up front; a missing asset aborts
    // before any window exists
    let icons = IconSet::load(Path::new(ICON_DIR))
        .context("piece icons must be available before the window opens")?;

    let position = Arc::new(RefCell::new(Position::starting()));

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(position, icons);
    event_loop.run_app(&mut app)?;

    Ok(())
}
