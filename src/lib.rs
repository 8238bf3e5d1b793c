pub mod app;
pub mod assets;
pub mod board;
pub mod position;
pub mod renderer;
