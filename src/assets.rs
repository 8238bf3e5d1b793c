//! Piece icon loading and compositing.
//!
//! Square backgrounds and piece artwork are baked together before the window
//! opens: every piece icon is composited over a solid background in each of
//! the three square shades, then shrunk to its on-board size. Rendering later
//! only ever looks bitmaps up, it never touches image data again.
//!
//! # Assets
//!
//! Twelve PNG files are loaded from disk at startup, one per piece:
//! `img/{black,white}_{king,queen,rook,knight,bishop,pawn}.png`. Source art
//! is expected at 100x100 with a transparent background. A missing or
//! unreadable file is a fatal startup error.
//!
//! # Usage
//!
//! ```ignore
//! use chess_board::assets::{IconSet, Shade, ICON_DIR};
//! use chess_board::position::{Color, Kind, Piece};
//!
//! let icons = IconSet::load(std::path::Path::new(ICON_DIR))?;
//! let white_king = Piece::new(Color::White, Kind::King);
//! let bitmap = icons.get(Shade::Light, white_king);
//! ```

use crate::position::{Color, Kind, Piece, Square};
use anyhow::Context;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::Path;

/// Directory the piece artwork is loaded from, relative to the working
/// directory.
pub const ICON_DIR: &str = "img";

/// Side length of the solid background the source art is composited onto.
pub const BACKGROUND_SIZE: u32 = 100;

/// Side length of the finished on-board icon.
pub const ICON_SIZE: u32 = 32;

/// The three ways a square can be filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shade {
    Light,
    Dark,
    Highlight,
}

impl Shade {
    pub const ALL: [Shade; 3] = [Shade::Light, Shade::Dark, Shade::Highlight];

    /// The fill color of this shade, fully opaque.
    pub fn rgba(self) -> Rgba<u8> {
        match self {
            Shade::Light => Rgba([0xFF, 0xDE, 0xAD, 0xFF]),
            Shade::Dark => Rgba([0xCD, 0x85, 0x3F, 0xFF]),
            Shade::Highlight => Rgba([0xFF, 0xFF, 0x00, 0xFF]),
        }
    }

    /// The shade a square is drawn with. The top-left square is light and
    /// colors alternate in both directions; a highlight overrides both.
    pub fn of_square(square: Square, highlighted: bool) -> Shade {
        if highlighted {
            Shade::Highlight
        } else if (square.row + square.col) % 2 == 0 {
            Shade::Light
        } else {
            Shade::Dark
        }
    }
}

/// File name of the source artwork for a piece, e.g. `white_king.png`.
pub fn icon_file_name(piece: Piece) -> String {
    let color = match piece.color {
        Color::White => "white",
        Color::Black => "black",
    };
    let kind = match piece.kind {
        Kind::King => "king",
        Kind::Queen => "queen",
        Kind::Rook => "rook",
        Kind::Knight => "knight",
        Kind::Bishop => "bishop",
        Kind::Pawn => "pawn",
    };
    format!("{}_{}.png", color, kind)
}

/// Composite a piece icon over a solid shade-colored background and shrink
/// it to the on-board size. The result is fully opaque, so an icon drawn on
/// a square of the same shade blends in seamlessly.
pub fn composite(icon: &RgbaImage, shade: Shade) -> RgbaImage {
    let mut square = RgbaImage::from_pixel(BACKGROUND_SIZE, BACKGROUND_SIZE, shade.rgba());

    if icon.dimensions() == (BACKGROUND_SIZE, BACKGROUND_SIZE) {
        imageops::overlay(&mut square, icon, 0, 0);
    } else {
        // Source art in an unexpected size is scaled to fit the background.
        let scaled = imageops::resize(icon, BACKGROUND_SIZE, BACKGROUND_SIZE, FilterType::CatmullRom);
        imageops::overlay(&mut square, &scaled, 0, 0);
    }

    let mut out = imageops::resize(&square, ICON_SIZE, ICON_SIZE, FilterType::CatmullRom);
    for pixel in out.pixels_mut() {
        pixel[3] = u8::MAX;
    }
    out
}

/// Pre-rendered piece bitmaps, one per `(Shade, Piece)` combination.
///
/// Built once at startup and immutable afterwards; 3 shades x 12 pieces
/// gives 36 entries.
#[derive(Debug)]
pub struct IconSet {
    icons: HashMap<(Shade, Piece), RgbaImage>,
}

impl IconSet {
    /// Load the twelve piece PNGs from `dir` and composite each against all
    /// three shades.
    ///
    /// # Errors
    ///
    /// Fails if any source file is missing or not decodable, naming the
    /// offending path.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let mut icons = HashMap::new();

        for color in Color::ALL {
            for kind in Kind::ALL {
                let piece = Piece::new(color, kind);
                let path = dir.join(icon_file_name(piece));
                let img = image::open(&path)
                    .with_context(|| format!("failed to load piece icon {}", path.display()))?
                    .to_rgba8();

                for shade in Shade::ALL {
                    icons.insert((shade, piece), composite(&img, shade));
                }
            }
        }

        log::info!("prepared {} piece icons from {}", icons.len(), dir.display());
        Ok(Self { icons })
    }

    pub fn get(&self, shade: Shade, piece: Piece) -> Option<&RgbaImage> {
        self.icons.get(&(shade, piece))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Shade, Piece), &RgbaImage)> {
        self.icons.iter()
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chess-board-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_blank_icons(dir: &Path) {
        let blank = RgbaImage::from_pixel(BACKGROUND_SIZE, BACKGROUND_SIZE, Rgba([0, 0, 0, 0]));
        for color in Color::ALL {
            for kind in Kind::ALL {
                let piece = Piece::new(color, kind);
                blank.save(dir.join(icon_file_name(piece))).unwrap();
            }
        }
    }

    #[test]
    fn test_shade_of_square() {
        assert_eq!(Shade::of_square(Square::new(0, 0), false), Shade::Light);
        assert_eq!(Shade::of_square(Square::new(0, 1), false), Shade::Dark);
        assert_eq!(Shade::of_square(Square::new(1, 0), false), Shade::Dark);
        assert_eq!(Shade::of_square(Square::new(7, 7), false), Shade::Light);
        assert_eq!(Shade::of_square(Square::new(0, 0), true), Shade::Highlight);
        assert_eq!(Shade::of_square(Square::new(0, 1), true), Shade::Highlight);
    }

    #[test]
    fn test_icon_file_names() {
        assert_eq!(
            icon_file_name(Piece::new(Color::White, Kind::King)),
            "white_king.png"
        );
        assert_eq!(
            icon_file_name(Piece::new(Color::Black, Kind::Pawn)),
            "black_pawn.png"
        );
    }

    #[test]
    fn test_composite_transparent_source_keeps_shade() {
        let transparent = RgbaImage::from_pixel(BACKGROUND_SIZE, BACKGROUND_SIZE, Rgba([0, 0, 0, 0]));

        for shade in Shade::ALL {
            let out = composite(&transparent, shade);
            assert_eq!(out.dimensions(), (ICON_SIZE, ICON_SIZE));
            for pixel in out.pixels() {
                assert_eq!(*pixel, shade.rgba());
            }
        }
    }

    #[test]
    fn test_composite_opaque_source_covers_shade() {
        let blue = Rgba([0, 0, 255, 255]);
        let solid = RgbaImage::from_pixel(BACKGROUND_SIZE, BACKGROUND_SIZE, blue);

        let out = composite(&solid, Shade::Dark);
        for pixel in out.pixels() {
            assert_eq!(*pixel, blue);
        }
    }

    #[test]
    fn test_composite_is_opaque() {
        let ghost = RgbaImage::from_pixel(BACKGROUND_SIZE, BACKGROUND_SIZE, Rgba([10, 20, 30, 128]));

        let out = composite(&ghost, Shade::Light);
        for pixel in out.pixels() {
            assert_eq!(pixel[3], u8::MAX);
        }
    }

    #[test]
    fn test_composite_normalizes_source_size() {
        let tiny = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));

        let out = composite(&tiny, Shade::Highlight);
        assert_eq!(out.dimensions(), (ICON_SIZE, ICON_SIZE));
        for pixel in out.pixels() {
            assert_eq!(*pixel, Shade::Highlight.rgba());
        }
    }

    #[test]
    fn test_load_builds_all_combinations() {
        let dir = fixture_dir("load");
        write_blank_icons(&dir);

        let icons = IconSet::load(&dir).unwrap();
        assert_eq!(icons.len(), 36);
        assert!(!icons.is_empty());

        for color in Color::ALL {
            for kind in Kind::ALL {
                for shade in Shade::ALL {
                    assert!(icons.get(shade, Piece::new(color, kind)).is_some());
                }
            }
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = fixture_dir("missing");

        let err = IconSet::load(&dir).unwrap_err();
        assert!(
            err.to_string().contains("white_king.png"),
            "error should name the missing file: {}",
            err
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
