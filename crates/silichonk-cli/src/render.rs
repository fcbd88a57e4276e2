//! Terminal frame renderer.

use clap::ValueEnum;
use silichonk_core::Cell;
use silichonk_world::Grid;
use std::fmt::Write as _;
use std::io::{self, Write};

const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderMode {
    /// Print nothing; only logs are produced
    None,
    /// One glyph per cell
    Ascii,
    /// Grayscale blocks using ANSI truecolor
    Color,
}

pub struct Renderer {
    mode: RenderMode,
}

impl Renderer {
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    /// Text for one frame, including the header line
    pub fn render(&self, grid: &Grid, generation: u64) -> String {
        let mut out = String::new();
        match self.mode {
            RenderMode::None => {}
            RenderMode::Ascii => {
                let _ = writeln!(out, "generation {}", generation);
                let _ = write!(out, "{}", grid);
            }
            RenderMode::Color => {
                out.push_str(CLEAR_SCREEN);
                let _ = writeln!(out, "generation {}", generation);
                for row in grid.rows() {
                    for &cell in row {
                        push_block(&mut out, cell);
                    }
                    out.push_str(RESET);
                    out.push('\n');
                }
            }
        }
        out
    }

    pub fn draw(&self, grid: &Grid, generation: u64) -> io::Result<()> {
        if self.mode == RenderMode::None {
            return Ok(());
        }
        let frame = self.render(grid, generation);
        let mut stdout = io::stdout().lock();
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()
    }
}

fn push_block(out: &mut String, cell: Cell) {
    let v = cell.intensity();
    let _ = write!(out, "\x1b[48;2;{v};{v};{v}m  ");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        "E S\nD E".parse().unwrap()
    }

    #[test]
    fn test_ascii_frame() {
        let frame = Renderer::new(RenderMode::Ascii).render(&sample(), 3);
        assert_eq!(frame, "generation 3\n.S\nD.\n");
    }

    #[test]
    fn test_none_renders_nothing() {
        let renderer = Renderer::new(RenderMode::None);
        assert!(renderer.render(&sample(), 0).is_empty());
        assert!(renderer.draw(&sample(), 0).is_ok());
    }

    #[test]
    fn test_color_frame_uses_intensity() {
        let frame = Renderer::new(RenderMode::Color).render(&sample(), 0);
        assert!(frame.starts_with(CLEAR_SCREEN));
        assert!(frame.contains("\x1b[48;2;255;255;255m"));
        assert!(frame.contains("\x1b[48;2;127;127;127m"));
        assert!(frame.contains("\x1b[48;2;0;0;0m"));
        assert_eq!(frame.matches(RESET).count(), 2);
    }
}
