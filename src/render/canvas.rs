//! Terminal-cell canvas.
//!
//! Rasterises pixel rectangles onto a `tile_count x tile_count` grid of
//! colours, one grid cell per board tile, and turns the result into ratatui
//! lines of two-column blocks.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::game::CANVAS_SIZE;

use super::surface::{Paint, PixelRect, Rgb, Surface};

/// Slack when snapping pixel edges to cells
const EDGE_EPSILON: f32 = 1e-3;

const CELL_GLYPH: &str = "██";

#[derive(Debug, Clone, PartialEq)]
pub struct CellCanvas {
    tile_count: i32,
    cell_size: f32,
    cells: Vec<Rgb>,
    frame: Option<Rgb>,
}

impl CellCanvas {
    pub fn new(tile_count: i32) -> Self {
        let tile_count = tile_count.max(1);
        Self {
            tile_count,
            cell_size: CANVAS_SIZE / tile_count as f32,
            cells: vec![Rgb::default(); (tile_count * tile_count) as usize],
            frame: None,
        }
    }

    pub fn tile_count(&self) -> i32 {
        self.tile_count
    }

    /// Colour of the cell at column `x`, row `y`
    pub fn color_at(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Colour of the outline stroke, if one was drawn
    pub fn frame(&self) -> Option<Rgb> {
        self.frame
    }

    pub fn to_lines(&self) -> Vec<Line<'static>> {
        (0..self.tile_count)
            .map(|y| {
                let spans: Vec<Span<'static>> = (0..self.tile_count)
                    .filter_map(|x| self.color_at(x, y))
                    .map(|rgb| {
                        Span::styled(
                            CELL_GLYPH,
                            Style::default().fg(Color::Rgb(rgb.r, rgb.g, rgb.b)),
                        )
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.tile_count || y >= self.tile_count {
            return None;
        }
        Some((y * self.tile_count + x) as usize)
    }

    /// Half-open range of cells a pixel span touches, clipped to the grid
    fn cell_span(&self, start: f32, length: f32) -> (i32, i32) {
        let first = (start / self.cell_size + EDGE_EPSILON).floor() as i32;
        let last = ((start + length) / self.cell_size - EDGE_EPSILON).ceil() as i32;
        (first.max(0), last.min(self.tile_count))
    }
}

impl Surface for CellCanvas {
    fn fill_rect(&mut self, rect: PixelRect, paint: Paint) {
        let (x0, x1) = self.cell_span(rect.x, rect.width);
        let (y0, y1) = self.cell_span(rect.y, rect.height);
        for y in y0..y1 {
            for x in x0..x1 {
                if let Some(i) = self.index(x, y) {
                    self.cells[i] = paint.color.over(self.cells[i], paint.alpha);
                }
            }
        }
    }

    fn stroke_rect(&mut self, _rect: PixelRect, paint: Paint, _line_width: f32) {
        // Drawn by the widget border rather than eating into the board
        self.frame = Some(paint.color);
    }
}
