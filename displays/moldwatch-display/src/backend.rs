//! Display backend trait
//!
//! Defines the interface the dashboard draws through. Coordinates are
//! panel pixels with the origin at the top-left corner.

use moldwatch_core::config::{FontFamily, Rect};

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
    /// Off-screen buffer could not be allocated
    BufferUnavailable,
}

/// The colors the dashboard uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Black,
    White,
    Cyan,
    DarkGrey,
}

impl Color {
    /// RGB565 encoding
    pub const fn rgb565(self) -> u16 {
        match self {
            Color::Black => 0x0000,
            Color::White => 0xFFFF,
            Color::Cyan => 0x07FF,
            Color::DarkGrey => 0x7BEF,
        }
    }
}

/// A pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A bitmap font face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Font {
    pub family: FontFamily,
    /// Glyph height in pixels, one of [`Font::SIZES`]
    pub px: u8,
}

impl Font {
    /// Face sizes available in each family, largest first
    pub const SIZES: [u8; 8] = [40, 36, 32, 28, 24, 20, 16, 12];

    /// Largest available face not bigger than `requested`
    ///
    /// Requests below the smallest face get the smallest face.
    pub fn nearest(family: FontFamily, requested: u8) -> Self {
        let px = Self::SIZES
            .iter()
            .copied()
            .find(|&size| size <= requested)
            .unwrap_or(Self::SIZES[Self::SIZES.len() - 1]);
        Self { family, px }
    }
}

/// How a run of text is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextStyle {
    pub font: Font,
    /// Integer magnification
    pub scale: u8,
    /// Foreground; text is drawn on black
    pub color: Color,
}

/// Display backend trait
///
/// Provides a hardware-agnostic interface for rendering to the panel.
/// Once [`DisplayBackend::create_back_buffer`] succeeds, all drawing goes
/// to an off-screen buffer and becomes visible on
/// [`DisplayBackend::present`]. Without a back buffer, drawing is
/// immediately visible and `present` does nothing.
pub trait DisplayBackend {
    /// Panel size in pixels (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Set backlight level (0-255)
    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError>;

    /// Allocate a full-screen off-screen buffer and draw into it from now on
    fn create_back_buffer(&mut self) -> Result<(), DisplayError>;

    /// Fill the whole drawing target
    fn fill(&mut self, color: Color) -> Result<(), DisplayError>;

    /// Draw a one-pixel rectangle outline
    fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<(), DisplayError>;

    /// Draw text with its top-left corner at `at`
    fn draw_text(&mut self, at: Point, text: &str, style: &TextStyle) -> Result<(), DisplayError>;

    /// Width in pixels `text` would occupy
    fn text_width(&self, text: &str, style: &TextStyle) -> i32;

    /// Push the back buffer to the panel
    fn present(&mut self) -> Result<(), DisplayError>;
}
