//! Section geometry
//!
//! Each metric gets one framed section. Inside it:
//!
//! ```text
//!  ┌──────────────────────────────────────────────┐
//!  │ <label>:                      (title offset) │
//!  │                                              │
//!  │ 今回値:                         0123.4 ◄─┐   │
//!  │                                          │   │
//!  │ 前回値:                         0120.0 ◄─┤   │
//!  └──────────────────────────────────────────┼───┘
//!                                  right_align_x
//! ```

use moldwatch_core::config::{LayoutConfig, Offset, Rect};

use crate::backend::Point;

/// Where the parts of one section are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SectionGeometry {
    pub frame: Rect,
    pub title: Point,
    pub current_label: Point,
    pub previous_label: Point,
    /// Right edge of both values
    pub value_right: i32,
}

impl SectionGeometry {
    /// Geometry of section `index`, or None past the last section
    pub fn for_section(layout: &LayoutConfig, index: usize) -> Option<Self> {
        let frame = *layout.sections.get(index)?;
        Some(Self {
            frame,
            title: offset(frame, layout.title_offset),
            current_label: offset(frame, layout.current_offset),
            previous_label: offset(frame, layout.previous_offset),
            value_right: frame.x + layout.right_align_x,
        })
    }

    /// Top-left point for a value of `width` pixels on the current row
    pub fn current_value(&self, width: i32) -> Point {
        Point::new(self.value_right - width, self.current_label.y)
    }

    /// Top-left point for a value of `width` pixels on the previous row
    pub fn previous_value(&self, width: i32) -> Point {
        Point::new(self.value_right - width, self.previous_label.y)
    }
}

fn offset(frame: Rect, by: Offset) -> Point {
    Point::new(frame.x + by.dx, frame.y + by.dy)
}
