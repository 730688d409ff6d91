//! Metric dashboard
//!
//! Draws the three metric sections from a [`MetricStore`]. With a back
//! buffer every frame is cleared, drawn off-screen and presented in one
//! push; without one, the panel is cleared and drawn directly.

use core::fmt::Write;

use heapless::String;

use moldwatch_core::config::{LayoutConfig, LABEL_LEN};
use moldwatch_core::store::{Metric, MetricStore};
use moldwatch_core::traits::RenderTrigger;
use moldwatch_core::{log_error, log_info, log_warn};

use crate::backend::{Color, DisplayBackend, DisplayError, Font, Point, TextStyle};
use crate::format::format_value;
use crate::layout::SectionGeometry;

/// Label in front of the current value
pub const CURRENT_LABEL: &str = "今回値: ";

/// Label in front of the previous value
pub const PREVIOUS_LABEL: &str = "前回値: ";

/// Font size of the full-screen notice
const NOTICE_FONT_SIZE: u8 = 40;

/// Label plus the trailing colon
const TITLE_LEN: usize = LABEL_LEN + 1;

/// Renders metrics to a [`DisplayBackend`]
pub struct Dashboard<B> {
    backend: B,
    layout: LayoutConfig,
    buffered: bool,
    frames: u32,
}

impl<B: DisplayBackend> Dashboard<B> {
    pub fn new(backend: B, layout: LayoutConfig) -> Self {
        Self {
            backend,
            layout,
            buffered: false,
            frames: 0,
        }
    }

    /// Apply brightness and try to set up double buffering
    ///
    /// A missing back buffer is not an error: drawing falls back to the
    /// panel.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        let (width, height) = self.backend.dimensions();
        log_info!("Display: {}x{}", width, height);

        self.backend.set_brightness(self.layout.brightness)?;

        match self.backend.create_back_buffer() {
            Ok(()) => {
                self.buffered = true;
                log_info!("Back buffer created: {}x{}", width, height);
            }
            Err(e) => {
                self.buffered = false;
                log_warn!("Back buffer unavailable ({:?}), drawing directly", e);
            }
        }
        Ok(())
    }

    /// Draw all metrics
    pub fn render(&mut self, store: &MetricStore) -> Result<(), DisplayError> {
        self.backend.fill(Color::Black)?;
        for (index, metric) in store.iter().enumerate() {
            if let Some(geo) = SectionGeometry::for_section(&self.layout, index) {
                self.draw_section(&geo, metric)?;
            }
        }
        self.finish_frame()
    }

    /// Replace the screen with a centered message
    pub fn show_notice(&mut self, text: &str) -> Result<(), DisplayError> {
        let style = TextStyle {
            font: Font::nearest(self.layout.font_family, NOTICE_FONT_SIZE),
            scale: 1,
            color: Color::White,
        };
        let (width, height) = self.backend.dimensions();
        let text_width = self.backend.text_width(text, &style);
        let at = Point::new(
            (width as i32 - text_width) / 2,
            (height as i32 - i32::from(style.font.px)) / 2,
        );

        self.backend.fill(Color::Black)?;
        self.backend.draw_text(at, text, &style)?;
        self.finish_frame()
    }

    fn finish_frame(&mut self) -> Result<(), DisplayError> {
        if self.buffered {
            self.backend.present()?;
        }
        self.frames = self.frames.wrapping_add(1);
        Ok(())
    }

    fn draw_section(&mut self, geo: &SectionGeometry, metric: &Metric) -> Result<(), DisplayError> {
        let layout = &self.layout;
        let family = layout.font_family;
        let reading = metric.reading();

        self.backend.draw_rect(geo.frame, Color::White)?;

        let title = TextStyle {
            font: Font::nearest(family, layout.title_font_size),
            scale: layout.title_scale,
            color: Color::Cyan,
        };
        let mut text: String<TITLE_LEN> = String::new();
        let _ = write!(text, "{}:", metric.label());
        self.backend.draw_text(geo.title, &text, &title)?;

        let current = TextStyle {
            font: Font::nearest(family, layout.current_font_size),
            scale: 1,
            color: Color::White,
        };
        self.backend.draw_text(geo.current_label, CURRENT_LABEL, &current)?;
        let value = format_value(reading.current, layout.total_width, layout.decimal_places);
        let value_style = TextStyle {
            scale: layout.value_scale,
            ..current
        };
        let width = self.backend.text_width(&value, &value_style);
        self.backend
            .draw_text(geo.current_value(width), &value, &value_style)?;

        let previous = TextStyle {
            font: Font::nearest(family, layout.previous_font_size),
            scale: 1,
            color: Color::DarkGrey,
        };
        self.backend.draw_text(geo.previous_label, PREVIOUS_LABEL, &previous)?;
        let value = format_value(reading.previous, layout.total_width, layout.decimal_places);
        let value_style = TextStyle {
            scale: layout.value_scale,
            ..previous
        };
        let width = self.backend.text_width(&value, &value_style);
        self.backend
            .draw_text(geo.previous_value(width), &value, &value_style)
    }

    /// True if frames are drawn off-screen
    pub fn is_buffered(&self) -> bool {
        self.buffered
    }

    /// Frames completed since startup
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: DisplayBackend> RenderTrigger for Dashboard<B> {
    fn redraw(&mut self, metrics: &MetricStore) {
        if let Err(e) = self.render(metrics) {
            log_error!("Render failed: {:?}", e);
        }
    }

    fn notice(&mut self, message: &str) {
        if let Err(e) = self.show_notice(message) {
            log_error!("Notice failed: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use moldwatch_core::config::Rect;
    use std::string::{String, ToString};
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Brightness(u8),
        Fill,
        Rect(Rect),
        Text(Point, String, TextStyle),
        Present,
    }

    /// Records draw calls; every glyph is `px * scale / 2` wide
    #[derive(Default)]
    struct RecordingBackend {
        ops: Vec<Op>,
        no_back_buffer: bool,
        fail_draws: bool,
    }

    impl RecordingBackend {
        fn texts(&self) -> Vec<(Point, &str)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text(at, text, _) => Some((*at, text.as_str())),
                    _ => None,
                })
                .collect()
        }

        fn style_of(&self, text: &str) -> Option<TextStyle> {
            self.ops.iter().find_map(|op| match op {
                Op::Text(_, t, style) if t == text => Some(*style),
                _ => None,
            })
        }
    }

    impl DisplayBackend for RecordingBackend {
        fn dimensions(&self) -> (u32, u32) {
            (720, 1280)
        }

        fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
            self.ops.push(Op::Brightness(level));
            Ok(())
        }

        fn create_back_buffer(&mut self) -> Result<(), DisplayError> {
            if self.no_back_buffer {
                Err(DisplayError::BufferUnavailable)
            } else {
                Ok(())
            }
        }

        fn fill(&mut self, _color: Color) -> Result<(), DisplayError> {
            self.ops.push(Op::Fill);
            Ok(())
        }

        fn draw_rect(&mut self, rect: Rect, _color: Color) -> Result<(), DisplayError> {
            self.ops.push(Op::Rect(rect));
            Ok(())
        }

        fn draw_text(&mut self, at: Point, text: &str, style: &TextStyle) -> Result<(), DisplayError> {
            if self.fail_draws {
                return Err(DisplayError::Communication);
            }
            self.ops.push(Op::Text(at, text.to_string(), *style));
            Ok(())
        }

        fn text_width(&self, text: &str, style: &TextStyle) -> i32 {
            let glyph = i32::from(style.font.px) * i32::from(style.scale) / 2;
            text.chars().count() as i32 * glyph
        }

        fn present(&mut self) -> Result<(), DisplayError> {
            self.ops.push(Op::Present);
            Ok(())
        }
    }

    fn dashboard(backend: RecordingBackend) -> Dashboard<RecordingBackend> {
        let mut dash = Dashboard::new(backend, LayoutConfig::default());
        dash.init().unwrap();
        dash
    }

    #[test]
    fn test_init_sets_brightness_and_buffer() {
        let dash = dashboard(RecordingBackend::default());
        assert!(dash.is_buffered());
        assert_eq!(dash.backend().ops, [Op::Brightness(200)]);
    }

    #[test]
    fn test_buffered_frame_is_presented_once() {
        let mut dash = dashboard(RecordingBackend::default());
        dash.render(&MetricStore::default()).unwrap();

        let ops = &dash.backend().ops;
        assert_eq!(ops[1], Op::Fill);
        assert_eq!(ops.last(), Some(&Op::Present));
        assert_eq!(ops.iter().filter(|op| **op == Op::Present).count(), 1);
        assert_eq!(ops.iter().filter(|op| matches!(op, Op::Rect(_))).count(), 3);
        assert_eq!(dash.frames(), 1);
    }

    #[test]
    fn test_direct_fallback_without_buffer() {
        let mut dash = dashboard(RecordingBackend {
            no_back_buffer: true,
            ..Default::default()
        });
        assert!(!dash.is_buffered());

        dash.render(&MetricStore::default()).unwrap();
        assert!(!dash.backend().ops.contains(&Op::Present));
        assert_eq!(dash.backend().texts().len(), 3 * 5);
    }

    #[test]
    fn test_section_contents() {
        let mut store = MetricStore::default();
        store.update(0, 123.4);
        store.update(0, 125.0);

        let mut dash = dashboard(RecordingBackend::default());
        dash.render(&store).unwrap();
        let texts = dash.backend().texts();

        assert_eq!(texts[0], (Point::new(30, 30), "油圧:"));
        assert_eq!(texts[1], (Point::new(40, 160), CURRENT_LABEL));
        assert_eq!(texts[2].1, "0125.0");
        assert_eq!(texts[3], (Point::new(40, 280), PREVIOUS_LABEL));
        assert_eq!(texts[4].1, "0123.4");
        assert_eq!(texts[5].1, "パリソン温度:");
    }

    #[test]
    fn test_values_right_aligned() {
        let mut dash = dashboard(RecordingBackend::default());
        dash.render(&MetricStore::default()).unwrap();
        let texts = dash.backend().texts();

        // 6 glyphs, 40px font at scale 3 -> 60px each
        let (at, value) = texts[2];
        assert_eq!(value, "0000.0");
        assert_eq!(at, Point::new(660 - 360, 160));
    }

    #[test]
    fn test_colors() {
        let mut dash = dashboard(RecordingBackend::default());
        dash.render(&MetricStore::default()).unwrap();
        let backend = dash.backend();

        let title = backend.style_of("油圧:").unwrap();
        assert_eq!(title.color, Color::Cyan);
        assert_eq!(title.scale, 2);
        assert_eq!(backend.style_of(CURRENT_LABEL).unwrap().color, Color::White);
        assert_eq!(backend.style_of(PREVIOUS_LABEL).unwrap().color, Color::DarkGrey);
    }

    #[test]
    fn test_notice_centered() {
        let mut dash = dashboard(RecordingBackend::default());
        dash.show_notice("Restarting...").unwrap();

        let texts = dash.backend().texts();
        assert_eq!(texts.len(), 1);
        // 13 glyphs * 20px = 260px
        assert_eq!(texts[0], (Point::new((720 - 260) / 2, (1280 - 40) / 2), "Restarting..."));
    }

    #[test]
    fn test_render_error_absorbed_by_trigger() {
        let mut dash = dashboard(RecordingBackend {
            fail_draws: true,
            ..Default::default()
        });
        assert_eq!(
            dash.render(&MetricStore::default()),
            Err(DisplayError::Communication)
        );
        // Through the trigger the error is only logged
        dash.redraw(&MetricStore::default());
        assert_eq!(dash.frames(), 0);
    }
}
