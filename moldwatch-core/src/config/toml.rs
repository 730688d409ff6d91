//! Minimal TOML parser for device configuration
//!
//! Handles only the subset `device.toml` needs. It does NOT support the
//! full TOML spec.
//!
//! Supported:
//! - `[section]` and `[section.sub]` / `[section.sub.n]` headers
//! - `key = value` pairs (string, integer, float, boolean)
//! - Comments (`# ...`), including trailing comments outside strings
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings and escapes
//! - Dotted keys outside section headers
//!
//! Sections:
//!
//! ```toml
//! [device]
//! id = "tab5_001"
//!
//! [transport]
//! broker_host = "192.168.1.100"
//! broker_port = 1883
//! client_id = "tab5_indicator"
//! subscribe_topic = "tab5/data"
//! publish_topic = "tab5/status"
//!
//! [metric.1]            # .2, .3
//! key = "oil_pressure"
//! label = "油圧"
//! initial = 0.0
//! # alias = "injction_time"   (metric.3 only)
//!
//! [scheduler]
//! render_interval_ms = 1000
//! loop_yield_ms = 100
//!
//! [layout]
//! font = "gothic"       # or "mincho"
//! brightness = 200
//!
//! [layout.section.1]    # .2, .3
//! x = 10
//! y = 10
//! ```
//!
//! Anything not given keeps its [`DeviceConfig::default`] value.

use heapless::String;

use moldwatch_protocol::{ALIAS_TARGET, KEY_LEN, METRIC_COUNT};

use super::types::{DeviceConfig, FontFamily};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or badly formed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Key not recognized in its section
    UnknownKey,
    /// String longer than its field capacity
    ValueTooLong,
    /// Line is neither a header nor `key = value`
    InvalidLine,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Device,
    Transport,
    Metric(usize),
    Scheduler,
    Layout,
    LayoutSection(usize),
}

/// Parse TOML text into a [`DeviceConfig`]
pub fn parse_config(input: &str) -> Result<DeviceConfig, ParseError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    validate(&config)?;
    Ok(config)
}

/// Remove a `#` comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse a header like "device", "metric.2" or "layout.section.1"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let mut parts = header.trim().split('.');
    let kind = parts.next().unwrap_or_default();
    let first = parts.next();
    let second = parts.next();
    if parts.next().is_some() {
        return Err(ParseError::InvalidSection);
    }

    match (kind, first, second) {
        ("device", None, None) => Ok(Section::Device),
        ("transport", None, None) => Ok(Section::Transport),
        ("scheduler", None, None) => Ok(Section::Scheduler),
        ("layout", None, None) => Ok(Section::Layout),
        ("metric", Some(n), None) => Ok(Section::Metric(parse_slot(n)?)),
        ("layout", Some("section"), Some(n)) => Ok(Section::LayoutSection(parse_slot(n)?)),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse a 1-based slot number into a 0-based index
fn parse_slot(text: &str) -> Result<usize, ParseError> {
    match text.trim().parse::<usize>() {
        Ok(n) if (1..=METRIC_COUNT).contains(&n) => Ok(n - 1),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_str(value: &str) -> Result<&str, ParseError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else if value.contains('"') {
        Err(ParseError::InvalidValue)
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

fn parse_string<const N: usize>(value: &str) -> Result<String<N>, ParseError> {
    let text = parse_str(value)?;
    String::try_from(text).map_err(|_| ParseError::ValueTooLong)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    let v: f32 = value.parse().map_err(|_| ParseError::InvalidValue)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ParseError::InvalidValue)
    }
}

fn parse_font(value: &str) -> Result<FontFamily, ParseError> {
    match parse_str(value)? {
        "gothic" => Ok(FontFamily::Gothic),
        "mincho" => Ok(FontFamily::Mincho),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeviceConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::UnknownKey),
        Section::Device => match key {
            "id" => config.device_id = parse_string(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Transport => {
            let t = &mut config.transport;
            match key {
                "broker_host" => t.broker_host = parse_string(value)?,
                "broker_port" => t.broker_port = parse_int(value)?,
                "client_id" => t.client_id = parse_string(value)?,
                "subscribe_topic" => t.subscribe_topic = parse_string(value)?,
                "publish_topic" => t.publish_topic = parse_string(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Metric(index) => match key {
            "key" => config.metrics[index].key = parse_string(value)?,
            "label" => config.metrics[index].label = parse_string(value)?,
            "initial" => config.metrics[index].initial = parse_float(value)?,
            "alias" if index == ALIAS_TARGET => {
                let alias: String<KEY_LEN> = parse_string(value)?;
                config.alias_key = if alias.is_empty() { None } else { Some(alias) };
            }
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Scheduler => match key {
            "render_interval_ms" => config.scheduler.render_interval_ms = parse_int(value)?,
            "loop_yield_ms" => config.scheduler.loop_yield_ms = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Layout => {
            let l = &mut config.layout;
            match key {
                "title_offset_x" => l.title_offset.dx = parse_int(value)?,
                "title_offset_y" => l.title_offset.dy = parse_int(value)?,
                "current_offset_x" => l.current_offset.dx = parse_int(value)?,
                "current_offset_y" => l.current_offset.dy = parse_int(value)?,
                "previous_offset_x" => l.previous_offset.dx = parse_int(value)?,
                "previous_offset_y" => l.previous_offset.dy = parse_int(value)?,
                "font" => l.font_family = parse_font(value)?,
                "title_font_size" => l.title_font_size = parse_int(value)?,
                "current_font_size" => l.current_font_size = parse_int(value)?,
                "previous_font_size" => l.previous_font_size = parse_int(value)?,
                "title_scale" => l.title_scale = parse_int(value)?,
                "value_scale" => l.value_scale = parse_int(value)?,
                "decimal_places" => l.decimal_places = parse_int(value)?,
                "total_width" => l.total_width = parse_int(value)?,
                "right_align_x" => l.right_align_x = parse_int(value)?,
                "brightness" => l.brightness = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::LayoutSection(index) => {
            let rect = &mut config.layout.sections[index];
            match key {
                "x" => rect.x = parse_int(value)?,
                "y" => rect.y = parse_int(value)?,
                "width" => rect.width = parse_int(value)?,
                "height" => rect.height = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
    }
    Ok(())
}

/// Reject configurations the runtime cannot use
fn validate(config: &DeviceConfig) -> Result<(), ParseError> {
    if config.scheduler.render_interval_ms == 0 {
        return Err(ParseError::InvalidValue);
    }
    if config.metrics.iter().any(|m| m.key.is_empty()) {
        return Err(ParseError::InvalidValue);
    }
    let l = &config.layout;
    if l.value_scale == 0 || l.title_scale == 0 || l.total_width == 0 {
        return Err(ParseError::InvalidValue);
    }
    Ok(())
}
