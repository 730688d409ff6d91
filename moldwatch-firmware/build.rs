//! Build script for moldwatch-firmware
//!
//! Validates device.toml at compile time so a broken configuration never
//! reaches the device (where it would silently fall back to defaults).

use std::fs;
use std::path::Path;

/// Longest accepted metric key (matches the wire key capacity)
const KEY_LEN: usize = 32;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    validate_config();
}

/// Validate device.toml configuration at compile time
fn validate_config() {
    // Re-run if device.toml changes
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a device.toml configuration file.           ║\n\
            ║  Please create one in the moldwatch-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_metrics(&config, &mut errors);
    validate_scheduler(&config, &mut errors);
    validate_layout(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid device configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only known top-level sections are allowed
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        errors.push("device.toml must be a table".to_string());
        return;
    };

    for name in table.keys() {
        if !["device", "transport", "metric", "scheduler", "layout"].contains(&name.as_str()) {
            errors.push(format!("Unknown section [{}]", name));
        }
    }

    if let Some(id) = config.get("device").and_then(|d| d.get("id")) {
        match id.as_str() {
            Some(s) if !s.is_empty() && s.len() <= 32 => {}
            _ => errors.push("[device] id must be a string of 1-32 bytes".to_string()),
        }
    }

    if let Some(port) = config.get("transport").and_then(|t| t.get("broker_port")) {
        match port.as_integer() {
            Some(p) if (1..=65535).contains(&p) => {}
            _ => errors.push("[transport] broker_port must be 1-65535".to_string()),
        }
    }
}

/// Metric slots are metric.1 to metric.3; alias only on metric.3
fn validate_metrics(config: &toml::Value, errors: &mut Vec<String>) {
    let metrics = match config.get("metric") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[metric] must contain [metric.1] to [metric.3]".to_string());
            return;
        }
        None => return,
    };

    for (slot, metric) in metrics {
        if !["1", "2", "3"].contains(&slot.as_str()) {
            errors.push(format!("[metric.{}] slot must be 1, 2 or 3", slot));
            continue;
        }
        let Some(metric) = metric.as_table() else {
            errors.push(format!("[metric.{}] must be a table", slot));
            continue;
        };

        for (key, value) in metric {
            match key.as_str() {
                "key" => match value.as_str() {
                    Some(s) if !s.is_empty() && s.len() <= KEY_LEN => {}
                    _ => errors.push(format!("[metric.{}] key must be 1-{} bytes", slot, KEY_LEN)),
                },
                "label" => {
                    if !value.is_str() {
                        errors.push(format!("[metric.{}] label must be a string", slot));
                    }
                }
                "initial" => {
                    if !(value.is_float() || value.is_integer()) {
                        errors.push(format!("[metric.{}] initial must be a number", slot));
                    }
                }
                "alias" if slot == "3" => match value.as_str() {
                    Some(s) if s.len() <= KEY_LEN => {}
                    _ => errors.push(format!("[metric.3] alias must be 0-{} bytes", KEY_LEN)),
                },
                other => errors.push(format!("[metric.{}] unknown key '{}'", slot, other)),
            }
        }
    }
}

fn validate_scheduler(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(scheduler) = config.get("scheduler") else {
        return;
    };

    if let Some(interval) = scheduler.get("render_interval_ms") {
        match interval.as_integer() {
            Some(ms) if ms > 0 && ms <= i64::from(u32::MAX) => {}
            _ => errors.push("[scheduler] render_interval_ms must be > 0".to_string()),
        }
    }
}

fn validate_layout(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(layout) = config.get("layout") else {
        return;
    };

    if let Some(font) = layout.get("font") {
        if !matches!(font.as_str(), Some("gothic") | Some("mincho")) {
            errors.push("[layout] font must be 'gothic' or 'mincho'".to_string());
        }
    }

    for key in ["title_scale", "value_scale", "total_width"] {
        if let Some(value) = layout.get(key) {
            match value.as_integer() {
                Some(v) if (1..=255).contains(&v) => {}
                _ => errors.push(format!("[layout] {} must be 1-255", key)),
            }
        }
    }

    if let Some(brightness) = layout.get("brightness") {
        match brightness.as_integer() {
            Some(v) if (0..=255).contains(&v) => {}
            _ => errors.push("[layout] brightness must be 0-255".to_string()),
        }
    }

    if let Some(toml::Value::Table(sections)) = layout.get("section") {
        for slot in sections.keys() {
            if !["1", "2", "3"].contains(&slot.as_str()) {
                errors.push(format!("[layout.section.{}] slot must be 1, 2 or 3", slot));
            }
        }
    }
}
