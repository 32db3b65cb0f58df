//! Human-readable, optionally colored formatter
//!
//! Produces one line per message:
//!
//! ```text
//! 2025-01-08T10:30:45.123Z [INFO] server.http host='localhost' port=8080 listening
//! ```
//!
//! Empty parts (no prefix, no params) are dropped rather than rendered blank.

use crate::core::{Formatter, LogLevel, Message, Result, TimestampFormat, Value};
use colored::Color;
use std::collections::BTreeMap;
use std::io::IsTerminal;

/// Escape sequences used by the pretty formatter, one per color role.
///
/// Any string works, so a palette can target something other than ANSI
/// terminals (markup tags, for instance).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    pub red: String,
    pub green: String,
    pub yellow: String,
    pub blue: String,
    pub magenta: String,
    pub cyan: String,
    pub white: String,
    pub reset: String,
}

fn ansi_fg(color: Color) -> String {
    format!("\u{1b}[{}m", color.to_fg_str())
}

impl Palette {
    /// Standard ANSI foreground colors
    pub fn ansi() -> Self {
        Self {
            red: ansi_fg(Color::Red),
            green: ansi_fg(Color::Green),
            yellow: ansi_fg(Color::Yellow),
            blue: ansi_fg(Color::Blue),
            magenta: ansi_fg(Color::Magenta),
            cyan: ansi_fg(Color::Cyan),
            white: ansi_fg(Color::White),
            reset: "\u{1b}[0m".to_string(),
        }
    }

    /// Every role renders as the empty string
    pub fn plain() -> Self {
        Self::default()
    }

    /// ANSI colors on an interactive terminal, plain otherwise
    pub fn detect() -> Self {
        if supports_colors() {
            Self::ansi()
        } else {
            Self::plain()
        }
    }

    pub fn level_color(&self, level: LogLevel) -> &str {
        match level {
            LogLevel::Error => &self.red,
            LogLevel::Warn => &self.yellow,
            LogLevel::Log => &self.green,
            LogLevel::Info => &self.blue,
            LogLevel::Debug => &self.cyan,
        }
    }
}

/// Stdout is a terminal, `NO_COLOR` is unset and the terminal is not `dumb`
fn supports_colors() -> bool {
    std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none()
        && std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(true)
}

/// Color configuration for [`PrettyFormatter`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Detect terminal support once, when the formatter is built
    #[default]
    Auto,
    Never,
    Palette(Palette),
}

impl From<bool> for ColorChoice {
    fn from(enabled: bool) -> Self {
        if enabled {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        }
    }
}

impl From<Palette> for ColorChoice {
    fn from(palette: Palette) -> Self {
        ColorChoice::Palette(palette)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrettyOptions {
    pub colors: ColorChoice,
    /// Escape newlines inside quoted string values
    pub replace_newline: bool,
    pub timestamp_format: TimestampFormat,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            colors: ColorChoice::Auto,
            replace_newline: true,
            timestamp_format: TimestampFormat::Iso8601,
        }
    }
}

impl PrettyOptions {
    /// Defaults without colors
    pub fn plain() -> Self {
        Self {
            colors: ColorChoice::Never,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_colors(mut self, colors: impl Into<ColorChoice>) -> Self {
        self.colors = colors.into();
        self
    }

    #[must_use]
    pub fn with_replace_newline(mut self, replace: bool) -> Self {
        self.replace_newline = replace;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

#[derive(Debug, Clone)]
pub struct PrettyFormatter {
    palette: Palette,
    replace_newline: bool,
    timestamp_format: TimestampFormat,
}

impl PrettyFormatter {
    pub fn new(options: PrettyOptions) -> Self {
        let palette = match options.colors {
            ColorChoice::Auto => Palette::detect(),
            ColorChoice::Never => Palette::plain(),
            ColorChoice::Palette(palette) => palette,
        };

        Self {
            palette,
            replace_newline: options.replace_newline,
            timestamp_format: options.timestamp_format,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn paint(&self, out: &mut String, color: &str, text: &str) {
        out.push_str(color);
        out.push_str(text);
        out.push_str(&self.palette.reset);
    }

    /// Render one value, recursing into containers
    fn render_value(&self, value: &Value, out: &mut String) {
        let p = &self.palette;
        match value {
            Value::Null => out.push_str("null"),
            Value::String(s) => {
                let text = if self.replace_newline {
                    s.replace('\n', "\\n")
                } else {
                    s.clone()
                };
                self.paint(out, &p.yellow, &format!("'{}'", text));
            }
            Value::Int(i) => self.paint(out, &p.yellow, &i.to_string()),
            Value::UInt(u) => self.paint(out, &p.yellow, &u.to_string()),
            Value::Float(f) => self.paint(out, &p.yellow, &format_float(*f)),
            Value::Bool(b) => self.paint(out, &p.magenta, &b.to_string()),
            Value::Timestamp(ts) => self.paint(out, &p.cyan, &TimestampFormat::Iso8601.format(ts)),
            Value::Error(err) => self.paint(out, &p.red, &err.to_string()),
            Value::List(items) | Value::Set(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.render_value(item, out);
                }
                out.push(']');
            }
            Value::Map(entries) => {
                out.push('{');
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.render_value(key, out);
                    out.push_str(": ");
                    self.render_value(item, out);
                }
                out.push('}');
            }
            Value::Record(fields) => {
                out.push('{');
                for (i, (key, item)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.paint(out, &p.green, key);
                    out.push_str(": ");
                    self.render_value(item, out);
                }
                out.push('}');
            }
            Value::Opaque(text) => self.paint(out, &p.yellow, text),
        }
    }

    fn render_params(&self, params: &BTreeMap<String, Value>) -> String {
        let mut out = String::new();
        for (i, (key, value)) in params.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            self.paint(&mut out, &self.palette.green, key);
            out.push('=');
            self.render_value(value, &mut out);
        }
        out
    }

    fn render_payload(&self, message: &Message) -> String {
        let mut out = String::new();
        match &message.message {
            // Bare strings are the common case: unquoted, in the level color
            Value::String(s) => self.paint(&mut out, self.palette.level_color(message.level), s),
            other => self.render_value(other, &mut out),
        }
        out
    }
}

impl Default for PrettyFormatter {
    fn default() -> Self {
        Self::new(PrettyOptions::default())
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else {
        f.to_string()
    }
}

impl Formatter for PrettyFormatter {
    fn format(&self, message: &Message) -> Result<String> {
        let mut level = String::new();
        self.paint(
            &mut level,
            self.palette.level_color(message.level),
            &format!("[{}]", message.level.label()),
        );

        let parts = [
            self.timestamp_format.format(&message.timestamp),
            level,
            message.prefix_path(),
            self.render_params(&message.params),
            self.render_payload(message),
        ];

        Ok(parts
            .iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn name(&self) -> &str {
        "pretty"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorValue;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn message(level: LogLevel, prefix: &[&str], params: &[(&str, Value)], payload: Value) -> Message {
        Message::new(
            level,
            prefix.iter().map(|s| s.to_string()).collect::<Vec<_>>().into(),
            Arc::new(
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ),
            payload,
            Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().unwrap()
                + chrono::Duration::milliseconds(123),
        )
    }

    fn plain() -> PrettyFormatter {
        PrettyFormatter::new(PrettyOptions::plain())
    }

    fn tagged() -> Palette {
        Palette {
            red: "<red>".to_string(),
            green: "<green>".to_string(),
            yellow: "<yellow>".to_string(),
            blue: "<blue>".to_string(),
            magenta: "<magenta>".to_string(),
            cyan: "<cyan>".to_string(),
            white: "<white>".to_string(),
            reset: "</>".to_string(),
        }
    }

    #[test]
    fn test_full_line() -> Result<()> {
        let msg = message(
            LogLevel::Info,
            &["server", "http"],
            &[("port", Value::from(8080)), ("host", Value::from("localhost"))],
            Value::from("listening"),
        );

        assert_eq!(
            plain().format(&msg)?,
            "2025-01-08T10:30:45.123Z [INFO] server.http host='localhost' port=8080 listening"
        );
        Ok(())
    }

    #[test]
    fn test_empty_parts_dropped() -> Result<()> {
        let msg = message(LogLevel::Warn, &[], &[], Value::from("disk low"));
        assert_eq!(plain().format(&msg)?, "2025-01-08T10:30:45.123Z [WARN] disk low");
        Ok(())
    }

    #[test]
    fn test_invalid_custom_timestamp() -> Result<()> {
        let formatter = PrettyFormatter::new(
            PrettyOptions::plain().with_timestamp_format(TimestampFormat::Custom("%Q".to_string())),
        );
        let msg = message(LogLevel::Warn, &[], &[], Value::from("disk low"));
        assert_eq!(formatter.format(&msg)?, "2025-01-08T10:30:45.123Z [WARN] disk low");
        Ok(())
    }

    #[test]
    fn test_structured_payload() -> Result<()> {
        let payload: Value = [
            ("ids", Value::from(vec![1, 2])),
            ("ok", Value::from(true)),
            ("ratio", Value::from(0.5)),
            ("note", Value::Null),
        ]
        .into_iter()
        .collect();
        let msg = message(LogLevel::Debug, &["db"], &[], payload);

        assert_eq!(
            plain().format(&msg)?,
            "2025-01-08T10:30:45.123Z [DEBUG] db {ids: [1, 2], note: null, ok: true, ratio: 0.5}"
        );
        Ok(())
    }

    #[test]
    fn test_map_set_and_timestamp_values() {
        let formatter = plain();
        let mut out = String::new();

        formatter.render_value(&Value::map([(1, "one")]), &mut out);
        assert_eq!(out, "{1: 'one'}");

        out.clear();
        formatter.render_value(&Value::set(["a", "b"]), &mut out);
        assert_eq!(out, "['a', 'b']");

        out.clear();
        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).single().unwrap();
        formatter.render_value(&Value::from(ts), &mut out);
        assert_eq!(out, "2024-02-29T00:00:00.000Z");
    }

    #[test]
    fn test_replace_newline() -> Result<()> {
        let msg = message(LogLevel::Log, &[], &[("sql", Value::from("SELECT 1\nFROM t"))], Value::from(1));

        let escaped = plain().format(&msg)?;
        assert!(escaped.contains("sql='SELECT 1\\nFROM t'"));

        let raw = PrettyFormatter::new(PrettyOptions::plain().with_replace_newline(false)).format(&msg)?;
        assert!(raw.contains("sql='SELECT 1\nFROM t'"));
        Ok(())
    }

    #[test]
    fn test_error_value() -> Result<()> {
        let err = ErrorValue::new("IoError", "write failed").with_cause("disk full");
        let msg = message(LogLevel::Error, &[], &[], Value::from(err));

        assert_eq!(
            plain().format(&msg)?,
            "2025-01-08T10:30:45.123Z [ERROR] IoError: write failed\n    caused by: disk full"
        );
        Ok(())
    }

    #[test]
    fn test_level_colors() -> Result<()> {
        let formatter = PrettyFormatter::new(PrettyOptions::default().with_colors(tagged()));
        let expected = [
            (LogLevel::Error, "<red>"),
            (LogLevel::Warn, "<yellow>"),
            (LogLevel::Log, "<green>"),
            (LogLevel::Info, "<blue>"),
            (LogLevel::Debug, "<cyan>"),
        ];

        for (level, color) in expected {
            let line = formatter.format(&message(level, &[], &[], Value::from("hi")))?;
            assert!(
                line.ends_with(&format!("{}[{}]</> {}hi</>", color, level.label(), color)),
                "unexpected line: {}",
                line
            );
        }
        Ok(())
    }

    #[test]
    fn test_value_colors() -> Result<()> {
        let formatter = PrettyFormatter::new(PrettyOptions::default().with_colors(tagged()));
        let msg = message(
            LogLevel::Info,
            &[],
            &[("n", Value::from(1)), ("s", Value::from("x")), ("b", Value::from(false))],
            Value::from(2.5),
        );

        let line = formatter.format(&msg)?;
        assert!(line.contains("<green>b</>=<magenta>false</>"));
        assert!(line.contains("<green>n</>=<yellow>1</>"));
        assert!(line.contains("<green>s</>=<yellow>'x'</>"));
        assert!(line.ends_with("<yellow>2.5</>"));
        Ok(())
    }

    #[test]
    fn test_color_choice_from_bool() {
        assert_eq!(ColorChoice::from(true), ColorChoice::Auto);
        assert_eq!(ColorChoice::from(false), ColorChoice::Never);
        assert_eq!(plain().palette(), &Palette::plain());
    }

    #[test]
    fn test_ansi_palette() {
        let palette = Palette::ansi();
        assert_eq!(palette.red, "\u{1b}[31m");
        assert_eq!(palette.cyan, "\u{1b}[36m");
        assert_eq!(palette.reset, "\u{1b}[0m");
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(f64::INFINITY), "Infinity");
        assert_eq!(format_float(f64::NAN), "NaN");
    }
}
