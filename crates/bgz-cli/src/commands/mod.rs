//! CLI command implementations

pub mod check;
pub mod list;
pub mod render;

use anyhow::{Context, Result};
use bgz_effects::{parse_options, Options};
use toml::Value;

/// Read the options file (if any) and apply `KEY=VALUE` overrides on top.
/// Override values are parsed as TOML; anything that does not parse is
/// taken as a plain string, so `--set color=#fff` works unquoted.
pub fn load_options(path: Option<&str>, overrides: &[String]) -> Result<Options> {
    let mut options = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file: {}", path))?;
            parse_options(&text).with_context(|| format!("Failed to parse options file: {}", path))?
        }
        None => Options::new(),
    };

    for entry in overrides {
        let (key, raw) = entry
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got '{}'", entry))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Empty option name in '{}'", entry);
        }
        options.insert(key.to_string(), parse_value(raw.trim()));
    }

    Ok(options)
}

fn parse_value(raw: &str) -> Value {
    toml::from_str::<toml::Table>(&format!("value = {}", raw))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_parse_as_toml() {
        let overrides = vec![
            "count=5".to_string(),
            "speed = { min = 1, max = 3 }".to_string(),
            "color=#ff0000".to_string(),
            "text=\"abc\"".to_string(),
        ];
        let options = load_options(None, &overrides).unwrap();
        assert_eq!(options["count"], Value::Integer(5));
        assert!(options["speed"].is_table());
        assert_eq!(options["color"], Value::String("#ff0000".into()));
        assert_eq!(options["text"], Value::String("abc".into()));
    }

    #[test]
    fn malformed_override_rejected() {
        assert!(load_options(None, &["count".to_string()]).is_err());
        assert!(load_options(None, &["=3".to_string()]).is_err());
    }

    #[test]
    fn missing_file_reported() {
        let err = load_options(Some("/nonexistent/bgz-options.toml"), &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to read options file"));
    }
}
