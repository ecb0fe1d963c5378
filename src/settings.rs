use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    pub city: String,
}

pub fn load_settings(path: &Path) -> Result<WidgetSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to read settings file {}", path.display()))?;
    parse_settings_text(&content)
}

pub fn parse_settings_text(content: &str) -> Result<WidgetSettings> {
    let settings = serde_json::from_str::<WidgetSettings>(content).map_err(|err| {
        let line = err.line();
        let column = err.column();
        anyhow::anyhow!("invalid JSON at line {line}, column {column}: {err}")
    })?;
    if settings.city.trim().is_empty() {
        bail!("settings must name a city");
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_city() {
        let settings = parse_settings_text(r#"{ "city": "Sarajevo" }"#).expect("valid settings");
        assert_eq!(settings.city, "Sarajevo");
    }

    #[test]
    fn rejects_blank_city() {
        let err = parse_settings_text(r#"{ "city": "  " }"#).expect_err("blank city");
        assert!(err.to_string().contains("must name a city"));
    }

    #[test]
    fn rejects_missing_city() {
        let err = parse_settings_text("{}").expect_err("missing city");
        assert!(err.to_string().contains("invalid JSON"));
    }
}
