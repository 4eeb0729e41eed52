//! 대시보드 환경설정 명령.

use anyhow::{Context, Result};
use invest_core::{DashboardSettings, SettingsManager, SettingsPatch};
use serde_json::Value;
use tracing::info;

use super::output::{escape_csv, format_json, OutputFormat};

/// 현재 설정을 렌더링합니다.
pub fn show(manager: &SettingsManager, format: OutputFormat) -> Result<String> {
    render(manager.current(), format)
}

/// `key=value` 하나를 적용하고 저장합니다.
pub fn set(manager: &mut SettingsManager, key: &str, value: &str) -> Result<String> {
    let patch = SettingsPatch::from_key_value(key, value)
        .with_context(|| format!("Invalid setting: {}={}", key, value))?;
    let updated = manager
        .update(patch)
        .context("Failed to save settings")?;
    info!(key = %key, "환경설정 변경");
    render(updated, OutputFormat::Table)
}

/// 기본값으로 되돌리고 저장합니다.
pub fn reset(manager: &mut SettingsManager) -> Result<String> {
    let defaults = manager.reset().context("Failed to reset settings")?;
    info!("환경설정 초기화");
    render(defaults, OutputFormat::Table)
}

fn render(settings: &DashboardSettings, format: OutputFormat) -> Result<String> {
    if let OutputFormat::Json = format {
        return format_json(settings);
    }

    let value = serde_json::to_value(settings).context("Failed to serialize settings")?;
    let entries: Vec<(String, String)> = match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut output = String::new();
    match format {
        OutputFormat::Csv => {
            output.push_str("key,value\n");
            for (k, v) in &entries {
                output.push_str(&format!("{},{}\n", k, escape_csv(v)));
            }
        }
        _ => {
            for (k, v) in &entries {
                output.push_str(&format!("{:<22} {}\n", k, v));
            }
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::MemorySettingsStore;

    fn manager() -> SettingsManager {
        SettingsManager::load(Box::new(MemorySettingsStore::new()))
    }

    #[test]
    fn test_set_and_reset() {
        let mut manager = manager();

        let out = set(&mut manager, "use_test_data", "false").unwrap();
        assert!(!manager.current().use_test_data);
        assert!(out.contains("useTestData"));

        set(&mut manager, "chartTheme", "dark").unwrap();
        assert!(set(&mut manager, "unknown_key", "1").is_err());

        reset(&mut manager).unwrap();
        assert_eq!(manager.current(), &DashboardSettings::default());
    }

    #[test]
    fn test_show_formats() {
        let manager = manager();
        let json = show(&manager, OutputFormat::Json).unwrap();
        assert!(json.contains("\"defaultCurrency\": \"USD\""));

        let csv = show(&manager, OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("key,value\n"));
        assert!(csv.contains("dateFormat,YYYY-MM-DD\n"));
    }
}
