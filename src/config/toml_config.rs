use crate::config::settings::{DifficultyThresholds, ResolutionSettings, ScoringWeights, Settings};
use crate::core::{ConfigProvider, SourceDescriptor};
use crate::utils::error::{HeatError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_unique_names, validate_url, Validate,
};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub issue: IssueConfig,
    pub sources: Vec<SourceDescriptor>,
    #[serde(default)]
    pub resolution: ResolutionSettings,
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub difficulty: DifficultyThresholds,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueConfig {
    pub title: String,
    pub max_entities: Option<usize>,
    /// IANA zone name, e.g. "America/New_York"
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

fn default_timezone() -> Tz {
    chrono_tz::America::New_York
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub user_agent: String,
    pub og_image_fallback: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 45,
            retry_attempts: 4,
            retry_delay_seconds: 2,
            user_agent: concat!("nyc-heat-index/", env!("CARGO_PKG_VERSION")).to_string(),
            og_image_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub write_json: Option<bool>,
    /// 上期名單，相對於 output_path
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

fn default_state_file() -> String {
    "state.json".to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HeatError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| HeatError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("issue.title", &self.issue.title)?;

        if self.sources.is_empty() {
            return Err(HeatError::MissingConfigError {
                field: "sources".to_string(),
            });
        }
        validate_unique_names("sources.name", self.sources.iter().map(|s| s.name.as_str()))?;
        for source in &self.sources {
            validate_non_empty_string("sources.name", &source.name)?;
            let url = source.url.as_deref().ok_or_else(|| HeatError::MissingConfigError {
                field: format!("sources.url ({})", source.name),
            })?;
            validate_url("sources.url", url)?;
            validate_range("sources.trust_weight", source.trust_weight, 0.0, 1.0)?;
        }

        self.settings().validate()?;

        validate_positive_number("fetch.retry_attempts", self.fetch.retry_attempts as usize, 1)?;
        validate_positive_number("fetch.timeout_seconds", self.fetch.timeout_seconds as usize, 1)?;
        validate_path("load.output_path", &self.load.output_path)?;
        validate_non_empty_string("load.state_file", &self.load.state_file)?;

        Ok(())
    }

    /// 組合核心管線使用的調參設定
    pub fn settings(&self) -> Settings {
        Settings {
            resolution: self.resolution.clone(),
            scoring: self.scoring.clone(),
            difficulty: self.difficulty.clone(),
            max_entities: self.issue.max_entities,
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn issue_title(&self) -> &str {
        &self.issue.title
    }

    fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    fn settings(&self) -> Settings {
        TomlConfig::settings(self)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn write_json(&self) -> bool {
        self.load.write_json.unwrap_or(true)
    }

    fn timezone(&self) -> Tz {
        self.issue.timezone
    }

    fn state_file(&self) -> &str {
        &self.load.state_file
    }

    fn og_image_fallback(&self) -> bool {
        self.fetch.og_image_fallback
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ExtractionRule;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[issue]
title = "NYC Heat Index"
max_entities = 20

[[sources]]
name = "Resy Hit List (NYC)"
url = "https://blog.resy.com/the-hit-list/nyc-restaurants/"
trust_weight = 1.0
rule = "resy_hit_list"

[[sources]]
name = "Eater Heatmap (Manhattan)"
url = "https://ny.eater.com/maps/best-new-nyc-restaurants-heatmap"
trust_weight = 0.8
ranked = false
rule = "eater_heatmap"

[load]
output_path = "./dist"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.issue.title, "NYC Heat Index");
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].rule, ExtractionRule::ResyHitList);
        assert!(config.sources[0].ranked);
        assert!(!config.sources[1].ranked);
        assert_eq!(config.settings().max_entities, Some(20));
        assert_eq!(config.settings().resolution.similarity_threshold, 0.85);
        assert_eq!(config.fetch, FetchConfig::default());
        assert!(config.write_json());
        assert_eq!(config.timezone(), chrono_tz::America::New_York);
        assert_eq!(config.state_file(), "state.json");
        assert!(config.og_image_fallback());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timezone_and_history_settings() {
        let content = BASIC
            .replace("max_entities = 20", "max_entities = 20\ntimezone = \"UTC\"")
            .replace("output_path = \"./dist\"", "output_path = \"./dist\"\nstate_file = \"history/last.json\"")
            + "\n[fetch]\nog_image_fallback = false\n";
        let config = TomlConfig::from_toml_str(&content).unwrap();

        assert_eq!(config.timezone(), chrono_tz::UTC);
        assert_eq!(config.state_file(), "history/last.json");
        assert!(!config.og_image_fallback());
        assert_eq!(config.fetch.retry_attempts, 4);
    }

    #[test]
    fn test_unknown_timezone_is_a_parse_error() {
        let content = BASIC.replace("max_entities = 20", "max_entities = 20\ntimezone = \"Mars/Olympus_Mons\"");
        assert!(TomlConfig::from_toml_str(&content).is_err());
    }

    #[test]
    fn test_partial_tuning_sections_keep_defaults() {
        let content = format!(
            "{}\n[scoring]\ncross_source = 0.5\n\n[difficulty]\nhard_min_position = 0.9\n",
            BASIC
        );
        let config = TomlConfig::from_toml_str(&content).unwrap();

        assert_eq!(config.scoring.cross_source, 0.5);
        assert_eq!(config.scoring.presence, ScoringWeights::default().presence);
        assert_eq!(config.difficulty.hard_min_position, 0.9);
        assert_eq!(config.difficulty.very_hard_min_sources, 2);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HEAT_INDEX_TEST_OUTPUT", "/tmp/heat-index");

        let content = BASIC.replace("./dist", "${HEAT_INDEX_TEST_OUTPUT}");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.load.output_path, "/tmp/heat-index");

        std::env::remove_var("HEAT_INDEX_TEST_OUTPUT");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = BASIC.replace("https://ny.eater.com", "ny.eater.com");
        assert!(TomlConfig::from_toml_str(&bad_url).unwrap().validate().is_err());

        let bad_weight = BASIC.replace("trust_weight = 0.8", "trust_weight = 1.8");
        assert!(TomlConfig::from_toml_str(&bad_weight).unwrap().validate().is_err());

        let duplicate = BASIC.replace("Eater Heatmap (Manhattan)", "Resy Hit List (NYC)");
        assert!(TomlConfig::from_toml_str(&duplicate).unwrap().validate().is_err());
    }

    #[test]
    fn test_unknown_rule_is_a_parse_error() {
        let content = BASIC.replace("\"eater_heatmap\"", "\"infatuation\"");
        assert!(TomlConfig::from_toml_str(&content).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.issue.title, "NYC Heat Index");
    }
}
