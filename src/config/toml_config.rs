use crate::domain::model::{AvailabilityWindow, ClassroomAvailability, LunchBreak};
use crate::domain::ports::SchedulingSettings;
use crate::utils::error::{DefenseError, Result};
use crate::utils::validation::{
    parse_date_time, parse_time_of_day, validate_non_empty_string, validate_path,
    validate_positive_number, validate_unique_names, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub store: StoreConfig,
    pub schedule: ScheduleSection,
    #[serde(default)]
    pub classrooms: Vec<ClassroomConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSection {
    pub duration_minutes: i64,
    pub clear_existing: Option<bool>,
    pub seed: Option<u64>,
    pub lunch_break: Option<LunchBreakConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LunchBreakConfig {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassroomConfig {
    pub name: String,
    #[serde(default)]
    pub windows: Vec<WindowConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
}

impl ScheduleConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DefenseError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DefenseError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STORE_PATH})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| DefenseError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("store.path", &self.store.path)?;
        validate_positive_number("schedule.duration_minutes", self.schedule.duration_minutes, 1)?;

        if let Some(lunch) = self.lunch_break()? {
            if lunch.end < lunch.start {
                return Err(DefenseError::InvalidConfigValueError {
                    field: "schedule.lunch_break".to_string(),
                    value: format!("{} - {}", lunch.start, lunch.end),
                    reason: "Lunch break must not end before it starts".to_string(),
                });
            }
        }

        for classroom in &self.classrooms {
            validate_non_empty_string("classrooms.name", &classroom.name)?;
        }
        validate_unique_names(
            "classrooms.name",
            self.classrooms.iter().map(|c| c.name.as_str()),
        )?;

        // 時間格式錯誤才算設定錯誤；結束早於開始的時段只會產生零個時段
        self.classrooms()?;
        Ok(())
    }

    pub fn store_path(&self) -> &str {
        &self.store.path
    }

    pub fn seed(&self) -> Option<u64> {
        self.schedule.seed
    }
}

impl SchedulingSettings for ScheduleConfig {
    fn classrooms(&self) -> Result<Vec<ClassroomAvailability>> {
        self.classrooms
            .iter()
            .map(|classroom| {
                let windows = classroom
                    .windows
                    .iter()
                    .map(|w| {
                        Ok(AvailabilityWindow {
                            start: parse_date_time("classrooms.windows.start", &w.start)?,
                            end: parse_date_time("classrooms.windows.end", &w.end)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ClassroomAvailability {
                    name: classroom.name.clone(),
                    windows,
                })
            })
            .collect()
    }

    fn duration_minutes(&self) -> i64 {
        self.schedule.duration_minutes
    }

    fn lunch_break(&self) -> Result<Option<LunchBreak>> {
        self.schedule
            .lunch_break
            .as_ref()
            .map(|lunch| {
                Ok(LunchBreak {
                    start: parse_time_of_day("schedule.lunch_break.start", &lunch.start)?,
                    end: parse_time_of_day("schedule.lunch_break.end", &lunch.end)?,
                })
            })
            .transpose()
    }

    fn clear_existing(&self) -> bool {
        self.schedule.clear_existing.unwrap_or(true)
    }
}

impl Validate for ScheduleConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[store]
path = "./data/defense.json"

[schedule]
duration_minutes = 90

[schedule.lunch_break]
start = "12:00"
end = "13:00"

[[classrooms]]
name = "A-101"
windows = [
    { start = "2024-06-03T08:00", end = "2024-06-03T16:00" },
]

[[classrooms]]
name = "B-202"
windows = [
    { start = "2024-06-03T08:00:00", end = "2024-06-03T12:00:00" },
]
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = ScheduleConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.store_path(), "./data/defense.json");
        assert_eq!(config.duration_minutes(), 90);
        assert!(config.clear_existing());
        assert!(config.validate().is_ok());

        let lunch = config.lunch_break().unwrap().unwrap();
        assert_eq!(lunch.start, NaiveTime::from_hms_opt(12, 0, 0).unwrap());

        let classrooms = config.classrooms().unwrap();
        assert_eq!(classrooms.len(), 2);
        assert_eq!(classrooms[1].windows[0].end.to_string(), "2024-06-03 12:00:00");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DEFENSE_TEST_STORE", "/tmp/defense-store.json");

        let content = BASIC.replace("./data/defense.json", "${DEFENSE_TEST_STORE}");
        let config = ScheduleConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.store_path(), "/tmp/defense-store.json");

        std::env::remove_var("DEFENSE_TEST_STORE");
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let content = BASIC.replace("duration_minutes = 90", "duration_minutes = 0");
        let config = ScheduleConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_lunch_break_is_rejected() {
        let content = BASIC
            .replace("start = \"12:00\"", "start = \"14:00\"")
            .replace("end = \"13:00\"", "end = \"11:00\"");
        let config = ScheduleConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_window_is_valid() {
        let content = BASIC.replace(
            "end = \"2024-06-03T16:00\"",
            "end = \"2024-06-03T07:00\"",
        );
        let config = ScheduleConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_classroom_is_rejected() {
        let content = BASIC.replace("B-202", "A-101");
        let config = ScheduleConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_window_is_rejected() {
        let content = BASIC.replace("2024-06-03T08:00:00", "June 3rd");
        let config = ScheduleConfig::from_toml_str(&content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = ScheduleConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.classrooms.len(), 2);
    }
}
