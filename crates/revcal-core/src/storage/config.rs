//! TOML-based planner configuration.
//!
//! Stores the scheduling parameters the planner needs:
//! - Date range and topics-per-day quota
//! - Optimizer trial count and base seed
//! - Topic catalog, fixed per-date topics and quota overrides
//! - Activity days (exams, vacation labels)
//! - Blocked windows for task displacement
//!
//! Configuration is stored at `~/.config/revcal/config.toml`. Dates are ISO
//! strings, e.g. `start_date = "2025-07-08"`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::calendar::{
    Activity, ActivityCalendar, BlockedRange, DateRange, RangePurpose, DEFAULT_VACATION_CAPACITY,
};
use crate::error::{ConfigError, Result};
use crate::scheduler::{OptimizerConfig, SchedulerConfig};
use crate::task::displacement::{DisplacementPolicy, DEFAULT_MAX_HORIZON_DAYS};
use crate::task::{parse_date, TaskType};
use crate::topic::{default_catalog, dedup_topics, Topic};

/// Date range and daily load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_topics_per_day")]
    pub topics_per_day: usize,
    #[serde(default)]
    pub skip_weekends: bool,
}

/// A labelled activity on one date or over a range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

/// A blocked window. Endpoints are checked when the plan is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedConfig {
    pub purpose: RangePurpose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    /// Types displaced by this window; empty means every type
    #[serde(default)]
    pub task_types: Vec<TaskType>,
    /// Daily cap after the window; vacations default to 6
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

/// Displacement settings shared by all windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplacementConfig {
    #[serde(default = "default_unique_day_types")]
    pub unique_day_types: Vec<TaskType>,
    #[serde(default = "default_max_horizon_days")]
    pub max_horizon_days: u32,
}

/// Planner configuration.
///
/// Serialized to/from TOML at `~/.config/revcal/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    /// Topics forced onto a date, keyed by ISO date
    #[serde(default)]
    pub fixed: BTreeMap<String, Vec<String>>,
    /// Quota per date, keyed by ISO date
    #[serde(default)]
    pub quota_overrides: BTreeMap<String, usize>,
    #[serde(default)]
    pub activities: Vec<ActivityConfig>,
    #[serde(default)]
    pub blocked: Vec<BlockedConfig>,
    #[serde(default)]
    pub displacement: DisplacementConfig,
}

// Default functions
fn default_topics_per_day() -> usize {
    4
}
fn default_topics() -> Vec<String> {
    default_catalog()
        .into_iter()
        .map(|t| t.as_str().to_string())
        .collect()
}
fn default_unique_day_types() -> Vec<TaskType> {
    vec![TaskType::FullLengthExam]
}
fn default_max_horizon_days() -> u32 {
    DEFAULT_MAX_HORIZON_DAYS
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            topics_per_day: default_topics_per_day(),
            skip_weekends: false,
        }
    }
}

impl Default for DisplacementConfig {
    fn default() -> Self {
        Self {
            unique_day_types: default_unique_day_types(),
            max_horizon_days: default_max_horizon_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            schedule: ScheduleConfig::default(),
            optimizer: OptimizerConfig::default(),
            fixed: BTreeMap::new(),
            quota_overrides: BTreeMap::new(),
            activities: Vec::new(),
            blocked: Vec::new(),
            displacement: DisplacementConfig::default(),
        }
    }
}

fn parse_key_date(section: &str, key: &str) -> Result<NaiveDate, ConfigError> {
    parse_date(key).map_err(|message| ConfigError::InvalidValue {
        key: format!("{section}.{key}"),
        message,
    })
}

fn require(value: Option<NaiveDate>, key: &str) -> Result<NaiveDate, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

fn checked_range(start: NaiveDate, end: NaiveDate, key: &str) -> Result<DateRange, ConfigError> {
    DateRange::new(start, end).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(ConfigError::MissingKey("config key is empty".to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file in the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        Ok(cfg)
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// Keys that are currently unset (such as `schedule.start_date`) can be
    /// set as long as the section exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        if Self::get_json_value_by_path(&json, key).is_none() {
            Self::insert_optional(&mut json, key)?;
        }
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Make room for an optional leaf that serializes as absent.
    fn insert_optional(json: &mut serde_json::Value, key: &str) -> Result<(), ConfigError> {
        const OPTIONAL_KEYS: &[&str] = &["schedule.start_date", "schedule.end_date"];
        if !OPTIONAL_KEYS.contains(&key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        if let Some((section, leaf)) = key.split_once('.') {
            if let Some(obj) = json.get_mut(section).and_then(|v| v.as_object_mut()) {
                obj.insert(leaf.to_string(), serde_json::Value::Null);
            }
        }
        Ok(())
    }

    /// Scheduling window; both endpoints are required.
    pub fn date_range(&self) -> Result<DateRange, ConfigError> {
        let start = require(self.schedule.start_date, "schedule.start_date")?;
        let end = require(self.schedule.end_date, "schedule.end_date")?;
        checked_range(start, end, "schedule.end_date")
    }

    /// Topic catalog without blanks or duplicates.
    pub fn catalog(&self) -> Vec<Topic> {
        dedup_topics(self.topics.iter().map(|t| Topic::new(t.as_str())))
    }

    /// Rotation settings: quota, fixed topics, per-date overrides.
    pub fn scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        if self.schedule.topics_per_day == 0 {
            return Err(ConfigError::InvalidValue {
                key: "schedule.topics_per_day".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let mut config = SchedulerConfig::new(self.schedule.topics_per_day);
        for (key, topics) in &self.fixed {
            let date = parse_key_date("fixed", key)?;
            config = config.with_fixed(date, topics.iter().map(|t| Topic::new(t.as_str())).collect());
        }
        for (key, quota) in &self.quota_overrides {
            let date = parse_key_date("quota_overrides", key)?;
            config = config.with_quota(date, *quota);
        }
        Ok(config)
    }

    /// Activity days from `activities` and `skip_weekends`.
    pub fn activity_calendar(&self) -> Result<ActivityCalendar, ConfigError> {
        let mut calendar = ActivityCalendar::new().with_weekends(self.schedule.skip_weekends);

        for (i, entry) in self.activities.iter().enumerate() {
            let activity = Activity::new(entry.label.clone());
            calendar = match (entry.date, entry.start, entry.end) {
                (Some(date), None, None) => calendar.with_date(date, activity),
                (None, Some(start), Some(end)) => {
                    let range = checked_range(start, end, &format!("activities[{i}].end"))?;
                    calendar.with_range(range, activity)
                }
                (None, Some(_), None) => {
                    return Err(ConfigError::MissingKey(format!("activities[{i}].end")))
                }
                (None, None, Some(_)) => {
                    return Err(ConfigError::MissingKey(format!("activities[{i}].start")))
                }
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: format!("activities[{i}]"),
                        message: "set either `date` or both `start` and `end`".to_string(),
                    })
                }
            };
        }
        Ok(calendar)
    }

    /// Blocked windows; both endpoints of every window are required.
    pub fn blocked_ranges(&self) -> Result<Vec<BlockedRange>, ConfigError> {
        self.blocked
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let start = require(entry.start, &format!("blocked[{i}].start"))?;
                let end = require(entry.end, &format!("blocked[{i}].end"))?;
                let range = checked_range(start, end, &format!("blocked[{i}].end"))?;

                let task_types = if entry.task_types.is_empty() {
                    TaskType::ALL.to_vec()
                } else {
                    entry.task_types.clone()
                };
                let capacity = entry.capacity.or(match entry.purpose {
                    RangePurpose::Vacation => Some(DEFAULT_VACATION_CAPACITY),
                    RangePurpose::Conference | RangePurpose::Activity => None,
                });
                if capacity == Some(0) {
                    return Err(ConfigError::InvalidValue {
                        key: format!("blocked[{i}].capacity"),
                        message: "must be at least 1".to_string(),
                    });
                }

                Ok(BlockedRange::new(range, entry.purpose, task_types, capacity))
            })
            .collect()
    }

    /// Displacement policy built from `blocked` and `displacement`.
    pub fn displacement_policy(&self) -> Result<DisplacementPolicy, ConfigError> {
        if self.displacement.max_horizon_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "displacement.max_horizon_days".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(DisplacementPolicy {
            blocked: self.blocked_ranges()?,
            unique_day_types: self.displacement.unique_day_types.clone(),
            max_horizon_days: self.displacement.max_horizon_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use indoc::indoc;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    const SAMPLE: &str = indoc! {r#"
        topics = ["Gen chem 1-2", "Gen chem 3-4", "Physics 1-2"]

        [schedule]
        start_date = "2025-07-08"
        end_date = "2025-09-01"
        topics_per_day = 2
        skip_weekends = true

        [optimizer]
        trials = 50

        [fixed]
        "2025-07-10" = ["Physics 1-2"]

        [quota_overrides]
        "2025-07-11" = 1

        [[activities]]
        label = "FL Practice Exam"
        date = "2025-07-19"

        [[activities]]
        label = "Vacation"
        start = "2025-08-01"
        end = "2025-08-03"

        [[blocked]]
        purpose = "vacation"
        start = "2025-08-01"
        end = "2025-08-03"
        task_types = ["1-Day Review", "3-Day Review"]

        [[blocked]]
        purpose = "conference"
        start = "2025-07-23"
        end = "2025-07-25"
    "#};

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.schedule.topics_per_day, 4);
        assert_eq!(parsed.optimizer.trials, 200);
        assert_eq!(parsed.topics.len(), 32);
        assert!(parsed.schedule.start_date.is_none());
    }

    #[test]
    fn sample_config_parses() {
        let cfg: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.date_range().unwrap(), DateRange::new(d(7, 8), d(9, 1)).unwrap());
        assert_eq!(cfg.optimizer.trials, 50);
        assert_eq!(cfg.optimizer.base_seed, 0);
        assert_eq!(cfg.catalog().len(), 3);

        let scheduler = cfg.scheduler_config().unwrap();
        assert_eq!(scheduler.quota(d(7, 11)), 1);
        assert_eq!(scheduler.quota(d(7, 12)), 2);
        assert_eq!(scheduler.fixed_assignments[&d(7, 10)], vec![Topic::new("Physics 1-2")]);
    }

    #[test]
    fn sample_blocked_ranges_get_defaults() {
        let cfg: Config = toml::from_str(SAMPLE).unwrap();
        let blocked = cfg.blocked_ranges().unwrap();
        assert_eq!(blocked[0].capacity, Some(6));
        assert_eq!(blocked[0].task_types.len(), 2);
        assert_eq!(blocked[1].capacity, None);
        assert_eq!(blocked[1].task_types.len(), TaskType::ALL.len());
    }

    #[test]
    fn sample_activities_build_calendar() {
        use crate::calendar::DayClassifier;

        let cfg: Config = toml::from_str(SAMPLE).unwrap();
        let calendar = cfg.activity_calendar().unwrap();
        assert_eq!(calendar.activity(d(7, 19)), Some(Activity::practice_exam()));
        assert_eq!(calendar.activity(d(8, 2)), Some(Activity::vacation()));
        // 2025-07-12 is a Saturday
        assert_eq!(calendar.activity(d(7, 12)), Some(Activity::weekend()));
    }

    #[test]
    fn missing_endpoint_is_reported() {
        let mut cfg = Config::default();
        cfg.schedule.start_date = Some(d(7, 8));
        assert!(matches!(cfg.date_range(), Err(ConfigError::MissingKey(k)) if k == "schedule.end_date"));

        cfg.blocked.push(BlockedConfig {
            purpose: RangePurpose::Conference,
            start: Some(d(7, 20)),
            end: None,
            task_types: Vec::new(),
            capacity: None,
        });
        assert!(matches!(cfg.blocked_ranges(), Err(ConfigError::MissingKey(k)) if k == "blocked[0].end"));
    }

    #[test]
    fn inverted_range_is_reported() {
        let mut cfg = Config::default();
        cfg.schedule.start_date = Some(d(9, 1));
        cfg.schedule.end_date = Some(d(7, 8));
        assert!(matches!(cfg.date_range(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn zero_quota_is_rejected() {
        let mut cfg = Config::default();
        cfg.schedule.topics_per_day = 0;
        assert!(cfg.scheduler_config().is_err());
    }

    #[test]
    fn bad_fixed_date_key_is_rejected() {
        let mut cfg = Config::default();
        cfg.fixed.insert("next tuesday".to_string(), vec!["Bio 1-2".to_string()]);
        let err = cfg.scheduler_config().unwrap_err();
        assert!(err.to_string().contains("fixed.next tuesday"));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("schedule.topics_per_day").as_deref(), Some("4"));
        assert_eq!(cfg.get("schedule.skip_weekends").as_deref(), Some("false"));
        assert_eq!(cfg.get("optimizer.trials").as_deref(), Some("200"));
        assert!(cfg.get("schedule.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("schedule.topics_per_day", "3").unwrap();
        cfg.set("schedule.skip_weekends", "true").unwrap();
        cfg.set("schedule.start_date", "2025-07-08").unwrap();
        assert_eq!(cfg.schedule.topics_per_day, 3);
        assert!(cfg.schedule.skip_weekends);
        assert_eq!(cfg.schedule.start_date, Some(d(7, 8)));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("schedule.nonexistent_key", "1").is_err());
        assert!(cfg.set("schedule.skip_weekends", "not_a_bool").is_err());
        assert!(cfg.set("schedule.start_date", "July 8").is_err());
        assert_eq!(cfg.schedule.start_date, None);
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.schedule.start_date = Some(d(7, 8));
        cfg.optimizer.trials = 12;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.schedule.start_date, Some(d(7, 8)));
        assert_eq!(loaded.optimizer.trials, 12);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[schedule]\ntopics_per_day = \"four\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CoreError::Toml(_))));
    }
}
