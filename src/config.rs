use anyhow::Context;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

use crate::domain::format::LowercaseWords;

/// What an override has to look like to replace the default
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Integer within an inclusive range
    Numeric { min: i64, max: i64 },
    /// Must match the regex
    Pattern(&'static Lazy<Regex>),
    Free,
}

impl Rule {
    fn accepts(self, value: &str) -> bool {
        match self {
            Rule::Numeric { min, max } => value
                .trim()
                .parse::<i64>()
                .is_ok_and(|n| (min..=max).contains(&n)),
            Rule::Pattern(pattern) => pattern.is_match(value),
            Rule::Free => true,
        }
    }
}

struct SettingRule {
    key: &'static str,
    default: &'static str,
    rule: Rule,
}

static TRACK_TITLE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)%t").unwrap());

static RECORD_TITLE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)%r").unwrap());

static RULES: [SettingRule; 4] = [
    SettingRule {
        key: "bitrate",
        default: "192",
        rule: Rule::Numeric { min: 128, max: 320 },
    },
    SettingRule {
        key: "lowercase",
        default: "a,and,but,for,in,of,on,the,to",
        rule: Rule::Free,
    },
    SettingRule {
        key: "track.title",
        default: "%n{2} %t",
        rule: Rule::Pattern(&TRACK_TITLE_TOKEN),
    },
    SettingRule {
        key: "record.title",
        default: "(%y{4}) %r",
        rule: Rule::Pattern(&RECORD_TITLE_TOKEN),
    },
];

/// Layout of the optional settings file
#[derive(Debug, Deserialize, Default)]
struct Overrides {
    bitrate: Option<toml::Value>,
    lowercase: Option<toml::Value>,
    #[serde(default)]
    track: TitleOverride,
    #[serde(default)]
    record: TitleOverride,
}

#[derive(Debug, Deserialize, Default)]
struct TitleOverride {
    title: Option<toml::Value>,
}

impl Overrides {
    fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "bitrate" => self.bitrate.as_ref(),
            "lowercase" => self.lowercase.as_ref(),
            "track.title" => self.track.title.as_ref(),
            "record.title" => self.record.title.as_ref(),
            _ => None,
        }?;

        match value {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Formatting settings: compiled-in defaults, selectively replaced by valid overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<&'static str, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            values: RULES
                .iter()
                .map(|rule| (rule.key, rule.default.to_string()))
                .collect(),
        }
    }
}

impl Settings {
    /// Reads overrides from `path`. A missing or malformed file leaves every default in place.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("using default settings: {err:#}");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let overrides: Overrides =
            toml::from_str(contents).with_context(|| "Failed to parse settings TOML")?;
        Ok(Self::merge(&overrides))
    }

    fn merge(overrides: &Overrides) -> Self {
        let mut settings = Self::default();
        for rule in &RULES {
            let Some(value) = overrides.get(rule.key) else {
                continue;
            };
            if rule.rule.accepts(&value) {
                settings.values.insert(rule.key, value);
            } else {
                debug!("discarding invalid setting {} = {value:?}", rule.key);
            }
        }
        settings
    }

    /// Looks a setting up by its dotted key, such as `track.title`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Target bitrate of conversions, in kbit/s
    pub fn bitrate(&self) -> u32 {
        self.value("bitrate").trim().parse().unwrap_or(192)
    }

    pub fn lowercase_words(&self) -> LowercaseWords {
        LowercaseWords::from_list(self.value("lowercase"))
    }

    pub fn track_title(&self) -> &str {
        self.value("track.title")
    }

    pub fn record_title(&self) -> &str {
        self.value("record.title")
    }
}
