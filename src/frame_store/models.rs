use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    #[serde(rename = "H")]
    Horizontal,
    #[serde(rename = "V")]
    Vertical,
    #[serde(rename = "S")]
    Square,
}

impl Orientation {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "H" => Some(Orientation::Horizontal),
            "V" => Some(Orientation::Vertical),
            "S" => Some(Orientation::Square),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "H",
            Orientation::Vertical => "V",
            Orientation::Square => "S",
        }
    }

    /// Orientation implied by pixel dimensions.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        match width.cmp(&height) {
            std::cmp::Ordering::Greater => Orientation::Horizontal,
            std::cmp::Ordering::Less => Orientation::Vertical,
            std::cmp::Ordering::Equal => Orientation::Square,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnits {
    Seconds,
    Minutes,
    #[default]
    Hours,
    Days,
}

impl IntervalUnits {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "seconds" => Some(IntervalUnits::Seconds),
            "minutes" => Some(IntervalUnits::Minutes),
            "hours" => Some(IntervalUnits::Hours),
            "days" => Some(IntervalUnits::Days),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            IntervalUnits::Seconds => "seconds",
            IntervalUnits::Minutes => "minutes",
            IntervalUnits::Hours => "hours",
            IntervalUnits::Days => "days",
        }
    }
}

/// Log verbosity requested from the frame's own agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FrameLogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FrameLogLevel {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "DEBUG" => Some(FrameLogLevel::Debug),
            "INFO" => Some(FrameLogLevel::Info),
            "WARN" => Some(FrameLogLevel::Warn),
            "ERROR" => Some(FrameLogLevel::Error),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            FrameLogLevel::Debug => "DEBUG",
            FrameLogLevel::Info => "INFO",
            FrameLogLevel::Warn => "WARN",
            FrameLogLevel::Error => "ERROR",
        }
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub keywords: String,
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
    pub imgtype: Option<String>,
    pub size: u64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Image {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let now = Utc::now();
        Image {
            id: new_id(),
            name: name.into(),
            keywords: String::new(),
            width,
            height,
            orientation: Orientation::from_dimensions(width, height),
            imgtype: None,
            size: 0,
            created: now,
            updated: now,
        }
    }

    pub fn keyword_tokens(&self) -> impl Iterator<Item = &str> {
        self.keywords.split_whitespace()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub orientation: Orientation,
    pub parent_id: Option<String>,
    /// Rule-based membership flag. Persisted only; no rule evaluation happens here.
    pub smart: bool,
    pub rules: Option<String>,
    pub updated: DateTime<Utc>,
}

impl Album {
    pub fn new(name: impl Into<String>, orientation: Orientation) -> Self {
        Album {
            id: new_id(),
            name: name.into(),
            orientation,
            parent_id: None,
            smart: false,
            rules: None,
            updated: Utc::now(),
        }
    }

    pub fn is_sub_album(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Where a frame stands with respect to frameset allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingState {
    Unbound,
    Bound,
    Allocated,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: String,
    pub name: String,
    pub frameset_id: Option<String>,
    pub album_id: Option<String>,
    pub description: Option<String>,
    pub orientation: Orientation,
    pub interval_time: u32,
    pub interval_units: IntervalUnits,
    pub variance_pct: u32,
    pub shutdown: bool,
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub freespace: i64,
    pub ip: Option<String>,
    pub log_level: FrameLogLevel,
    pub updated: DateTime<Utc>,
}

impl Frame {
    pub const DEFAULT_NAME: &'static str = "-new frame-";

    pub fn new(id: impl Into<String>) -> Self {
        Frame {
            id: id.into(),
            name: Self::DEFAULT_NAME.to_string(),
            frameset_id: None,
            album_id: None,
            description: None,
            orientation: Orientation::Horizontal,
            interval_time: 1,
            interval_units: IntervalUnits::Hours,
            variance_pct: 10,
            shutdown: false,
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            freespace: 9999,
            ip: None,
            log_level: FrameLogLevel::Info,
            updated: Utc::now(),
        }
    }

    pub fn binding_state(&self) -> BindingState {
        match (&self.frameset_id, &self.album_id) {
            (None, _) => BindingState::Unbound,
            (Some(_), None) => BindingState::Bound,
            (Some(_), Some(_)) => BindingState::Allocated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frameset {
    pub id: String,
    pub name: String,
    pub user_id: Option<String>,
    pub album_id: Option<String>,
    pub description: Option<String>,
    pub orientation: Orientation,
    pub interval_time: u32,
    pub interval_units: IntervalUnits,
    pub variance_pct: u32,
    pub updated: DateTime<Utc>,
}

impl Frameset {
    pub fn new(name: impl Into<String>) -> Self {
        Frameset {
            id: new_id(),
            name: name.into(),
            user_id: None,
            album_id: None,
            description: None,
            orientation: Orientation::Horizontal,
            interval_time: 1,
            interval_units: IntervalUnits::Hours,
            variance_pct: 10,
            updated: Utc::now(),
        }
    }
}
