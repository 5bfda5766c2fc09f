use std::fmt;

use chrono::{Datelike, Local, Weekday};
use serde::{Deserialize, Serialize};

use super::error::StoreError;

pub type Minutes = u32;

/// Longest duration whose countdown still fits in `u32` seconds.
pub const MAX_DURATION: Minutes = u32::MAX / 60;

pub const DAILY_TASKS_KEY: &str = "dailyTasks";
pub const WEEKLY_TASKS_KEY_PREFIX: &str = "weeklyTasks_";
pub const LAST_RESET_DAY_KEY: &str = "lastResetDay";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn generate() -> Self {
        TaskId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a task recurs: every day, or on one weekday only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Daily,
    Weekly(Weekday),
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Daily,
        Category::Weekly(Weekday::Mon),
        Category::Weekly(Weekday::Tue),
        Category::Weekly(Weekday::Wed),
        Category::Weekly(Weekday::Thu),
        Category::Weekly(Weekday::Fri),
        Category::Weekly(Weekday::Sat),
        Category::Weekly(Weekday::Sun),
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Category::Daily => "D",
            Category::Weekly(day) => weekday_code(*day),
        }
    }

    pub fn from_code(code: &str) -> Result<Self, StoreError> {
        match code {
            "D" => Ok(Category::Daily),
            _ => weekday_from_code(code)
                .map(Category::Weekly)
                .ok_or_else(|| StoreError::UnknownCategory(code.to_string())),
        }
    }

    pub fn storage_key(&self) -> String {
        match self {
            Category::Daily => DAILY_TASKS_KEY.to_string(),
            Category::Weekly(day) => format!("{WEEKLY_TASKS_KEY_PREFIX}{}", weekday_code(*day)),
        }
    }

    pub fn is_visible_on(&self, weekday: Weekday) -> bool {
        match self {
            Category::Daily => true,
            Category::Weekly(day) => *day == weekday,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Category::from_code(&code).map_err(serde::de::Error::custom)
    }
}

pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "M",
        Weekday::Tue => "T",
        Weekday::Wed => "W",
        Weekday::Thu => "Th",
        Weekday::Fri => "F",
        Weekday::Sat => "Sa",
        Weekday::Sun => "Su",
    }
}

pub fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code {
        "M" => Some(Weekday::Mon),
        "T" => Some(Weekday::Tue),
        "W" => Some(Weekday::Wed),
        "Th" => Some(Weekday::Thu),
        "F" => Some(Weekday::Fri),
        "Sa" => Some(Weekday::Sat),
        "Su" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Calendar weekday of the local date. Locale has no say in this.
pub fn today() -> Weekday {
    Local::now().date_naive().weekday()
}

pub fn parse_duration(text: &str) -> Result<Minutes, StoreError> {
    match text.trim().parse::<Minutes>() {
        Ok(minutes) if (1..=MAX_DURATION).contains(&minutes) => Ok(minutes),
        _ => Err(StoreError::InvalidDuration(text.to_string())),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    id: TaskId,
    title: String,
    duration: Minutes,
    pub is_completed: bool,
    category: Category,
}

impl Task {
    pub fn new(title: &str, duration: Minutes, category: Category) -> Result<Self, StoreError> {
        Self::restore(TaskId::generate(), title.to_string(), duration, false, category)
    }

    fn restore(
        id: TaskId,
        title: String,
        duration: Minutes,
        is_completed: bool,
        category: Category,
    ) -> Result<Self, StoreError> {
        if title.trim().is_empty() {
            return Err(StoreError::InvalidTitle);
        }
        if !(1..=MAX_DURATION).contains(&duration) {
            return Err(StoreError::InvalidDuration(duration.to_string()));
        }
        Ok(Task { id, title, duration, is_completed, category })
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn duration(&self) -> Minutes {
        self.duration
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn countdown_seconds(&self) -> u32 {
        self.duration * 60
    }
}

/// Stored shape of a task. Field names match what is already on disk.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    title: String,
    duration: Minutes,
    is_completed: bool,
    category: Category,
}

impl TryFrom<TaskRecord> for Task {
    type Error = StoreError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Task::restore(record.id, record.title, record.duration, record.is_completed, record.category)
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        TaskRecord {
            id: task.id,
            title: task.title,
            duration: task.duration,
            is_completed: task.is_completed,
            category: task.category,
        }
    }
}
