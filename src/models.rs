use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FilterParseError;

pub type TeacherId = u32;

pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    Mathematics,
    Science,
    English,
    History,
    Art,
    #[serde(rename = "Physical Education")]
    PhysicalEducation,
    Music,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::Mathematics,
        Department::Science,
        Department::English,
        Department::History,
        Department::Art,
        Department::PhysicalEducation,
        Department::Music,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Mathematics => "Mathematics",
            Department::Science => "Science",
            Department::English => "English",
            Department::History => "History",
            Department::Art => "Art",
            Department::PhysicalEducation => "Physical Education",
            Department::Music => "Music",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|department| department.as_str() == value)
            .ok_or_else(|| FilterParseError::UnknownDepartment(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeacherStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
}

impl TeacherStatus {
    pub const ALL: [TeacherStatus; 3] = [
        TeacherStatus::Active,
        TeacherStatus::Inactive,
        TeacherStatus::OnLeave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeacherStatus::Active => "active",
            TeacherStatus::Inactive => "inactive",
            TeacherStatus::OnLeave => "on-leave",
        }
    }

    /// Human label, e.g. `on-leave` becomes `On Leave`.
    pub fn label(&self) -> &'static str {
        match self {
            TeacherStatus::Active => "Active",
            TeacherStatus::Inactive => "Inactive",
            TeacherStatus::OnLeave => "On Leave",
        }
    }
}

impl fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeacherStatus {
    type Err = FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TeacherStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| FilterParseError::UnknownStatus(value.to_string()))
    }
}

/// One dimension of the roster filter. `All` is the "do not filter" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }
}

impl<T> FromStr for Filter<T>
where
    T: FromStr<Err = FilterParseError>,
{
    type Err = FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("all") {
            Ok(Filter::All)
        } else {
            value.parse().map(Filter::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Only(value) => value.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub department: Department,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: TeacherStatus,
    #[serde(default)]
    pub subjects: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl TeacherRecord {
    pub fn from_new(id: TeacherId, new: NewTeacher) -> Self {
        TeacherRecord {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            department: new.department,
            title: new.title,
            status: new.status,
            subjects: new.subjects,
            start_date: new.start_date,
            notes: new.notes,
            avatar: new.avatar,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// A blank status cell means the schema default, like a missing column does.
fn status_or_default<'de, D>(deserializer: D) -> Result<TeacherStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(TeacherStatus::default())
    } else {
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Validated create payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacher {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Department,
    pub title: Option<String>,
    pub status: TeacherStatus,
    pub subjects: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub avatar: Option<String>,
}

/// Validated edit payload. For optional columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TeacherStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Option<String>>,
}

impl TeacherUpdate {
    pub fn apply(&self, record: &TeacherRecord) -> TeacherRecord {
        let mut updated = record.clone();
        if let Some(value) = &self.first_name {
            updated.first_name = value.clone();
        }
        if let Some(value) = &self.last_name {
            updated.last_name = value.clone();
        }
        if let Some(value) = &self.email {
            updated.email = value.clone();
        }
        if let Some(value) = &self.phone {
            updated.phone = value.clone();
        }
        if let Some(value) = self.department {
            updated.department = value;
        }
        if let Some(value) = &self.title {
            updated.title = value.clone();
        }
        if let Some(value) = self.status {
            updated.status = value;
        }
        if let Some(value) = &self.subjects {
            updated.subjects = value.clone();
        }
        if let Some(value) = self.start_date {
            updated.start_date = value;
        }
        if let Some(value) = &self.notes {
            updated.notes = value.clone();
        }
        if let Some(value) = &self.avatar {
            updated.avatar = value.clone();
        }
        updated
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCriteria {
    pub query: String,
    pub department: Filter<Department>,
    pub status: Filter<TeacherStatus>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for QueryCriteria {
    fn default() -> Self {
        QueryCriteria {
            query: String::new(),
            department: Filter::All,
            status: Filter::All,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPage {
    pub records: Vec<TeacherRecord>,
    pub total_matches: usize,
}

#[derive(Debug, Clone)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}
