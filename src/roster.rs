use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::{Department, QueryCriteria, RosterPage, TeacherId, TeacherRecord, TeacherStatus};
use crate::query;

pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(500);

pub fn sample_teachers() -> Vec<TeacherRecord> {
    let rows = [
        (
            1,
            "Emily",
            "Carter",
            "emily.carter@school.edu",
            "+1 (555) 123-4567",
            Department::Mathematics,
            "Mathematics Department Head",
            TeacherStatus::Active,
            "Algebra II, Calculus, Statistics",
            (2020, 9, 1),
            "photo-1494790108755-2616b612b77c",
        ),
        (
            2,
            "James",
            "Wilson",
            "james.wilson@school.edu",
            "+1 (555) 234-5678",
            Department::Science,
            "Physics Teacher",
            TeacherStatus::OnLeave,
            "Physics, Advanced Physics",
            (2019, 8, 15),
            "photo-1472099645785-5658abf4ff4e",
        ),
        (
            3,
            "Sarah",
            "Rodriguez",
            "sarah.rodriguez@school.edu",
            "+1 (555) 345-6789",
            Department::English,
            "English Literature",
            TeacherStatus::Active,
            "English Literature, Creative Writing",
            (2021, 1, 10),
            "photo-1438761681033-6461ffad8d80",
        ),
        (
            4,
            "Michael",
            "Thompson",
            "michael.thompson@school.edu",
            "+1 (555) 456-7890",
            Department::History,
            "History Department",
            TeacherStatus::Inactive,
            "World History, American History",
            (2018, 9, 1),
            "photo-1507003211169-0a1dd7228f2d",
        ),
        (
            5,
            "Lisa",
            "Chen",
            "lisa.chen@school.edu",
            "+1 (555) 567-8901",
            Department::Art,
            "Art & Design",
            TeacherStatus::Active,
            "Visual Arts, Digital Design",
            (2022, 2, 15),
            "photo-1544005313-94ddf0286df2",
        ),
        (
            6,
            "Robert",
            "Martinez",
            "robert.martinez@school.edu",
            "+1 (555) 678-9012",
            Department::Science,
            "Chemistry Lab",
            TeacherStatus::Active,
            "Chemistry, Organic Chemistry",
            (2020, 1, 20),
            "photo-1560250097-0b93528c311a",
        ),
    ];

    rows.into_iter()
        .map(
            |(id, first, last, email, phone, department, title, status, subjects, start, photo)| {
                let (year, month, day) = start;
                TeacherRecord {
                    id,
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    email: email.to_string(),
                    phone: Some(phone.to_string()),
                    department,
                    title: Some(title.to_string()),
                    status,
                    subjects: Some(subjects.to_string()),
                    start_date: NaiveDate::from_ymd_opt(year, month, day),
                    notes: None,
                    avatar: Some(format!(
                        "https://images.unsplash.com/{photo}?w=150&h=150&fit=crop&crop=face"
                    )),
                }
            },
        )
        .collect()
}

pub fn next_id(records: &[TeacherRecord]) -> TeacherId {
    records.iter().map(|record| record.id).max().unwrap_or(0) + 1
}

pub fn find(records: &[TeacherRecord], id: TeacherId) -> Option<&TeacherRecord> {
    records.iter().find(|record| record.id == id)
}

/// Loads a roster from CSV using the same camelCase columns `write_csv` emits.
pub fn import_csv(csv_path: &Path) -> anyhow::Result<Vec<TeacherRecord>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open roster file {}", csv_path.display()))?;
    let mut records = Vec::new();

    for (index, result) in reader.deserialize::<TeacherRecord>().enumerate() {
        let record = result.with_context(|| format!("invalid roster row {}", index + 1))?;
        records.push(record);
    }

    warn_on_duplicates(&records);
    debug!(count = records.len(), path = %csv_path.display(), "imported roster");
    Ok(records)
}

/// Blank optional values are written as empty cells, so `Some("")` reads back as
/// `None`; blank and absent mean the same thing throughout the roster.
pub fn write_csv(out: &Path, records: &[TeacherRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json(out: &Path, records: &[TeacherRecord]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(out, json).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

// Uniqueness is a property of the data set, so violations are reported, not fixed.
fn warn_on_duplicates(records: &[TeacherRecord]) {
    let mut ids = HashSet::new();
    let mut emails = HashSet::new();
    for record in records {
        if !ids.insert(record.id) {
            warn!(id = record.id, "duplicate teacher id in roster");
        }
        if !emails.insert(record.email.to_lowercase()) {
            warn!(email = %record.email, "duplicate teacher email in roster");
        }
    }
}

/// Stand-in for a remote roster query: waits `delay`, then runs the pipeline.
pub async fn fetch_page(
    records: Arc<Vec<TeacherRecord>>,
    criteria: QueryCriteria,
    delay: Duration,
) -> RosterPage {
    tokio::time::sleep(delay).await;
    query::compute_page(&records, &criteria)
}

/// Keeps at most one roster fetch in flight. A new request aborts the previous
/// one, so only the latest criteria ever produce a page.
pub struct RosterFetcher {
    records: Arc<Vec<TeacherRecord>>,
    delay: Duration,
    pending: Option<JoinHandle<RosterPage>>,
}

impl RosterFetcher {
    pub fn new(records: Vec<TeacherRecord>, delay: Duration) -> Self {
        RosterFetcher {
            records: Arc::new(records),
            delay,
            pending: None,
        }
    }

    pub fn request(&mut self, criteria: QueryCriteria) {
        if let Some(previous) = self.pending.take() {
            debug!("superseding pending roster fetch");
            previous.abort();
        }
        let records = Arc::clone(&self.records);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(fetch_page(records, criteria, delay)));
    }

    pub fn is_loading(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Waits for the latest request. Returns `None` when nothing is pending.
    pub async fn settle(&mut self) -> anyhow::Result<Option<RosterPage>> {
        match self.pending.take() {
            Some(handle) => {
                let page = handle.await.context("roster fetch task failed")?;
                Ok(Some(page))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Filter;

    #[test]
    fn seed_has_unique_ids_and_emails() {
        let teachers = sample_teachers();
        let ids: HashSet<_> = teachers.iter().map(|t| t.id).collect();
        let emails: HashSet<_> = teachers.iter().map(|t| t.email.as_str()).collect();
        assert_eq!(teachers.len(), 6);
        assert_eq!(ids.len(), 6);
        assert_eq!(emails.len(), 6);
        assert_eq!(next_id(&teachers), 7);
        assert_eq!(find(&teachers, 4).map(|t| t.last_name.as_str()), Some("Thompson"));
    }

    #[test]
    fn csv_export_reimports_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        let teachers = sample_teachers();

        write_csv(&path, &teachers).unwrap();
        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("id,firstName,lastName,email,phone,department"));
        assert_eq!(import_csv(&path).unwrap(), teachers);
    }

    #[test]
    fn blank_cells_read_back_as_absent_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        let mut teacher = sample_teachers().remove(0);
        teacher.notes = Some(String::new());
        write_csv(&path, std::slice::from_ref(&teacher)).unwrap();

        let imported = import_csv(&path).unwrap().remove(0);
        assert_eq!(imported.notes, None);
        assert_eq!(imported.subjects, teacher.subjects);

        std::fs::write(
            &path,
            "id,firstName,lastName,email,phone,department,title,status,subjects,startDate,notes,avatar\n\
             7,Ada,Lovelace,ada@school.edu,,Mathematics,,,,,,\n",
        )
        .unwrap();
        let imported = import_csv(&path).unwrap().remove(0);
        assert_eq!(imported.status, TeacherStatus::Active);
        assert_eq!(imported.phone, None);
        assert_eq!(imported.start_date, None);
    }

    #[test]
    fn import_reports_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        std::fs::write(
            &path,
            "id,firstName,lastName,email,phone,department,title,status,subjects,startDate,notes,avatar\n\
             1,Ada,Lovelace,ada@school.edu,,Drama,,active,,,,\n",
        )
        .unwrap();

        let err = import_csv(&path).unwrap_err();
        assert!(err.to_string().contains("invalid roster row 1"));
    }

    #[tokio::test]
    async fn fetch_waits_then_computes() {
        let page = fetch_page(
            Arc::new(sample_teachers()),
            QueryCriteria::default(),
            Duration::from_millis(5),
        )
        .await;
        assert_eq!(page.total_matches, 6);
    }

    #[tokio::test]
    async fn newer_request_supersedes_pending_one() {
        let mut fetcher = RosterFetcher::new(sample_teachers(), Duration::from_millis(20));
        assert!(fetcher.settle().await.unwrap().is_none());

        fetcher.request(QueryCriteria::default());
        assert!(fetcher.is_loading());
        fetcher.request(QueryCriteria {
            department: Filter::Only(Department::Art),
            ..QueryCriteria::default()
        });

        let page = fetcher.settle().await.unwrap().unwrap();
        assert_eq!(page.total_matches, 1);
        assert_eq!(page.records[0].first_name, "Lisa");
        assert!(!fetcher.is_loading());
    }
}
