use tracing::info;

use crate::models::{NewTeacher, TeacherId, TeacherUpdate};

/// Where validated roster mutations are handed off.
pub trait TeacherStore {
    fn create(&mut self, teacher: &NewTeacher) -> anyhow::Result<TeacherId>;
    fn update(&mut self, id: TeacherId, update: &TeacherUpdate) -> anyhow::Result<()>;
    fn delete(&mut self, ids: &[TeacherId]) -> anyhow::Result<()>;
}

/// Records what would be written without committing anything. The roster data
/// stays exactly as loaded.
#[derive(Debug, Default)]
pub struct LogOnlyStore {
    next_id: TeacherId,
    pub journal: Vec<String>,
}

impl LogOnlyStore {
    pub fn new(next_id: TeacherId) -> Self {
        LogOnlyStore {
            next_id,
            journal: Vec::new(),
        }
    }
}

impl TeacherStore for LogOnlyStore {
    fn create(&mut self, teacher: &NewTeacher) -> anyhow::Result<TeacherId> {
        let payload = serde_json::to_string(teacher)?;
        let id = self.next_id;
        self.next_id += 1;
        info!(id, %payload, "would create teacher");
        self.journal.push(format!("create {id} {payload}"));
        Ok(id)
    }

    fn update(&mut self, id: TeacherId, update: &TeacherUpdate) -> anyhow::Result<()> {
        let payload = serde_json::to_string(update)?;
        info!(id, %payload, "would update teacher");
        self.journal.push(format!("update {id} {payload}"));
        Ok(())
    }

    fn delete(&mut self, ids: &[TeacherId]) -> anyhow::Result<()> {
        info!(?ids, "would delete teachers");
        self.journal.push(format!("delete {ids:?}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, TeacherStatus};

    #[test]
    fn journals_mutations_in_order() {
        let mut store = LogOnlyStore::new(7);
        let teacher = NewTeacher {
            first_name: "Nora".to_string(),
            last_name: "Blake".to_string(),
            email: "nora.blake@school.edu".to_string(),
            phone: None,
            department: Department::Music,
            title: None,
            status: TeacherStatus::Active,
            subjects: None,
            start_date: None,
            notes: None,
            avatar: None,
        };

        assert_eq!(store.create(&teacher).unwrap(), 7);
        assert_eq!(store.create(&teacher).unwrap(), 8);
        store
            .update(
                2,
                &TeacherUpdate {
                    status: Some(TeacherStatus::Active),
                    ..TeacherUpdate::default()
                },
            )
            .unwrap();
        store.delete(&[2, 5]).unwrap();

        assert_eq!(store.journal.len(), 4);
        assert!(store.journal[0].contains("\"firstName\":\"Nora\""));
        assert_eq!(store.journal[2], "update 2 {\"status\":\"active\"}");
        assert_eq!(store.journal[3], "delete [2, 5]");
    }
}
