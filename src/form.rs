use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{FieldErrorKind, ValidationErrors};
use crate::models::{Department, NewTeacher, TeacherRecord, TeacherStatus, TeacherUpdate};

/// Raw form submission: field name (camelCase, as in the record schema) to value.
pub type FormFields = BTreeMap<String, String>;

pub const FIELD_NAMES: [&str; 11] = [
    "firstName",
    "lastName",
    "email",
    "phone",
    "department",
    "title",
    "status",
    "subjects",
    "startDate",
    "notes",
    "avatar",
];

/// Validates a create submission. Names, email and department are required;
/// blank optional inputs are treated as absent.
pub fn validate_new(fields: &FormFields) -> Result<NewTeacher, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut reader = FieldReader {
        fields,
        errors: &mut errors,
    };

    let first_name = reader.required("firstName");
    let last_name = reader.required("lastName");
    let email = reader.required("email").and_then(|value| reader.email("email", value));
    let phone = reader.optional("phone");
    let department = reader
        .required("department")
        .and_then(|value| reader.department("department", &value));
    let title = reader.optional("title");
    let status = match reader.optional("status") {
        Some(value) => reader.status("status", &value),
        None => Some(TeacherStatus::default()),
    };
    let subjects = reader.optional("subjects");
    let start_date = match reader.optional("startDate") {
        Some(value) => reader.date("startDate", &value).map(Some),
        None => Some(None),
    };
    let notes = reader.optional("notes");
    let avatar = reader.optional("avatar");
    reader.reject_unknown();

    match (first_name, last_name, email, department, status, start_date) {
        (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(department),
            Some(status),
            Some(start_date),
        ) if errors.is_empty() => Ok(NewTeacher {
            first_name,
            last_name,
            email,
            phone,
            department,
            title,
            status,
            subjects,
            start_date,
            notes,
            avatar,
        }),
        _ => Err(errors),
    }
}

/// Validates an edit submission. Every field is optional; present fields follow
/// the create rules, and a blank optional field clears the stored value.
pub fn validate_update(fields: &FormFields) -> Result<TeacherUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut reader = FieldReader {
        fields,
        errors: &mut errors,
    };

    let mut update = TeacherUpdate::default();
    if reader.present("firstName") {
        update.first_name = reader.required("firstName");
    }
    if reader.present("lastName") {
        update.last_name = reader.required("lastName");
    }
    if reader.present("email") {
        update.email = reader.required("email").and_then(|value| reader.email("email", value));
    }
    if reader.present("department") {
        update.department = reader
            .required("department")
            .and_then(|value| reader.department("department", &value));
    }
    if let Some(value) = reader.optional("status") {
        update.status = reader.status("status", &value);
    }
    if reader.present("startDate") {
        update.start_date = match reader.optional("startDate") {
            Some(value) => reader.date("startDate", &value).map(Some),
            None => Some(None),
        };
    }
    for (name, slot) in [
        ("phone", &mut update.phone),
        ("title", &mut update.title),
        ("subjects", &mut update.subjects),
        ("notes", &mut update.notes),
        ("avatar", &mut update.avatar),
    ] {
        if reader.present(name) {
            *slot = Some(reader.optional(name));
        }
    }
    reader.reject_unknown();

    if errors.is_empty() {
        Ok(update)
    } else {
        Err(errors)
    }
}

/// Field values an edit form starts from for `record`.
pub fn to_form_fields(record: &TeacherRecord) -> FormFields {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    FormFields::from([
        ("firstName".to_string(), record.first_name.clone()),
        ("lastName".to_string(), record.last_name.clone()),
        ("email".to_string(), record.email.clone()),
        ("phone".to_string(), text(&record.phone)),
        ("department".to_string(), record.department.to_string()),
        ("title".to_string(), text(&record.title)),
        ("status".to_string(), record.status.to_string()),
        ("subjects".to_string(), text(&record.subjects)),
        (
            "startDate".to_string(),
            record
                .start_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ),
        ("notes".to_string(), text(&record.notes)),
        ("avatar".to_string(), text(&record.avatar)),
    ])
}

pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty() && !label.starts_with('-') && !label.ends_with('-')
        })
}

struct FieldReader<'a> {
    fields: &'a FormFields,
    errors: &'a mut ValidationErrors,
}

impl FieldReader<'_> {
    fn present(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn value(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn required(&mut self, name: &str) -> Option<String> {
        let value = self.value(name);
        if value.is_none() {
            self.errors.push(name, FieldErrorKind::Missing);
        }
        value
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.value(name)
    }

    fn email(&mut self, name: &str, value: String) -> Option<String> {
        if is_valid_email(&value) {
            Some(value)
        } else {
            self.errors.push(name, FieldErrorKind::MalformedEmail);
            None
        }
    }

    fn department(&mut self, name: &str, value: &str) -> Option<Department> {
        let parsed = value.parse().ok();
        if parsed.is_none() {
            self.errors.push(name, FieldErrorKind::UnknownDepartment);
        }
        parsed
    }

    fn status(&mut self, name: &str, value: &str) -> Option<TeacherStatus> {
        let parsed = value.parse().ok();
        if parsed.is_none() {
            self.errors.push(name, FieldErrorKind::UnknownStatus);
        }
        parsed
    }

    fn date(&mut self, name: &str, value: &str) -> Option<NaiveDate> {
        let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
        if parsed.is_none() {
            self.errors.push(name, FieldErrorKind::MalformedDate);
        }
        parsed
    }

    fn reject_unknown(&mut self) {
        let unknown: Vec<String> = self
            .fields
            .keys()
            .filter(|key| !FIELD_NAMES.contains(&key.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            self.errors.push(&key, FieldErrorKind::UnknownField);
        }
    }
}
