use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{CategoryCount, QueryCriteria, RosterPage, TeacherRecord};
use crate::state::RosterState;

pub fn summarize_by<F>(records: &[&TeacherRecord], key: F) -> Vec<CategoryCount>
where
    F: Fn(&TeacherRecord) -> String,
{
    let mut map: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for record in records {
        *map.entry(key(*record)).or_insert(0) += 1;
    }

    let mut counts: Vec<CategoryCount> = map
        .into_iter()
        .map(|(label, count)| CategoryCount { label, count })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts
}

pub fn subjects(record: &TeacherRecord) -> Vec<String> {
    record
        .subjects
        .as_deref()
        .map(|subjects| {
            subjects
                .split(',')
                .map(str::trim)
                .filter(|subject| !subject.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn format_start_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => "Not specified".to_string(),
    }
}

/// Stored avatar, or a generated initials avatar when none is set.
pub fn avatar_url(record: &TeacherRecord) -> String {
    match record.avatar.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => url.to_string(),
        None => format!(
            "https://ui-avatars.com/api/?name={}+{}&background=e5e7eb&color=374151",
            record.first_name, record.last_name
        ),
    }
}

/// One roster line, with a checkbox marker for selected rows.
pub fn render_card(record: &TeacherRecord, selected: bool) -> String {
    let marker = if selected { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{marker} #{} {} <{}> {} | {}",
        record.id,
        record.full_name(),
        record.email,
        record.department,
        record.status.label()
    );
    if let Some(title) = record.title.as_deref().filter(|t| !t.is_empty()) {
        let _ = write!(line, " | {title}");
    }
    line
}

pub fn render_details(record: &TeacherRecord) -> String {
    let mut output = String::new();
    let optional = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or("Not specified")
            .to_string()
    };

    let _ = writeln!(output, "{}", record.full_name());
    let _ = writeln!(output, "{}", optional(&record.title));
    let _ = writeln!(output);
    let _ = writeln!(output, "Status:     {}", record.status.label());
    let _ = writeln!(output, "Email:      {}", record.email);
    let _ = writeln!(output, "Phone:      {}", optional(&record.phone));
    let _ = writeln!(output, "Department: {}", record.department);
    let _ = writeln!(output, "Start date: {}", format_start_date(record.start_date));
    let _ = writeln!(output, "Avatar:     {}", avatar_url(record));

    let subjects = subjects(record);
    if subjects.is_empty() {
        let _ = writeln!(output, "Subjects:   Not specified");
    } else {
        let _ = writeln!(output, "Subjects:   {}", subjects.join(" / "));
    }
    if let Some(notes) = record.notes.as_deref().filter(|n| !n.is_empty()) {
        let _ = writeln!(output);
        let _ = writeln!(output, "{notes}");
    }

    output
}

/// The loaded page as card lines. The "Showing" window only appears when the
/// matches span more than one page.
pub fn render_page(state: &RosterState) -> String {
    let mut output = String::new();
    let records = state.page.as_ref().map_or(&[][..], |page| page.records.as_slice());

    if records.is_empty() {
        let _ = writeln!(output, "No teachers found.");
        let _ = writeln!(
            output,
            "Try adjusting your search or filter to find what you're looking for."
        );
        return output;
    }

    for record in records {
        let _ = writeln!(output, "{}", render_card(record, state.selection.contains(record.id)));
    }

    if state.pagination_visible() {
        if let Some(window) = state.window() {
            let _ = writeln!(
                output,
                "Showing {} to {} of {} teachers",
                window.first, window.last, window.total
            );
        }
    }

    output
}

pub fn build_report(
    criteria: &QueryCriteria,
    matching: &[&TeacherRecord],
    page: &RosterPage,
) -> String {
    let departments = summarize_by(matching, |record| record.department.to_string());
    let statuses = summarize_by(matching, |record| record.status.label().to_string());

    let mut output = String::new();
    let query_label = if criteria.query.is_empty() {
        "any name or email".to_string()
    } else {
        format!("\"{}\"", criteria.query)
    };

    let _ = writeln!(output, "# Teacher Roster Report");
    let _ = writeln!(
        output,
        "Matching {} (department: {}, status: {}): {} teachers",
        query_label,
        criteria.department,
        criteria.status,
        matching.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Department Mix");

    if departments.is_empty() {
        let _ = writeln!(output, "No teachers match these filters.");
    } else {
        for summary in departments.iter() {
            let _ = writeln!(output, "- {}: {}", summary.label, summary.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Status Mix");

    if statuses.is_empty() {
        let _ = writeln!(output, "No teachers match these filters.");
    } else {
        for summary in statuses.iter() {
            let _ = writeln!(output, "- {}: {}", summary.label, summary.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Page {}", criteria.page);

    if page.records.is_empty() {
        let _ = writeln!(output, "No teachers on this page.");
    } else {
        for record in page.records.iter() {
            let _ = writeln!(
                output,
                "- {} ({}, {}) {}",
                record.full_name(),
                record.email,
                record.department,
                record.status.label()
            );
        }
    }

    output
}
