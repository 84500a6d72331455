use crate::models::{QueryCriteria, RosterPage, TeacherRecord};

/// Filters `records` by `criteria` and returns the requested page along with the
/// number of records that matched before slicing.
pub fn compute_page(records: &[TeacherRecord], criteria: &QueryCriteria) -> RosterPage {
    let matching: Vec<&TeacherRecord> = filter_records(records, criteria).collect();
    let total_matches = matching.len();

    let page_size = criteria.page_size.max(1);
    let start = (criteria.page.max(1) - 1).saturating_mul(page_size);
    let records = matching
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    RosterPage {
        records,
        total_matches,
    }
}

/// Every record matching the text, department and status filters, in input order.
/// Page fields of `criteria` are ignored.
pub fn filter_records<'a>(
    records: &'a [TeacherRecord],
    criteria: &'a QueryCriteria,
) -> impl Iterator<Item = &'a TeacherRecord> + 'a {
    let needle = criteria.query.to_lowercase();
    records.iter().filter(move |record| {
        matches_query(record, &needle)
            && criteria.department.matches(&record.department)
            && criteria.status.matches(&record.status)
    })
}

// Only names and email are searched; subjects and department are not.
fn matches_query(record: &TeacherRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.first_name.to_lowercase().contains(needle)
        || record.last_name.to_lowercase().contains(needle)
        || record.email.to_lowercase().contains(needle)
}

pub fn total_pages(total_matches: usize, page_size: usize) -> usize {
    total_matches.div_ceil(page_size.max(1))
}

/// The "Showing `first` to `last` of `total`" window for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

impl PageWindow {
    pub fn new(page: usize, page_size: usize, total: usize) -> Option<Self> {
        let page_size = page_size.max(1);
        let skipped = (page.max(1) - 1).saturating_mul(page_size);
        if skipped >= total {
            return None;
        }
        Some(PageWindow {
            first: skipped + 1,
            last: page.max(1).saturating_mul(page_size).min(total),
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, Filter, TeacherStatus};
    use crate::roster::sample_teachers;

    fn names(page: &RosterPage) -> Vec<String> {
        page.records.iter().map(TeacherRecord::full_name).collect()
    }

    #[test]
    fn empty_criteria_returns_everything() {
        let teachers = sample_teachers();
        let page = compute_page(&teachers, &QueryCriteria::default());
        assert_eq!(page.total_matches, 6);
        assert_eq!(page.records, teachers);
    }

    #[test]
    fn department_filter_keeps_science_staff() {
        let criteria = QueryCriteria {
            department: Filter::Only(Department::Science),
            ..QueryCriteria::default()
        };
        let page = compute_page(&sample_teachers(), &criteria);
        assert_eq!(page.total_matches, 2);
        assert_eq!(names(&page), vec!["James Wilson", "Robert Martinez"]);
    }

    #[test]
    fn text_query_is_case_insensitive() {
        let criteria = QueryCriteria {
            query: "CARTER".to_string(),
            ..QueryCriteria::default()
        };
        let page = compute_page(&sample_teachers(), &criteria);
        assert_eq!(page.total_matches, 1);
        assert_eq!(names(&page), vec!["Emily Carter"]);
    }

    #[test]
    fn text_query_does_not_search_subjects() {
        let criteria = QueryCriteria {
            query: "calculus".to_string(),
            ..QueryCriteria::default()
        };
        assert_eq!(compute_page(&sample_teachers(), &criteria).total_matches, 0);
    }

    #[test]
    fn filters_combine_conjunctively() {
        let criteria = QueryCriteria {
            department: Filter::Only(Department::Science),
            status: Filter::Only(TeacherStatus::Active),
            ..QueryCriteria::default()
        };
        let page = compute_page(&sample_teachers(), &criteria);
        assert_eq!(names(&page), vec!["Robert Martinez"]);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let criteria = QueryCriteria {
            page: 2,
            ..QueryCriteria::default()
        };
        let page = compute_page(&sample_teachers(), &criteria);
        assert!(page.records.is_empty());
        assert_eq!(page.total_matches, 6);
    }

    #[test]
    fn smaller_pages_slice_in_order() {
        let criteria = QueryCriteria {
            page: 2,
            page_size: 4,
            ..QueryCriteria::default()
        };
        let page = compute_page(&sample_teachers(), &criteria);
        assert_eq!(names(&page), vec!["Lisa Chen", "Robert Martinez"]);
    }

    #[test]
    fn page_window_matches_summary_line() {
        assert_eq!(
            PageWindow::new(2, 4, 6),
            Some(PageWindow {
                first: 5,
                last: 6,
                total: 6
            })
        );
        assert_eq!(PageWindow::new(3, 4, 6), None);
        assert_eq!(PageWindow::new(usize::MAX, 6, 6), None);
        assert_eq!(
            PageWindow::new(1, usize::MAX, 6).map(|window| window.last),
            Some(6)
        );
        assert_eq!(total_pages(6, 4), 2);
        assert_eq!(total_pages(0, 6), 0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::{Department, Filter, TeacherStatus};
    use proptest::prelude::*;

    fn arb_department() -> impl Strategy<Value = Department> {
        prop::sample::select(Department::ALL.to_vec())
    }

    fn arb_status() -> impl Strategy<Value = TeacherStatus> {
        prop::sample::select(TeacherStatus::ALL.to_vec())
    }

    fn arb_roster() -> impl Strategy<Value = Vec<TeacherRecord>> {
        prop::collection::vec(
            (
                "[A-Za-z]{1,6}",
                "[A-Za-z]{1,6}",
                "[a-z]{1,5}",
                arb_department(),
                arb_status(),
            ),
            0..20,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(index, (first, last, mailbox, department, status))| TeacherRecord {
                    id: index as u32 + 1,
                    first_name: first,
                    last_name: last,
                    email: format!("{mailbox}{index}@school.edu"),
                    phone: None,
                    department,
                    title: None,
                    status,
                    subjects: None,
                    start_date: None,
                    notes: None,
                    avatar: None,
                })
                .collect()
        })
    }

    fn arb_filter<T: Clone + std::fmt::Debug>(
        values: impl Strategy<Value = T>,
    ) -> impl Strategy<Value = Filter<T>> {
        prop_oneof![Just(Filter::All), values.prop_map(Filter::Only)]
    }

    fn arb_criteria() -> impl Strategy<Value = QueryCriteria> {
        (
            "[a-zA-Z]{0,2}",
            arb_filter(arb_department()),
            arb_filter(arb_status()),
            1usize..8,
        )
            .prop_map(|(query, department, status, page_size)| QueryCriteria {
                query,
                department,
                status,
                page: 1,
                page_size,
            })
    }

    fn contains_ci(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }

    proptest! {
        #[test]
        fn empty_criteria_counts_whole_roster(roster in arb_roster(), page_size in 1usize..8) {
            let criteria = QueryCriteria { page_size, ..QueryCriteria::default() };
            let page = compute_page(&roster, &criteria);
            prop_assert_eq!(page.total_matches, roster.len());
            prop_assert_eq!(page.records.len(), roster.len().min(page_size));
        }

        #[test]
        fn query_partitions_roster(roster in arb_roster(), query in "[a-zA-Z]{1,2}") {
            let criteria = QueryCriteria { query: query.clone(), page_size: roster.len().max(1), ..QueryCriteria::default() };
            let page = compute_page(&roster, &criteria);
            for record in &roster {
                let hit = contains_ci(&record.first_name, &query)
                    || contains_ci(&record.last_name, &query)
                    || contains_ci(&record.email, &query);
                prop_assert_eq!(page.records.contains(record), hit);
            }
        }

        #[test]
        fn enum_filters_partition_roster(roster in arb_roster(), criteria in arb_criteria()) {
            let criteria = QueryCriteria { query: String::new(), ..criteria };
            let kept: Vec<&TeacherRecord> = filter_records(&roster, &criteria).collect();
            for record in &roster {
                let hit = criteria.department.matches(&record.department)
                    && criteria.status.matches(&record.status);
                prop_assert_eq!(kept.contains(&record), hit);
            }
        }

        #[test]
        fn pages_concatenate_to_filtered_sequence(roster in arb_roster(), criteria in arb_criteria()) {
            let expected: Vec<TeacherRecord> = filter_records(&roster, &criteria).cloned().collect();
            let first = compute_page(&roster, &criteria);
            let pages = total_pages(first.total_matches, criteria.page_size);

            let mut collected = Vec::new();
            for page in 1..=pages {
                let current = QueryCriteria { page, ..criteria.clone() };
                collected.extend(compute_page(&roster, &current).records);
            }

            prop_assert_eq!(collected, expected);
            let past_end = QueryCriteria { page: pages + 1, ..criteria.clone() };
            prop_assert!(compute_page(&roster, &past_end).records.is_empty());
        }
    }
}
