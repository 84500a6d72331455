use crate::form::{self, FormFields};
use crate::models::{Department, Filter, QueryCriteria, RosterPage, TeacherId, TeacherRecord, TeacherStatus};
use crate::query::{self, PageWindow};
use crate::selection::SelectionSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TeacherRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    SearchChanged(String),
    DepartmentChanged(Filter<Department>),
    StatusChanged(Filter<TeacherStatus>),
    PageSizeChanged(usize),
    GoToPage(usize),
    PageLoaded(RosterPage),
    SelectionToggled { id: TeacherId, included: bool },
    SelectionCleared,
    BulkDeleteConfirmed,
    CreateFormOpened,
    EditFormOpened(TeacherRecord),
    FormClosed,
}

/// Work the caller has to carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(QueryCriteria),
    Delete(Vec<TeacherId>),
}

/// Everything the roster view keeps between events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterState {
    pub criteria: QueryCriteria,
    pub selection: SelectionSet,
    pub page: Option<RosterPage>,
    pub loading: bool,
    pub form: Option<FormMode>,
}

impl RosterState {
    pub fn new(page_size: usize) -> Self {
        RosterState {
            criteria: QueryCriteria {
                page_size: page_size.max(1),
                ..QueryCriteria::default()
            },
            selection: SelectionSet::new(),
            page: None,
            loading: false,
            form: None,
        }
    }

    /// The fetch a freshly opened view starts with.
    pub fn initial_fetch(&mut self) -> Effect {
        self.loading = true;
        Effect::Fetch(self.criteria.clone())
    }

    pub fn apply(mut self, event: RosterEvent) -> (RosterState, Option<Effect>) {
        let effect = match event {
            RosterEvent::SearchChanged(query) => {
                self.criteria.query = query;
                self.refetch_from_first_page()
            }
            RosterEvent::DepartmentChanged(department) => {
                self.criteria.department = department;
                self.refetch_from_first_page()
            }
            RosterEvent::StatusChanged(status) => {
                self.criteria.status = status;
                self.refetch_from_first_page()
            }
            RosterEvent::PageSizeChanged(page_size) => {
                self.criteria.page_size = page_size.max(1);
                self.refetch_from_first_page()
            }
            RosterEvent::GoToPage(page) => self.refetch_page(page.max(1)),
            RosterEvent::PageLoaded(page) => {
                self.page = Some(page);
                self.loading = false;
                None
            }
            RosterEvent::SelectionToggled { id, included } => {
                self.selection.toggle(id, included);
                None
            }
            RosterEvent::SelectionCleared => {
                self.selection.clear();
                None
            }
            RosterEvent::BulkDeleteConfirmed => {
                if self.selection.is_empty() {
                    None
                } else {
                    let ids = self.selection.ids();
                    self.selection.clear();
                    Some(Effect::Delete(ids))
                }
            }
            RosterEvent::CreateFormOpened => {
                self.form = Some(FormMode::Create);
                None
            }
            RosterEvent::EditFormOpened(record) => {
                self.form = Some(FormMode::Edit(record));
                None
            }
            RosterEvent::FormClosed => {
                self.form = None;
                None
            }
        };
        (self, effect)
    }

    pub fn total_matches(&self) -> usize {
        self.page.as_ref().map_or(0, |page| page.total_matches)
    }

    pub fn total_pages(&self) -> usize {
        query::total_pages(self.total_matches(), self.criteria.page_size)
    }

    pub fn window(&self) -> Option<PageWindow> {
        PageWindow::new(self.criteria.page, self.criteria.page_size, self.total_matches())
    }

    pub fn bulk_actions_visible(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn pagination_visible(&self) -> bool {
        self.total_pages() > 1
    }

    /// Values the open form starts from: blank for create, the record for edit.
    pub fn form_prefill(&self) -> Option<FormFields> {
        match &self.form {
            Some(FormMode::Create) => Some(FormFields::new()),
            Some(FormMode::Edit(record)) => Some(form::to_form_fields(record)),
            None => None,
        }
    }

    fn refetch_from_first_page(&mut self) -> Option<Effect> {
        self.refetch_page(1)
    }

    fn refetch_page(&mut self, page: usize) -> Option<Effect> {
        self.criteria.page = page;
        self.loading = true;
        Some(Effect::Fetch(self.criteria.clone()))
    }
}
