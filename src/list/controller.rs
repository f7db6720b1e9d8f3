use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::{
    pager::{PageTicket, Pager},
    selection::{Effect, Input, Mode, Selection},
};
use crate::{
    abort::AbortSignal,
    catalog::{Id, ListQuery, Page, Resource},
    client::ApiClient,
    error::{ApiError, Result},
};

/// User-facing notification, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Outcome of a bulk delete. Deletion stops at the first failure and
/// nothing already deleted is restored.
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub deleted: Vec<Id>,
    pub failed: Option<(Id, ApiError)>,
    /// Ids never attempted because an earlier delete failed.
    pub skipped: Vec<Id>,
}

impl BulkDeleteReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

/// Drives one admin list screen: loading, infinite scroll, long-press
/// selection and bulk delete over a single [`Resource`].
#[derive(Debug)]
pub struct ListController<R> {
    query: ListQuery,
    items: Vec<R>,
    pager: Pager,
    selection: Selection,
    error: Option<String>,
    notices: Vec<Notice>,
    viewing: Option<Id>,
}

impl<R: Resource> ListController<R> {
    pub fn new(query: ListQuery) -> Self {
        Self {
            query,
            items: Vec::new(),
            pager: Pager::new(),
            selection: Selection::new(),
            error: None,
            notices: Vec::new(),
            viewing: None,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pager.is_loading()
    }

    pub fn has_next_page(&self) -> bool {
        self.pager.has_next_page()
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn mode(&self) -> Mode {
        self.selection.mode()
    }

    pub fn selected(&self) -> &[Id] {
        self.selection.selected()
    }

    /// Item whose detail view is open, if any.
    pub fn viewing(&self) -> Option<Id> {
        self.viewing
    }

    pub fn close_detail(&mut self) {
        self.viewing = None;
    }

    /// Edit acts on the first selected item.
    pub fn edit_target(&self) -> Option<Id> {
        self.selection.selected().first().copied()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        match &notice {
            Notice::Success(message) => info!(resource = R::LABEL, "{message}"),
            Notice::Error(message) => error!(resource = R::LABEL, "{message}"),
        }
        self.notices.push(notice);
    }

    /// Feeds a pointer / tap event through the selection state machine.
    pub fn handle(&mut self, input: Input) -> Effect {
        let effect = self.selection.handle(input);
        if let Effect::OpenDetail(id) = effect {
            self.viewing = Some(id);
        }
        effect
    }

    /// Clock tick for a press being held.
    pub fn tick(&mut self, now: Instant) -> Effect {
        self.handle(Input::Tick { at: now })
    }

    pub fn cancel_selection(&mut self) {
        self.selection.handle(Input::Cancel);
    }

    pub fn select(&mut self, ids: Vec<Id>) -> Effect {
        self.selection.handle(Input::SelectOnly { ids })
    }

    pub fn select_all(&mut self) -> Effect {
        let visible = self.items.iter().map(R::id).collect();
        self.selection.handle(Input::SelectAll { visible })
    }

    /// Reloads page 1, replacing the loaded items.
    pub async fn refresh(&mut self, client: &ApiClient, signal: Option<&AbortSignal>) {
        let ticket = self.pager.begin_refresh();
        let result = client.list::<R>(&self.page_query(ticket.page), signal).await;
        self.complete(ticket, result);
    }

    /// Claims the next page if one exists and nothing is loading.
    pub fn begin_load_more(&mut self) -> Option<(PageTicket, ListQuery)> {
        let ticket = self.pager.begin_next()?;
        Some((ticket, self.page_query(ticket.page)))
    }

    /// Sentinel became visible: load and append the next page. Returns
    /// whether a page was appended, so `false` on the last page, on abort
    /// and on failure.
    pub async fn load_more(&mut self, client: &ApiClient, signal: Option<&AbortSignal>) -> bool {
        let Some((ticket, query)) = self.begin_load_more() else {
            debug!(resource = R::LABEL, "no page to load");
            return false;
        };
        let result = client.list::<R>(&query, signal).await;
        self.complete(ticket, result)
    }

    /// Applies the result of a page load and returns whether it was applied.
    /// Stale and aborted loads leave items, error and notices untouched.
    pub fn complete(&mut self, ticket: PageTicket, result: Result<Page<R>>) -> bool {
        if !self.pager.is_current(&ticket) {
            debug!(resource = R::LABEL, page = ticket.page, "discarding stale page");
            return false;
        }
        match result {
            Ok(page) => {
                self.pager
                    .finish(&ticket, Some((page.current_page, page.last_page)));
                if ticket.append {
                    self.items.extend(page.data);
                } else {
                    self.items = page.data;
                    self.error = None;
                }
                true
            }
            Err(e) if e.is_abort() => {
                self.pager.finish(&ticket, None);
                false
            }
            Err(e) => {
                self.pager.finish(&ticket, None);
                warn!(resource = R::LABEL, page = ticket.page, "failed to load: {e}");
                if ticket.append {
                    self.notify(Notice::Error(format!("Failed to load more: {e}")));
                } else {
                    self.error = Some(e.to_string());
                }
                false
            }
        }
    }

    /// Deletes every selected item, one request at a time, stopping at the
    /// first failure. Always leaves selection mode and refreshes afterwards.
    pub async fn bulk_delete(&mut self, client: &ApiClient) -> BulkDeleteReport {
        let ids = self.selection.selected().to_vec();
        let mut report = BulkDeleteReport::default();

        let mut remaining = ids.into_iter();
        for id in remaining.by_ref() {
            match client.delete::<R>(id).await {
                Ok(()) => report.deleted.push(id),
                Err(e) => {
                    report.failed = Some((id, e));
                    break;
                }
            }
        }
        report.skipped = remaining.collect();

        match &report.failed {
            None => self.notify(Notice::Success(format!(
                "{} {} deleted.",
                report.deleted.len(),
                R::LABEL
            ))),
            Some((id, e)) => {
                warn!(
                    resource = R::LABEL,
                    id,
                    deleted = report.deleted.len(),
                    skipped = report.skipped.len(),
                    "bulk delete stopped"
                );
                self.notify(Notice::Error(format!(
                    "Failed to delete one of the {}s, stopped: {e}",
                    R::LABEL
                )));
            }
        }

        self.selection.handle(Input::Cancel);
        self.refresh(client, None).await;
        report
    }

    /// Creates an item from a form, then refreshes the list.
    pub async fn create(&mut self, client: &ApiClient, draft: &R::Draft) -> Result<R> {
        let result = client.create::<R>(draft).await;
        self.after_save(client, result, "added").await
    }

    /// Saves an edit form, then refreshes the list.
    pub async fn update(&mut self, client: &ApiClient, id: Id, draft: &R::Draft) -> Result<R> {
        let result = client.update::<R>(id, draft).await;
        self.after_save(client, result, "updated").await
    }

    async fn after_save(&mut self, client: &ApiClient, result: Result<R>, verb: &str) -> Result<R> {
        match result {
            Ok(item) => {
                self.refresh(client, None).await;
                self.notify(Notice::Success(format!("{} {verb}.", R::LABEL)));
                Ok(item)
            }
            Err(e) => {
                if !e.is_abort() {
                    self.notify(Notice::Error(format!("Failed to save {}: {e}", R::LABEL)));
                }
                Err(e)
            }
        }
    }

    fn page_query(&self, page: u32) -> ListQuery {
        self.query.clone().page(page)
    }
}
