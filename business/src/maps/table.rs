//! State of the editable map-version table.
//!
//! The UI reads this state and calls its operations; nothing here renders.
//! Rows only change on the UI thread: through user operations, or when a
//! finished load is reconciled at the start of a frame.

use std::any::Any;

use chrono::{DateTime, Utc};
use log::{info, warn};
use mapconsole_states::{State, state_assign_impl};
use ustr::Ustr;

use super::api::MapPage;
use super::columns::{ColumnWidths, required_fields};
use super::error::TableError;
use super::load_command::{MapListCompute, MapListResult};
use super::model::{Field, MapStatus, MapVersion, RowPatch};
use super::params::{DEFAULT_PAGE_SIZE, ListParams};

/// Notifications disappear after this many seconds.
pub const NOTIFICATION_TTL_SECONDS: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based.
    pub current: u32,
    pub page_size: u32,
    /// Row count across all pages, as reported by the server.
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

impl Pagination {
    pub fn page_count(&self) -> u32 {
        let size = u64::from(self.page_size.max(1));
        u32::try_from(self.total.div_ceil(size))
            .unwrap_or(u32::MAX)
            .max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.page_count()
    }
}

/// The single edit gate: at most one row is editing at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing {
        key: Ustr,
        draft: RowPatch,
        /// Row was created by add-row and never committed.
        is_new: bool,
    },
}

impl EditState {
    pub fn editing_key(&self) -> Option<Ustr> {
        match self {
            Self::Idle => None,
            Self::Editing { key, .. } => Some(*key),
        }
    }

    pub fn is_editing(&self, key: &str) -> bool {
        self.editing_key().is_some_and(|editing| editing.as_str() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Editable, paginated table of map versions.
///
/// Stored in `StateCtx`, read and mutated by the version panel.
#[derive(Debug, Default)]
pub struct VersionTable {
    rows: Vec<MapVersion>,
    pagination: Pagination,
    loading: bool,
    edit: EditState,
    /// Last failed commit, shown next to the offending cell.
    commit_error: Option<TableError>,
    widths: ColumnWidths,
    params: ListParams,
    notifications: Vec<Notification>,
    applied_generation: u64,
    next_placeholder: u64,
}

impl State for VersionTable {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

impl VersionTable {
    pub fn new(page_size: u32) -> Self {
        let params = ListParams::new(page_size);
        Self {
            pagination: Pagination {
                current: params.page,
                page_size: params.page_size,
                total: 0,
            },
            params,
            ..Self::default()
        }
    }

    // =====================
    // Getters
    // =====================

    pub fn rows(&self) -> &[MapVersion] {
        &self.rows
    }

    pub fn row(&self, key: &str) -> Option<&MapVersion> {
        self.rows.iter().find(|row| row.map_version_id == key)
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn editing_key(&self) -> Option<Ustr> {
        self.edit.editing_key()
    }

    pub fn commit_error(&self) -> Option<&TableError> {
        self.commit_error.as_ref()
    }

    pub fn widths(&self) -> &ColumnWidths {
        &self.widths
    }

    /// Parameters of the most recent load.
    pub fn params(&self) -> &ListParams {
        &self.params
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Generation of the last load result applied by [`Self::reconcile`].
    pub fn applied_generation(&self) -> u64 {
        self.applied_generation
    }

    fn position(&self, key: &str) -> Result<usize, TableError> {
        self.rows
            .iter()
            .position(|row| row.map_version_id == key)
            .ok_or_else(|| TableError::RowNotFound(key.to_owned()))
    }

    fn ensure_idle(&self) -> Result<(), TableError> {
        match self.edit.editing_key() {
            Some(editing) => Err(TableError::ConcurrentEdit { editing }),
            None => Ok(()),
        }
    }

    // =====================
    // Loading
    // =====================

    /// Record a load that is about to be sent.
    pub fn begin_load(&mut self, params: ListParams) {
        self.pagination.current = params.page;
        self.pagination.page_size = params.page_size;
        self.params = params;
        self.loading = true;
    }

    /// Replace all rows with a fetched page.
    ///
    /// Rows without an id or repeating an earlier id are dropped. An edit in
    /// progress survives only if its row is still present.
    pub fn apply_page(&mut self, page: MapPage) {
        let MapPage { rows, total } = page;
        let received = rows.len();

        let mut kept: Vec<MapVersion> = Vec::with_capacity(received);
        for row in rows {
            if row.map_version_id.trim().is_empty() {
                warn!("dropping map version without mapVersionId: {row:?}");
            } else if kept
                .iter()
                .any(|existing| existing.map_version_id == row.map_version_id)
            {
                warn!("dropping duplicate mapVersionId {}", row.map_version_id);
            } else {
                kept.push(row);
            }
        }

        self.rows = kept;
        self.pagination.total = total;
        self.loading = false;

        // A fresh page replaces any unsaved add-row, even when the server
        // happens to return a row with the placeholder's key.
        if let EditState::Editing { key, is_new, .. } = &self.edit
            && (*is_new || self.row(key.as_str()).is_none())
        {
            info!("row {key} left the table, edit discarded");
            self.edit = EditState::Idle;
            self.commit_error = None;
        }

        info!(
            "loaded {} of {received} map versions (page {}, total {total})",
            self.rows.len(),
            self.pagination.current
        );
    }

    /// A load failed: keep the rows, stop the spinner, tell the user.
    pub fn fail_load(&mut self, message: &str, now: DateTime<Utc>) {
        self.loading = false;
        self.notify(
            NotificationLevel::Error,
            format!("failed to load map versions: {message}"),
            now,
        );
    }

    /// The running load was cancelled and nothing will arrive.
    pub fn stop_loading(&mut self) {
        self.loading = false;
    }

    /// Apply the newest finished load, once.
    ///
    /// Returns `true` when the table changed.
    pub fn reconcile(&mut self, compute: &MapListCompute, now: DateTime<Utc>) -> bool {
        match &compute.result {
            MapListResult::Loaded { generation, page } if *generation > self.applied_generation => {
                self.applied_generation = *generation;
                self.apply_page(page.clone());
                true
            }
            MapListResult::Error {
                generation,
                message,
            } if *generation > self.applied_generation => {
                self.applied_generation = *generation;
                self.fail_load(message, now);
                true
            }
            _ => false,
        }
    }

    // =====================
    // Editing
    // =====================

    /// Open `key` for inline editing with a draft of its current values.
    ///
    /// Re-opening the row already under edit is a no-op.
    pub fn begin_edit(&mut self, key: &str) -> Result<(), TableError> {
        if self.edit.is_editing(key) {
            return Ok(());
        }
        self.ensure_idle()?;
        let index = self.position(key)?;

        self.edit = EditState::Editing {
            key: Ustr::from(key),
            draft: RowPatch::seeded_from(&self.rows[index]),
            is_new: false,
        };
        self.commit_error = None;
        Ok(())
    }

    pub fn draft(&self) -> Option<&RowPatch> {
        match &self.edit {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Idle => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut RowPatch> {
        match &mut self.edit {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Idle => None,
        }
    }

    pub fn set_draft_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), TableError> {
        match &mut self.edit {
            EditState::Editing { draft, .. } => {
                draft.set(field, value);
                Ok(())
            }
            EditState::Idle => Err(TableError::NoActiveEdit),
        }
    }

    /// Validate the draft (with `patch` on top) and merge it into the row.
    ///
    /// On failure the row is unchanged, the row stays in edit mode and the
    /// draft keeps what the user typed.
    pub fn commit_edit(&mut self, key: &str, patch: &RowPatch) -> Result<(), TableError> {
        let EditState::Editing { key: editing, draft, .. } = &mut self.edit else {
            return Err(TableError::NotEditing(key.to_owned()));
        };
        if editing.as_str() != key {
            return Err(TableError::NotEditing(key.to_owned()));
        }
        draft.overlay(patch);
        let draft = draft.clone();

        let index = self.position(key)?;
        let mut candidate = self.rows[index].clone();
        candidate.merge(&draft);

        if let Err(err) = self.validate(index, &candidate) {
            self.commit_error = Some(err.clone());
            return Err(err);
        }

        self.rows[index] = candidate;
        self.edit = EditState::Idle;
        self.commit_error = None;
        Ok(())
    }

    fn validate(&self, index: usize, candidate: &MapVersion) -> Result<(), TableError> {
        for field in required_fields() {
            if candidate
                .text(field)
                .is_none_or(|value| value.trim().is_empty())
            {
                return Err(TableError::Required { field });
            }
        }

        let key = &candidate.map_version_id;
        let taken = self
            .rows
            .iter()
            .enumerate()
            .any(|(i, row)| i != index && row.map_version_id == *key);
        if taken {
            return Err(TableError::DuplicateKey { key: key.clone() });
        }
        Ok(())
    }

    /// Leave edit mode without saving. An uncommitted add-row is removed.
    pub fn cancel_edit(&mut self, key: &str) -> Result<(), TableError> {
        let EditState::Editing { key: editing, is_new, .. } = &self.edit else {
            return Err(TableError::NotEditing(key.to_owned()));
        };
        if editing.as_str() != key {
            return Err(TableError::NotEditing(key.to_owned()));
        }
        if *is_new {
            self.rows.retain(|row| row.map_version_id != key);
        }
        self.edit = EditState::Idle;
        self.commit_error = None;
        Ok(())
    }

    // =====================
    // Row operations
    // =====================

    /// Append an empty row and open it for editing.
    pub fn add_row(&mut self) -> Result<Ustr, TableError> {
        self.ensure_idle()?;

        let key = loop {
            self.next_placeholder += 1;
            let candidate = format!("new-{}", self.next_placeholder);
            if self.row(&candidate).is_none() {
                break candidate;
            }
        };

        let row = MapVersion::placeholder(key.as_str());
        let key = Ustr::from(&key);
        self.edit = EditState::Editing {
            key,
            draft: RowPatch::seeded_from(&row),
            is_new: true,
        };
        self.rows.push(row);
        self.commit_error = None;
        Ok(key)
    }

    /// Remove the row with `key`; other rows keep their order.
    pub fn delete_row(&mut self, key: &str) -> Result<MapVersion, TableError> {
        let index = self.position(key)?;
        let removed = self.rows.remove(index);
        if self.edit.is_editing(key) {
            self.edit = EditState::Idle;
            self.commit_error = None;
        }
        Ok(removed)
    }

    pub fn resize_column(&mut self, index: usize, width: f32) -> Result<f32, TableError> {
        self.widths.resize(index, width)
    }

    /// Back to the default width of column `index`.
    pub fn reset_column_width(&mut self, index: usize) -> bool {
        self.widths.reset_column(index)
    }

    /// 发布: mark a version online.
    pub fn publish(&mut self, key: &str) -> Result<(), TableError> {
        self.set_status(key, MapStatus::Online)
    }

    /// 下线: mark a version offline.
    pub fn take_offline(&mut self, key: &str) -> Result<(), TableError> {
        self.set_status(key, MapStatus::Offline)
    }

    fn set_status(&mut self, key: &str, status: MapStatus) -> Result<(), TableError> {
        let index = self.position(key)?;
        self.rows[index].map_status = Some(status);
        Ok(())
    }

    // =====================
    // Notifications
    // =====================

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>, now: DateTime<Utc>) {
        self.notifications.push(Notification {
            level,
            message: message.into(),
            created_at: now,
        });
    }

    /// Surface a rejected operation. Validation errors are shown inline
    /// instead and produce no notification.
    pub fn report(&mut self, err: &TableError, now: DateTime<Utc>) {
        if !err.is_validation() {
            self.notify(NotificationLevel::Error, err.to_string(), now);
        }
    }

    pub fn dismiss_notification(&mut self, index: usize) {
        if index < self.notifications.len() {
            self.notifications.remove(index);
        }
    }

    pub fn expire_notifications(&mut self, now: DateTime<Utc>) {
        self.notifications.retain(|notification| {
            now.signed_duration_since(notification.created_at).num_seconds()
                < NOTIFICATION_TTL_SECONDS
        });
    }
}
