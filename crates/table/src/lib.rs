//! hrdeck table: the tabular collection controller.
//!
//! Owns an in-memory working set fetched from the gateway and derives
//! sorted/filtered/paged views of it. The collection is replaced wholesale on
//! every successful load and never patched in place; the view is a pure
//! projection of (collection, sort key, direction, filter, page).

#![forbid(unsafe_code)]

use std::sync::Arc;

use tracing::info;

use hrdeck_api::{ApiError, ApiResult, Gateway, StatusAction, WriteOutcome};
use hrdeck_core::kinds::{ResourceKind, TableSpec};
use hrdeck_core::{field_str, sort_value, Record, SortDirection};

/// The derived, currently-displayed slice of the collection.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub page: Vec<Record>,
    /// 1-based, clamped into `[1, page_count]`.
    pub page_index: usize,
    /// `max(1, ceil(total_filtered / page_size))`.
    pub page_count: usize,
    pub total_filtered: usize,
}

pub struct TableController {
    gateway: Arc<dyn Gateway>,
    kind: ResourceKind,
    spec: &'static TableSpec,
    collection: Vec<Record>,
    sort_key: Option<String>,
    sort_dir: SortDirection,
    filter: Option<String>,
    page_index: usize,
    page_size: usize,
    loaded: bool,
    scope: Option<String>,
}

impl TableController {
    pub fn new(gateway: Arc<dyn Gateway>, kind: ResourceKind) -> Self {
        let spec = kind.table_spec();
        TableController {
            gateway,
            kind,
            spec,
            collection: Vec::new(),
            sort_key: None,
            sort_dir: SortDirection::Ascending,
            filter: None,
            page_index: 1,
            page_size: spec.page_size,
            loaded: false,
            scope: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn spec(&self) -> &'static TableSpec {
        self.spec
    }

    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_dir
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn collection_len(&self) -> usize {
        self.collection.len()
    }

    /// Fetch the collection and replace it wholesale. On error the previous
    /// collection is kept. The page index resets to 1 on the first load only;
    /// later loads are refreshes and keep the caller's position.
    pub async fn load(&mut self, scope: Option<&str>) -> ApiResult<()> {
        let rows = self.gateway.fetch_collection(self.kind, scope).await?;
        info!(kind = self.kind.name(), count = rows.len(), "table: collection loaded");
        self.collection = rows;
        self.scope = scope.map(|s| s.to_string());
        if !self.loaded {
            self.page_index = 1;
            self.loaded = true;
        }
        Ok(())
    }

    /// Toggle sorting: a new key starts ascending, the active key flips
    /// direction. The field must be declared sortable for this kind.
    pub fn sort_by(&mut self, field: &str) -> ApiResult<()> {
        if self.spec.sort_kind(field).is_none() {
            return Err(ApiError::Validation(format!(
                "field '{}' is not sortable for {}",
                field,
                self.kind.name()
            )));
        }
        match &self.sort_key {
            Some(k) if k == field => self.sort_dir = self.sort_dir.flipped(),
            _ => {
                self.sort_key = Some(field.to_string());
                self.sort_dir = SortDirection::Ascending;
            }
        }
        Ok(())
    }

    /// Exact-match filter on the designated field; `None` shows everything.
    /// Resets to page 1 so a shrinking set cannot strand the caller.
    pub fn set_filter(&mut self, value: Option<String>) {
        self.filter = value.filter(|v| !v.is_empty());
        self.page_index = 1;
    }

    /// Jump to a 1-based page, clamped into the valid range for the current
    /// filtered set.
    pub fn paginate(&mut self, page: usize) {
        let page_count = self.view().page_count;
        self.page_index = page.clamp(1, page_count);
    }

    /// Forward an approve/reject decision to the gateway. The id is not
    /// pre-validated against the collection; the server is the authority.
    /// A reported success triggers a refresh so the collection reflects
    /// server-side truth (including status-derived fields); the page index
    /// survives the refresh.
    pub async fn mutate(&mut self, id: i64, action: &StatusAction) -> ApiResult<WriteOutcome> {
        let outcome = self.gateway.write_mutation(self.kind, id, action).await?;
        if outcome.success {
            let scope = self.scope.clone();
            let rows = self
                .gateway
                .fetch_collection(self.kind, scope.as_deref())
                .await?;
            info!(kind = self.kind.name(), id, count = rows.len(), "table: refreshed after mutation");
            self.collection = rows;
        }
        Ok(outcome)
    }

    /// Derive the current view: filter, stable sort, slice.
    pub fn view(&self) -> ViewState {
        let filtered: Vec<&Record> = self
            .collection
            .iter()
            .filter(|rec| match &self.filter {
                None => true,
                Some(v) => field_str(rec, self.spec.filter_field) == Some(v.as_str()),
            })
            .collect();
        let total_filtered = filtered.len();
        let page_count = std::cmp::max(1, total_filtered.div_ceil(self.page_size));
        let page_index = self.page_index.clamp(1, page_count);

        let ordered: Vec<&Record> = match &self.sort_key {
            None => filtered,
            Some(field) => {
                // Declared kind is guaranteed by sort_by's guard.
                let kind = self.spec.sort_kind(field).expect("sortable field");
                let mut keyed: Vec<_> = filtered
                    .into_iter()
                    .map(|rec| (sort_value(rec, field, kind), rec))
                    .collect();
                // Vec::sort_by is stable; equal keys keep their prior order.
                keyed.sort_by(|a, b| a.0.compare(&b.0, self.sort_dir));
                keyed.into_iter().map(|(_, rec)| rec).collect()
            }
        };

        let start = (page_index - 1) * self.page_size;
        let page = ordered
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        ViewState {
            page,
            page_index,
            page_count,
            total_filtered,
        }
    }
}
