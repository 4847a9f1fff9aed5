//! Built-in table specifications for the HR resource kinds.
//!
//! This module provides:
//! - Stable column specs (field, label, width, comparison kind)
//! - A registry mapping each resource kind to its table spec
//!
//! The controller is field-agnostic; everything kind-specific lives here.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::FieldKind;

/// The collections served by the HR API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Employees,
    Permissions,
    Advances,
    Expenses,
}

impl ResourceKind {
    pub fn all() -> [ResourceKind; 4] {
        [
            ResourceKind::Employees,
            ResourceKind::Permissions,
            ResourceKind::Advances,
            ResourceKind::Expenses,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Employees => "employees",
            ResourceKind::Permissions => "permissions",
            ResourceKind::Advances => "advances",
            ResourceKind::Expenses => "expenses",
        }
    }

    pub fn table_spec(&self) -> &'static TableSpec {
        table_spec_for(*self)
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "employees" => Ok(ResourceKind::Employees),
            "permissions" => Ok(ResourceKind::Permissions),
            "advances" => Ok(ResourceKind::Advances),
            "expenses" => Ok(ResourceKind::Expenses),
            other => Err(format!("unknown resource kind: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub label: &'static str,
    /// Column width hint for fixed-width table output.
    pub width: usize,
    /// Declared comparison kind; `None` means the column is not sortable.
    pub sort: Option<FieldKind>,
}

/// Everything the collection controller needs to know about one kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSpec {
    pub id_field: &'static str,
    /// Single designated field for exact-match filtering.
    pub filter_field: &'static str,
    pub page_size: usize,
    pub columns: &'static [ColumnSpec],
}

impl TableSpec {
    /// Comparison kind for `field`, or `None` when it is not sortable.
    pub fn sort_kind(&self, field: &str) -> Option<FieldKind> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .and_then(|c| c.sort)
    }

    pub fn sortable_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|c| c.sort.is_some())
            .map(|c| c.field)
    }
}

const fn col(
    field: &'static str,
    label: &'static str,
    width: usize,
    sort: Option<FieldKind>,
) -> ColumnSpec {
    ColumnSpec {
        field,
        label,
        width,
        sort,
    }
}

const EMPLOYEE_COLUMNS: &[ColumnSpec] = &[
    col("firstName", "First Name", 14, Some(FieldKind::Lexicographic)),
    col("firstSurname", "Surname", 14, Some(FieldKind::Lexicographic)),
    col("department", "Department", 16, Some(FieldKind::Lexicographic)),
    col("position", "Position", 16, Some(FieldKind::Lexicographic)),
    col("startDate", "Start Date", 12, Some(FieldKind::Date)),
    col("wage", "Wage", 10, Some(FieldKind::Numeric)),
    col("email", "Email", 24, None),
];

const PERMISSION_COLUMNS: &[ColumnSpec] = &[
    col("permissionType", "Type", 16, Some(FieldKind::Lexicographic)),
    col("requestDate", "Requested", 12, Some(FieldKind::Date)),
    col("startDate", "Start", 12, Some(FieldKind::Date)),
    col("endDate", "End", 12, Some(FieldKind::Date)),
    col("approvalStatus", "Status", 14, Some(FieldKind::Lexicographic)),
    col("fileName", "Document", 20, None),
];

const ADVANCE_COLUMNS: &[ColumnSpec] = &[
    col("advanceType", "Type", 12, Some(FieldKind::Lexicographic)),
    col("amount", "Amount", 10, Some(FieldKind::Numeric)),
    col("currency", "Currency", 8, None),
    col("requestDate", "Requested", 12, Some(FieldKind::Date)),
    col("approvalStatus", "Status", 14, Some(FieldKind::Lexicographic)),
];

const EXPENSE_COLUMNS: &[ColumnSpec] = &[
    col("expenseType", "Type", 14, Some(FieldKind::Lexicographic)),
    col("amount", "Amount", 10, Some(FieldKind::Numeric)),
    col("currency", "Currency", 8, None),
    col("requestDate", "Requested", 12, Some(FieldKind::Date)),
    col("approvalStatus", "Status", 14, Some(FieldKind::Lexicographic)),
    col("fileName", "Receipt", 20, None),
];

static EMPLOYEES_SPEC: TableSpec = TableSpec {
    id_field: "id",
    filter_field: "department",
    page_size: 10,
    columns: EMPLOYEE_COLUMNS,
};

static PERMISSIONS_SPEC: TableSpec = TableSpec {
    id_field: "id",
    filter_field: "permissionType",
    page_size: 10,
    columns: PERMISSION_COLUMNS,
};

static ADVANCES_SPEC: TableSpec = TableSpec {
    id_field: "id",
    filter_field: "approvalStatus",
    page_size: 10,
    columns: ADVANCE_COLUMNS,
};

static EXPENSES_SPEC: TableSpec = TableSpec {
    id_field: "id",
    filter_field: "expenseType",
    page_size: 10,
    columns: EXPENSE_COLUMNS,
};

/// Return the table spec for a kind.
pub fn table_spec_for(kind: ResourceKind) -> &'static TableSpec {
    match kind {
        ResourceKind::Employees => &EMPLOYEES_SPEC,
        ResourceKind::Permissions => &PERMISSIONS_SPEC,
        ResourceKind::Advances => &ADVANCES_SPEC,
        ResourceKind::Expenses => &EXPENSES_SPEC,
    }
}
