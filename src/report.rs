//! One full exploration pass over an ingested table.
//!
//! [`build_report`] produces every view of the registry explorer in a single
//! call: schema listing, role candidates, null statistics, the activity and
//! location rankings, the size distribution, and a raw-row preview. The
//! caller's [`Selection`] picks the column for each role; unset roles fall back
//! to their first candidate. Nothing is cached between calls, so any change to
//! the selection or the table is reflected by calling it again.

use std::fmt::Write as _;

use heck::ToTitleCase;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    aggregate::{AggregateRequest, AggregationResult, aggregate},
    classify::{KeywordSets, Role, RoleCandidates, classify},
    data::{Value, display_cell},
    dataset::Table,
    error::AggregationError,
    nulls::{NullStat, profile_nulls},
    schema::{ColumnDescriptor, describe},
    table::{Align, TextTable},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub activity_top: usize,
    pub location_top: usize,
    pub preview_rows: usize,
    /// Leading columns previewed when the selection names none.
    pub preview_columns: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            activity_top: 20,
            location_top: 15,
            preview_rows: 100,
            preview_columns: 5,
        }
    }
}

/// Adapter-owned selection state, passed in per call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub activity: Option<String>,
    pub location: Option<String>,
    pub size: Option<String>,
    pub preview_columns: Vec<String>,
}

impl Selection {
    pub fn column(&self, role: Role) -> Option<&str> {
        match role {
            Role::Activity => self.activity.as_deref(),
            Role::Location => self.location.as_deref(),
            Role::Size => self.size.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleView {
    pub role: Role,
    pub title: String,
    pub result: AggregationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<Value>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub row_count: usize,
    pub columns: Vec<ColumnDescriptor>,
    pub roles: RoleCandidates,
    pub nulls: Vec<NullStat>,
    pub activity: Option<RoleView>,
    pub location: Option<RoleView>,
    pub size: Option<RoleView>,
    pub preview: PreviewView,
}

impl Report {
    pub fn view(&self, role: Role) -> Option<&RoleView> {
        match role {
            Role::Activity => self.activity.as_ref(),
            Role::Location => self.location.as_ref(),
            Role::Size => self.size.as_ref(),
        }
    }
}

pub fn build_report(
    table: &Table,
    config: &ReportConfig,
    keyword_sets: &KeywordSets,
    selection: &Selection,
) -> Result<Report, AggregationError> {
    let columns = describe(table);
    let roles = classify(&columns, keyword_sets);
    let nulls = profile_nulls(table);

    let activity = role_view(table, config, &roles, selection, Role::Activity)?;
    let location = role_view(table, config, &roles, selection, Role::Location)?;
    let size = role_view(table, config, &roles, selection, Role::Size)?;

    let preview_names = if selection.preview_columns.is_empty() {
        columns
            .iter()
            .take(config.preview_columns)
            .map(|descriptor| descriptor.name.clone())
            .collect()
    } else {
        selection.preview_columns.clone()
    };
    let preview_table = table.preview(&preview_names, config.preview_rows)?;
    let preview = PreviewView {
        columns: preview_names,
        rows: preview_table.records(),
    };

    Ok(Report {
        row_count: table.row_count(),
        columns,
        roles,
        nulls,
        activity,
        location,
        size,
        preview,
    })
}

/// Builds the aggregation a role's view shows for `column`.
pub fn role_request(role: Role, column: &str, config: &ReportConfig) -> AggregateRequest {
    match role {
        Role::Activity => AggregateRequest::top(column, config.activity_top),
        Role::Location => AggregateRequest::top(column, config.location_top),
        Role::Size => AggregateRequest::distribution(column),
    }
}

fn role_view(
    table: &Table,
    config: &ReportConfig,
    roles: &RoleCandidates,
    selection: &Selection,
    role: Role,
) -> Result<Option<RoleView>, AggregationError> {
    let Some(column) = selection.column(role).or_else(|| roles.first(role)) else {
        return Ok(None);
    };
    let request = role_request(role, column, config);
    let result = aggregate(table, &request)?;
    Ok(Some(RoleView {
        role,
        title: view_title(role, column, request.top_n),
        result,
    }))
}

fn view_title(role: Role, column: &str, top_n: usize) -> String {
    let label = column.to_title_case();
    match role {
        Role::Activity if top_n > 0 => format!("Top {top_n} Business Activities ({label})"),
        Role::Activity => format!("Business Activities ({label})"),
        Role::Location => format!("Business Distribution by {label}"),
        Role::Size => format!("Distribution by {label}"),
    }
}

/// Renders the report as terminal text, one section per view.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Dataset: {} row(s), {} column(s)\n",
        report.row_count,
        report.columns.len()
    );

    let _ = writeln!(out, "{}", render_schema(&report.columns));

    let _ = writeln!(out, "{}", render_roles(&report.roles));
    let _ = writeln!(out, "{}", render_nulls(&report.nulls));

    for role in Role::ALL {
        match report.view(role) {
            Some(view) => {
                let _ = writeln!(out, "{}\n{}", view.title, render_aggregation(&view.result));
            }
            None => {
                let _ = writeln!(out, "No {} columns found\n", role.description());
            }
        }
    }

    if report.preview.columns.is_empty() {
        let _ = writeln!(out, "Select at least one column to preview data");
    } else {
        let mut preview = TextTable::new(report.preview.columns.iter().cloned());
        preview.extend_rows(
            report
                .preview
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| display_cell(cell.as_ref())).collect()),
        );
        let _ = writeln!(
            out,
            "Data Preview (first {} row(s))\n{}",
            report.preview.rows.len(),
            preview.render()
        );
    }
    out
}

pub fn render_schema(columns: &[ColumnDescriptor]) -> String {
    let mut table = TextTable::new(["#", "column", "type"]).align(0, Align::Right);
    table.extend_rows(columns.iter().map(|descriptor| {
        vec![
            (descriptor.index + 1).to_string(),
            descriptor.name.clone(),
            descriptor.inferred_type.to_string(),
        ]
    }));
    table.render()
}

pub fn render_roles(roles: &RoleCandidates) -> String {
    let mut table = TextTable::new(["role", "columns"]);
    table.extend_rows(
        roles
            .iter()
            .map(|(role, columns)| vec![role.to_string(), columns.iter().join(", ")]),
    );
    table.render()
}

pub fn render_nulls(stats: &[NullStat]) -> String {
    let mut table = TextTable::new(["column", "null_count", "null_percent"])
        .align(1, Align::Right)
        .align(2, Align::Right);
    table.extend_rows(stats.iter().map(|stat| {
        vec![
            stat.column.clone(),
            stat.null_count.to_string(),
            format!("{:.2}%", stat.null_percent),
        ]
    }));
    table.render()
}

pub fn render_aggregation(result: &AggregationResult) -> String {
    let mut table = TextTable::new([result.column.as_str(), "count", "percent"])
        .align(1, Align::Right)
        .align(2, Align::Right);
    table.extend_rows(result.groups.iter().map(|group| {
        vec![
            display_cell(group.key.as_ref()),
            group.count.to_string(),
            format!("{:.2}%", group.percent),
        ]
    }));
    table.render()
}
