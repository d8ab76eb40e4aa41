//! Group-by counting with caller-chosen ranking and truncation.
//!
//! [`aggregate`] counts rows per distinct value of one column, orders the
//! groups by count or by key in either direction, and keeps at most `top_n`
//! of them. Groups are collected in first-encounter order and sorted stably,
//! so equal counts rank by which value appeared first in the file.

use std::{cmp::Ordering, collections::HashMap};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{data::Value, dataset::Table, error::AggregationError, nulls::round2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Count,
    Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortOrder {
    pub by: SortKey,
    pub direction: Direction,
}

impl SortOrder {
    pub const fn count_desc() -> Self {
        Self {
            by: SortKey::Count,
            direction: Direction::Desc,
        }
    }

    pub const fn key_asc() -> Self {
        Self {
            by: SortKey::Key,
            direction: Direction::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRequest {
    pub group_column: String,
    /// Maximum groups returned; `0` keeps every group.
    pub top_n: usize,
    pub order: SortOrder,
    /// Drop rows whose grouping value is null before counting.
    pub exclude_nulls: bool,
    /// Fail with [`AggregationError::EmptyTable`] instead of returning no groups.
    pub require_rows: bool,
}

impl AggregateRequest {
    /// Ranked view: most frequent first, nulls counted as their own group.
    pub fn top(group_column: impl Into<String>, top_n: usize) -> Self {
        Self {
            group_column: group_column.into(),
            top_n,
            order: SortOrder::count_desc(),
            exclude_nulls: false,
            require_rows: false,
        }
    }

    /// Complete distribution ordered by value, nulls left out.
    pub fn distribution(group_column: impl Into<String>) -> Self {
        Self {
            group_column: group_column.into(),
            top_n: 0,
            order: SortOrder::key_asc(),
            exclude_nulls: true,
            require_rows: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub key: Option<Value>,
    pub count: usize,
    /// Share of `counted_rows`, rounded to two decimals.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub column: String,
    pub groups: Vec<GroupCount>,
    /// Number of groups before truncation.
    pub distinct_groups: usize,
    /// Rows that took part in grouping (after null exclusion).
    pub counted_rows: usize,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

pub fn aggregate(
    table: &Table,
    request: &AggregateRequest,
) -> Result<AggregationResult, AggregationError> {
    let column = table
        .column(&request.group_column)
        .ok_or_else(|| AggregationError::UnknownColumn {
            column: request.group_column.clone(),
        })?;
    if request.require_rows && table.is_empty() {
        return Err(AggregationError::EmptyTable {
            column: request.group_column.clone(),
        });
    }

    let mut accumulator = GroupAccumulator::default();
    for value in column.values() {
        if value.is_none() && request.exclude_nulls {
            continue;
        }
        accumulator.ingest(value.as_ref());
    }
    Ok(accumulator.finish(&request.group_column, request.order, request.top_n))
}

/// Counts per distinct key, remembering first-encounter order.
#[derive(Default)]
struct GroupAccumulator<'a> {
    positions: HashMap<Option<&'a Value>, usize>,
    groups: Vec<(Option<&'a Value>, usize)>,
    total: usize,
}

impl<'a> GroupAccumulator<'a> {
    fn ingest(&mut self, key: Option<&'a Value>) {
        self.total += 1;
        match self.positions.get(&key) {
            Some(&idx) => self.groups[idx].1 += 1,
            None => {
                self.positions.insert(key, self.groups.len());
                self.groups.push((key, 1));
            }
        }
    }

    fn finish(mut self, column: &str, order: SortOrder, top_n: usize) -> AggregationResult {
        let distinct_groups = self.groups.len();
        self.groups.sort_by(|a, b| {
            let ordering = match order.by {
                SortKey::Count => a.1.cmp(&b.1),
                SortKey::Key => compare_keys(a.0, b.0),
            };
            match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        });
        if top_n > 0 {
            self.groups.truncate(top_n);
        }
        let total = self.total;
        let groups = self
            .groups
            .into_iter()
            .map(|(key, count)| GroupCount {
                key: key.cloned(),
                count,
                percent: round2(count as f64 / total as f64 * 100.0),
            })
            .collect();
        AggregationResult {
            column: column.to_string(),
            groups,
            distinct_groups,
            counted_rows: total,
        }
    }
}

/// Null sorts before every value.
fn compare_keys(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => left.cmp(right),
    }
}
