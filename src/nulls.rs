use serde::Serialize;

use crate::dataset::Table;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullStat {
    pub column: String,
    pub null_count: usize,
    pub null_percent: f64,
}

/// Null count and percentage for every column, highest percentage first.
///
/// Columns with equal percentages keep their table order. A table without
/// rows reports `0.0` percent for every column.
pub fn profile_nulls(table: &Table) -> Vec<NullStat> {
    let rows = table.row_count();
    let mut stats = table
        .columns()
        .iter()
        .map(|column| {
            let null_count = column.null_count();
            NullStat {
                column: column.name().to_string(),
                null_count,
                null_percent: null_percent(null_count, rows),
            }
        })
        .collect::<Vec<_>>();
    stats.sort_by(|a, b| b.null_percent.total_cmp(&a.null_percent));
    stats
}

fn null_percent(null_count: usize, rows: usize) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    round2(null_count as f64 / rows as f64 * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::Value,
        dataset::{Column, Table},
    };

    fn registry_sample() -> Table {
        Table::new(vec![
            Column::new(
                "nombre_act",
                vec![Some(Value::from("panaderia")), Some(Value::from("panaderia")), None],
            ),
            Column::new(
                "municipio",
                vec![
                    Some(Value::from("Colima")),
                    Some(Value::from("Colima")),
                    Some(Value::from("Tecoman")),
                ],
            ),
            Column::new(
                "per_ocu",
                vec![Some(Value::Integer(5)), Some(Value::Integer(3)), Some(Value::Integer(1))],
            ),
        ])
        .expect("table")
    }

    #[test]
    fn percentages_are_rounded_to_two_places() {
        let stats = profile_nulls(&registry_sample());
        assert_eq!(stats[0].column, "nombre_act");
        assert_eq!(stats[0].null_count, 1);
        assert_eq!(stats[0].null_percent, 33.33);
        let per_ocu = stats.iter().find(|s| s.column == "per_ocu").unwrap();
        assert_eq!(per_ocu.null_count, 0);
        assert_eq!(per_ocu.null_percent, 0.0);
    }

    #[test]
    fn ties_keep_column_order() {
        let stats = profile_nulls(&registry_sample());
        let order: Vec<&str> = stats.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(order, vec!["nombre_act", "municipio", "per_ocu"]);
    }

    #[test]
    fn empty_table_reports_zero_percent() {
        let table = Table::new(vec![Column::new("a", vec![]), Column::new("b", vec![])])
            .expect("table");
        let stats = profile_nulls(&table);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.null_count == 0 && s.null_percent == 0.0));
    }

    #[test]
    fn round2_handles_thirds() {
        assert_eq!(round2(200.0 / 3.0), 66.67);
        assert_eq!(round2(100.0), 100.0);
    }
}
