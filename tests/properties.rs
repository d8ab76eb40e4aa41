use encoding_rs::UTF_8;
use proptest::prelude::*;
use registry_profiler::{
    aggregate::{AggregateRequest, Direction, SortKey, SortOrder, aggregate},
    classify::{KeywordSets, Role, classify},
    data::{Value, parse_typed_value},
    dataset::{Column, Table},
    ingest::{DEFAULT_NULL_TOKENS, IngestOptions, ingest_reader},
    nulls::profile_nulls,
    schema::describe,
};

/// A raw CSV cell and whether it spells a null token.
#[derive(Debug, Clone)]
struct RawCell {
    text: String,
    is_token: bool,
}

fn raw_cell_strategy() -> impl Strategy<Value = RawCell> {
    let token = (
        prop::sample::select(DEFAULT_NULL_TOKENS.to_vec()),
        " {0,2}",
        " {0,2}",
    )
        .prop_map(|(token, before, after)| RawCell {
            text: format!("{before}{token}{after}"),
            is_token: true,
        });
    let text = "[a-zA-Z0-9 ./-]{1,8}"
        .prop_filter("not a null token", |raw: &String| {
            !DEFAULT_NULL_TOKENS.contains(&raw.trim())
        })
        .prop_map(|text| RawCell {
            text,
            is_token: false,
        });
    prop_oneof![1 => token, 3 => text]
}

fn cell_strategy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        1 => Just(None),
        4 => prop::sample::select(vec!["Colima", "Tecoman", "Manzanillo", "Armeria", "Comala"])
            .prop_map(|name| Some(Value::from(name))),
    ]
}

fn table_strategy() -> impl Strategy<Value = Table> {
    (0usize..40).prop_flat_map(|rows| {
        (
            prop::collection::vec(cell_strategy(), rows),
            prop::collection::vec(cell_strategy(), rows),
        )
            .prop_map(|(municipio, localidad)| {
                Table::new(vec![
                    Column::new("municipio", municipio),
                    Column::new("localidad", localidad),
                ])
                .expect("consistent table")
            })
    })
}

fn order_strategy() -> impl Strategy<Value = SortOrder> {
    (
        prop_oneof![Just(SortKey::Count), Just(SortKey::Key)],
        prop_oneof![Just(Direction::Asc), Just(Direction::Desc)],
    )
        .prop_map(|(by, direction)| SortOrder { by, direction })
}

fn header_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(
        prop::sample::select(vec![
            "codigo_act", "nombre_act", "calle", "colonia", "municipio", "per_ocu", "nombre",
            "telefono", "Estrato", "id",
        ]),
        0..10,
    )
    .prop_map(|names| names.into_iter().map(str::to_string).collect())
}

proptest! {
    #[test]
    fn null_tokens_round_trip_through_ingestion(
        cells in prop::collection::vec(raw_cell_strategy(), 1..30)
    ) {
        let mut csv = String::from("estrato,id\n");
        for (id, cell) in cells.iter().enumerate() {
            csv.push_str(&format!("{},{id}\n", cell.text));
        }
        let options = IngestOptions {
            encoding: UTF_8,
            ..IngestOptions::default()
        };
        let table = ingest_reader(csv.as_bytes(), &options).expect("ingest");
        prop_assert_eq!(table.row_count(), cells.len());

        let column = table.column("estrato").expect("estrato");
        let column_type = column.column_type();
        for (cell, loaded) in cells.iter().zip(column.values()) {
            if cell.is_token {
                prop_assert_eq!(loaded, &None);
            } else {
                let expected = parse_typed_value(&cell.text, column_type);
                prop_assert!(expected.is_some());
                prop_assert_eq!(loaded, &expected);
            }
        }
        let tokens = cells.iter().filter(|cell| cell.is_token).count();
        prop_assert_eq!(column.null_count(), tokens);
    }

    #[test]
    fn untruncated_counts_cover_every_row(table in table_strategy(), order in order_strategy()) {
        let request = AggregateRequest {
            group_column: "municipio".to_string(),
            top_n: 0,
            order,
            exclude_nulls: false,
            require_rows: false,
        };
        let result = aggregate(&table, &request).expect("aggregate");
        let total: usize = result.groups.iter().map(|g| g.count).sum();
        prop_assert_eq!(total, table.row_count());
        prop_assert_eq!(result.counted_rows, table.row_count());
        prop_assert_eq!(result.len(), result.distinct_groups);
    }

    #[test]
    fn truncation_keeps_the_highest_counts(table in table_strategy(), top_n in 1usize..6) {
        let full = aggregate(&table, &AggregateRequest::top("localidad", 0)).expect("full");
        let truncated = aggregate(&table, &AggregateRequest::top("localidad", top_n)).expect("top");
        prop_assert_eq!(truncated.len(), top_n.min(full.distinct_groups));
        prop_assert_eq!(&truncated.groups[..], &full.groups[..truncated.len()]);
        for pair in truncated.groups.windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn excluding_nulls_counts_only_present_values(table in table_strategy()) {
        let result = aggregate(&table, &AggregateRequest::distribution("municipio"))
            .expect("distribution");
        let present = table
            .column("municipio")
            .expect("municipio")
            .values()
            .iter()
            .filter(|value| value.is_some())
            .count();
        prop_assert_eq!(result.counted_rows, present);
        prop_assert!(result.groups.iter().all(|g| g.key.is_some()));
        for pair in result.groups.windows(2) {
            prop_assert!(pair[0].key < pair[1].key);
        }
    }

    #[test]
    fn null_percentages_are_bounded_and_sorted(table in table_strategy()) {
        let stats = profile_nulls(&table);
        prop_assert_eq!(stats.len(), table.column_count());
        let total: usize = stats.iter().map(|s| s.null_count).sum();
        prop_assert_eq!(total, table.null_cell_count());
        for stat in &stats {
            prop_assert!((0.0..=100.0).contains(&stat.null_percent));
            prop_assert!(stat.null_count <= table.row_count());
        }
        for pair in stats.windows(2) {
            prop_assert!(pair[0].null_percent >= pair[1].null_percent);
        }
    }

    #[test]
    fn role_candidates_keep_table_order(headers in header_strategy()) {
        let columns = headers
            .iter()
            .map(|name| Column::new(name.as_str(), Vec::new()))
            .collect();
        let table = Table::new(columns).expect("table");
        let descriptors = describe(&table);
        let roles = classify(&descriptors, &KeywordSets::default());
        for role in Role::ALL {
            let positions: Vec<usize> = roles
                .get(role)
                .iter()
                .map(|name| headers.iter().position(|h| h == name).expect("known column"))
                .collect();
            prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        }
        let classified: usize = Role::ALL.iter().map(|role| roles.get(*role).len()).sum();
        prop_assert!(classified + roles.unclassified(&descriptors).len() >= headers.len());
    }
}
