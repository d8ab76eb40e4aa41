use anyhow::Result;
use log::info;

use crate::{
    cli::{OutputFormat, PreviewArgs},
    load_input, print_json,
    report::PreviewView,
    table::{Align, TextTable},
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let (config, table) = load_input(&args.input)?;
    let rows = args.rows.unwrap_or(config.report.preview_rows);
    let columns = if args.columns.is_empty() {
        table
            .column_names()
            .into_iter()
            .take(config.report.preview_columns)
            .map(str::to_string)
            .collect::<Vec<_>>()
    } else {
        args.columns
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    };
    let preview = table.preview(&columns, rows)?;

    match args.format {
        OutputFormat::Json => print_json(&PreviewView {
            columns,
            rows: preview.records(),
        })?,
        OutputFormat::Table => {
            let mut rendered = preview
                .columns()
                .iter()
                .enumerate()
                .filter(|(_, column)| column.column_type().is_numeric())
                .fold(TextTable::new(columns.iter().cloned()), |table, (idx, _)| {
                    table.align(idx, Align::Right)
                });
            rendered.extend_rows(preview.display_rows());
            print!("{}", rendered.render());
        }
    }
    info!(
        "Displayed {} row(s) from {:?}",
        preview.row_count(),
        args.input.input
    );
    Ok(())
}
