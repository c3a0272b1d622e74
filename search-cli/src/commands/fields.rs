use crate::argparse::FieldsArgs;
use anyhow::Result;
use search_cli::{Config, Registry};
use search_query::display_name;
use tabular::{Row, Table};

pub fn handle_fields_command(args: FieldsArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let registry = Registry::from_config(&config)?;

    let mut table = Table::new("{:<}  {:<}  {:<}  {:<}  {:<}");
    table.add_row(Row::from_cells(
        ["Field", "Kind", "Query key", "Name", "Paired"].iter().cloned(),
    ));
    for entry in registry.fields() {
        let name = entry.label.clone().unwrap_or_else(|| display_name(&entry.name));
        table.add_row(
            Row::new()
                .with_cell(&entry.name)
                .with_cell(entry.kind)
                .with_cell(&entry.qfield)
                .with_cell(name)
                .with_cell(if registry.is_paired(&entry.name) { "yes" } else { "" }),
        );
    }
    print!("{}", table);
    println!(
        "Page size {} starting at {}",
        config.paging.count, config.paging.start
    );
    Ok(())
}
