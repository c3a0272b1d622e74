use crate::argparse::CompileArgs;
use anyhow::{bail, Context, Result};
use search_cli::{Config, Registry};
use search_query::{parse_count, parse_start, SearchInfo};
use serde_json::json;

fn parse_inputs(inputs: &[String]) -> Result<SearchInfo> {
    inputs
        .iter()
        .map(|input| {
            input
                .split_once('=')
                .with_context(|| format!("Expected FIELD=VALUE, got '{}'", input))
        })
        .collect()
}

pub fn handle_compile_command(args: CompileArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let registry = Registry::from_config(&config)?;
    let mut info = parse_inputs(&args.inputs)?;

    let query = match registry.compile(&mut info) {
        Ok(query) => query,
        Err(err) if info.has_error() => {
            for message in info.take_flashes() {
                eprintln!("{}", message);
            }
            bail!("Search abandoned: {}", err);
        }
        Err(err) => bail!("Search form is misconfigured: {}", err),
    };

    let count = parse_count(&mut info, config.paging.count);
    let start = parse_start(&info, config.paging.start);
    log::info!("Compiled {} fields, count {} start {}", query.field_count(), count, start);

    let output = json!({
        "query": query.to_json(),
        "count": count,
        "start": start,
    });
    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}
