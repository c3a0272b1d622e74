mod argparse;
mod commands;
mod utils;

use argparse::parse_args;

fn main() -> anyhow::Result<()> {
    let cli = parse_args();
    utils::init_logger(cli.verbose);

    commands::handle_command(cli.command)
}
