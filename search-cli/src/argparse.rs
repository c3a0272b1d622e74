use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sq",
    about = "Compile search form input into a database query",
    version,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Pick which subcommand to use
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile field=value inputs and print the query as JSON
    Compile(CompileArgs),
    /// List the fields of a search form
    Fields(FieldsArgs),
}

#[derive(Args)]
pub struct CompileArgs {
    /// Search form description (TOML)
    #[arg(long, short)]
    pub config: PathBuf,

    /// Print the query on a single line
    #[arg(long)]
    pub compact: bool,

    /// Form input, e.g. degree=2..4 count=20
    #[arg(value_name = "FIELD=VALUE")]
    pub inputs: Vec<String>,
}

#[derive(Args)]
pub struct FieldsArgs {
    /// Search form description (TOML)
    #[arg(long, short)]
    pub config: PathBuf,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
