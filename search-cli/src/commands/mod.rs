mod compile;
mod fields;

use crate::argparse::Commands;
pub use compile::handle_compile_command;
pub use fields::handle_fields_command;

pub fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Compile(args) => handle_compile_command(args),
        Commands::Fields(args) => handle_fields_command(args),
    }
}
