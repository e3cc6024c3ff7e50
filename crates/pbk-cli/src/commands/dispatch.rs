use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Build(args) => commands::build::handle(&args, ctx, flags),
        Commands::CheckParams(args) => commands::check_params::handle(&args, ctx, flags),
        Commands::Simulate { action } => commands::simulate::handle(&action, ctx, flags),
        Commands::Names(args) => commands::names::handle(&args, flags),
    }
}
