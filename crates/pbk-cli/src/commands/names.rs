use pbk_pipeline::ArtifactNames;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::NamesArgs;
use crate::output::output;

/// Handle `pbk names`.
pub fn handle(args: &NamesArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&ArtifactNames::from_base(&args.path), flags.format)
}
