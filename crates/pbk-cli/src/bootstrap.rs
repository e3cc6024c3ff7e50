use std::path::Path;

use anyhow::Context;
use pbk_config::PbkConfig;

/// Load `.env` and the layered configuration for `project_root`.
pub fn load_config(project_root: &Path) -> anyhow::Result<PbkConfig> {
    let config = PbkConfig::load_with_dotenv(project_root).with_context(|| {
        format!(
            "failed to load configuration for {}",
            project_root.display()
        )
    })?;
    tracing::debug!(
        root = %project_root.display(),
        model_dir = %config.paths.model_dir,
        "configuration loaded"
    );
    Ok(config)
}
