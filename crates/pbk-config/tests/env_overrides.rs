use std::path::Path;

use figment::Jail;
use pbk_config::PbkConfig;

#[test]
fn env_vars_override_defaults() {
    Jail::expect_with(|jail| {
        jail.set_env("PBK_PATHS__OUTPUT_DIR", "out/scenarios");
        jail.set_env("PBK_SCENARIO__FREQUENCY", "12");

        let config = PbkConfig::load_from(Path::new(".")).expect("config loads");
        assert_eq!(config.paths.output_dir, "out/scenarios");
        assert_eq!(config.scenario.frequency, 12);
        Ok(())
    });
}

#[test]
fn env_vars_beat_project_file() {
    Jail::expect_with(|jail| {
        jail.create_file("pbk.toml", "[scenario]\ncovariate = \"BW_file\"\n")?;
        jail.set_env("PBK_SCENARIO__COVARIATE", "BW_env");

        let config = PbkConfig::load_from(Path::new(".")).expect("config loads");
        assert_eq!(config.scenario.covariate, "BW_env");
        Ok(())
    });
}

#[test]
fn dotenv_file_in_root_is_loaded() {
    Jail::expect_with(|jail| {
        jail.create_file(".env", "PBK_PIPELINE__SOURCE_EXTENSION=antimony\n")?;

        let config = PbkConfig::load_with_dotenv(Path::new(".")).expect("config loads");
        assert_eq!(config.pipeline.source_extension, "antimony");
        jail.set_env("PBK_PIPELINE__SOURCE_EXTENSION", "ant");
        Ok(())
    });
}
