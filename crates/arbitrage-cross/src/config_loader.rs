use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::config::EngineConfig;
use crate::error::ConfigError;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

/// Prefix of environment overrides, e.g. `ARB_MATCHING__STRATEGY`.
pub const ENV_PREFIX: &str = "ARB_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads engine configuration by merging defaults, `config/Config.toml`
    /// and `ARB_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or values are invalid.
    pub fn load() -> Result<EngineConfig, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads engine configuration from a specific TOML file.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or values are invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
        Self::extract(Self::base(path.as_ref()).merge(Self::env()))
    }

    /// Loads engine configuration with a profile overlay
    /// (`config/Config.{profile}.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed or values are invalid.
    pub fn load_with_profile(profile: &str) -> Result<EngineConfig, ConfigError> {
        let figment = Self::base(Path::new(DEFAULT_CONFIG_PATH))
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Self::env());
        Self::extract(figment)
    }

    fn base(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(EngineConfig::default())).merge(Toml::file(path))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatcherKind;
    use figment::Jail;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load().expect("defaults load");
            assert_eq!(config, EngineConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_file() {
        Jail::expect_with(|jail| {
            std::fs::create_dir_all("config").expect("config dir");
            jail.create_file(
                "config/Config.toml",
                r#"
                [matching]
                strategy = "numeric_strict"
                similarity_threshold = 0.8

                [evaluator]
                min_margin = "0.02"

                [sources]
                kalshi_path = "fixtures/kalshi.json"
                "#,
            )?;

            let config = ConfigLoader::load().expect("toml loads");
            assert_eq!(config.matching.strategy, MatcherKind::NumericStrict);
            assert!((config.matching.similarity_threshold - 0.8).abs() < f64::EPSILON);
            assert_eq!(config.matching.min_common_keywords, 2);
            assert_eq!(config.evaluator.min_margin, dec!(0.02));
            assert_eq!(config.evaluator.max_margin, dec!(0.5));
            assert_eq!(
                config.sources.kalshi_path,
                std::path::PathBuf::from("fixtures/kalshi.json")
            );
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            std::fs::create_dir_all("config").expect("config dir");
            jail.create_file(
                "config/Config.toml",
                "[matching]\nconfidence_threshold = 0.7\n",
            )?;
            jail.set_env("ARB_MATCHING__CONFIDENCE_THRESHOLD", "0.75");
            jail.set_env("ARB_ANNOTATION__ENABLED", "false");

            let config = ConfigLoader::load().expect("env merges");
            assert!((config.matching.confidence_threshold - 0.75).abs() < f64::EPSILON);
            assert!(!config.annotation.enabled);
            Ok(())
        });
    }

    #[test]
    fn test_profile_overlay() {
        Jail::expect_with(|jail| {
            std::fs::create_dir_all("config").expect("config dir");
            jail.create_file("config/Config.toml", "[matching]\nmin_common_keywords = 2\n")?;
            jail.create_file(
                "config/Config.strict.toml",
                "[matching]\nmin_common_keywords = 3\nstrategy = \"numeric_strict\"\n",
            )?;

            let config = ConfigLoader::load_with_profile("strict").expect("profile loads");
            assert_eq!(config.matching.min_common_keywords, 3);
            assert_eq!(config.matching.strategy, MatcherKind::NumericStrict);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[normalizer]\npolymarket_yes_index = 3\n")?;
            let err = ConfigLoader::load_from("custom.toml").unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_toml_is_extract_error() {
        Jail::expect_with(|jail| {
            jail.create_file("broken.toml", "[matching\nstrategy = ")?;
            let err = ConfigLoader::load_from("broken.toml").unwrap_err();
            assert!(matches!(err, ConfigError::Extract(_)));
            Ok(())
        });
    }
}
