use std::convert::TryFrom;
use std::str::FromStr;

use log::LevelFilter;
use once_cell::sync::Lazy;

use quaybn_maths::sampling::SamplerConfig;

const DEFAULT_SEED: u64 = 42;
const DEFAULT_SAMPLES: usize = 100_000;
const DEFAULT_MAX_DRAWS: usize = 10_000_000;

static LOG_LEVEL: Lazy<LevelFilter> = Lazy::new(logger_level);

/// Level of the run configuration; the default level when it cannot be read.
fn logger_level() -> LevelFilter {
    RunConfig::from_env()
        .map(|conf| conf.log_level)
        .unwrap_or_else(|_| RunConfig::default().log_level)
}

#[derive(Clone, Copy)]
pub struct Logger;

impl Logger {
    pub fn get_logger() -> &'static Logger {
        Lazy::force(&LOGGER)
    }
}

#[allow(unused_must_use)]
static LOGGER: Lazy<Logger> = Lazy::new(|| {
    env_logger::builder()
        .format_module_path(true)
        .format_timestamp_nanos()
        .target(env_logger::Target::Stdout)
        .filter(None, *LOG_LEVEL)
        .try_init();

    Logger
});

#[derive(Debug, thiserror::Error)]
pub enum RunConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("`{key}` must be a non-negative integer, got {value}")]
    Negative { key: &'static str, value: i64 },
}

/// Settings of a scenario run, read from `QUAYBN_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// `QUAYBN_SEED`
    pub seed: u64,
    /// `QUAYBN_SAMPLES`, joint draws per query.
    pub samples: usize,
    /// `QUAYBN_MAX_DRAWS`; zero disables the cap.
    pub max_draws: Option<usize>,
    /// `QUAYBN_LOG_LEVEL`, the level the logger is set up with.
    pub log_level: LevelFilter,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            seed: DEFAULT_SEED,
            samples: DEFAULT_SAMPLES,
            max_draws: Some(DEFAULT_MAX_DRAWS),
            log_level: LevelFilter::Info,
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Result<RunConfig, RunConfigError> {
        let mut settings = config::Config::new();
        settings.merge(config::Environment::with_prefix("QUAYBN"))?;
        RunConfig::from_settings(&settings)
    }

    fn from_settings(settings: &config::Config) -> Result<RunConfig, RunConfigError> {
        let defaults = RunConfig::default();
        let seed = read_count(settings, "seed")?.unwrap_or(defaults.seed);
        let samples = read_count(settings, "samples")?.map_or(defaults.samples, |v| v as usize);
        let max_draws = match read_count(settings, "max_draws")? {
            None => defaults.max_draws,
            Some(0) => None,
            Some(v) => Some(v as usize),
        };
        let log_level = match settings.get_str("log_level") {
            Ok(level) => LevelFilter::from_str(&level).unwrap_or(defaults.log_level),
            Err(_) => defaults.log_level,
        };
        Ok(RunConfig {
            seed,
            samples,
            max_draws,
            log_level,
        })
    }

    pub fn sampler(&self) -> SamplerConfig {
        SamplerConfig {
            max_draws: self.max_draws,
        }
    }
}

fn read_count(settings: &config::Config, key: &'static str) -> Result<Option<u64>, RunConfigError> {
    match settings.get_int(key) {
        Ok(value) => u64::try_from(value)
            .map(Some)
            .map_err(|_| RunConfigError::Negative { key, value }),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let settings = config::Config::new();
        let conf = RunConfig::from_settings(&settings).unwrap();
        assert_eq!(conf, RunConfig::default());
        assert_eq!(conf.sampler(), SamplerConfig::default());
    }

    #[test]
    fn overrides() {
        let mut settings = config::Config::new();
        settings.set("seed", 7_i64).unwrap();
        settings.set("samples", 5_000_i64).unwrap();
        settings.set("max_draws", 0_i64).unwrap();
        settings.set("log_level", "debug").unwrap();
        let conf = RunConfig::from_settings(&settings).unwrap();
        assert_eq!(conf.log_level, LevelFilter::Debug);
        assert_eq!(conf.seed, 7);
        assert_eq!(conf.samples, 5_000);
        assert_eq!(conf.max_draws, None);
    }

    #[test]
    fn logger_follows_the_run_config() {
        std::env::set_var("QUAYBN_LOG_LEVEL", "warn");
        let conf = RunConfig::from_env().unwrap();
        let level = logger_level();
        std::env::remove_var("QUAYBN_LOG_LEVEL");
        assert_eq!(conf.log_level, LevelFilter::Warn);
        assert_eq!(level, conf.log_level);
    }

    #[test]
    fn rejects_bad_values() {
        let mut settings = config::Config::new();
        settings.set("samples", -3_i64).unwrap();
        assert!(matches!(
            RunConfig::from_settings(&settings),
            Err(RunConfigError::Negative { key: "samples", .. })
        ));
        let mut settings = config::Config::new();
        settings.set("seed", "many").unwrap();
        assert!(matches!(
            RunConfig::from_settings(&settings),
            Err(RunConfigError::Source(_))
        ));
    }
}
