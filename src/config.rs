use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub population: PopulationCfg,
    pub simulation: SimulationCfg,
    pub rates: RatesCfg,
}

/// Controller population parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PopulationCfg {
    /// Number of pneumatic controllers.
    pub pc_count: usize,

    /// Mean initial properly operating fraction.
    pub s0_mean: f64,
    /// Half-width of the uniform spread around `s0_mean`.
    pub s0_variation: f64,

    /// Minimum sampled days to failure.
    pub dtf_min: u32,
    /// Maximum sampled days to failure.
    pub dtf_max: u32,
}

/// Monte Carlo run parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationCfg {
    /// Number of simulated days per trial.
    pub timesteps: usize,

    /// Gas density (metric tons per standard cubic foot).
    pub gas_density_factor: f64,

    /// Number of Monte Carlo trials.
    pub trial_count: usize,

    /// RNG seed; drawn from OS entropy when absent.
    pub seed: Option<u64>,
}

/// Empirical emission-rate sample pools (scfh).
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RatesCfg {
    /// Properly operating emission-rate samples.
    pub prop: Vec<f64>,
    /// Malfunctioning emission-rate samples.
    pub malf: Vec<f64>,
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.population.pc_count, 1..=1000).context("invalid controller count")?;
        check_num(self.population.s0_mean, 0.0..=1.0)
            .context("invalid mean properly operating fraction")?;
        check_num(self.population.s0_variation, 0.0..=1.0)
            .context("invalid properly operating fraction variation")?;
        check_num(self.population.dtf_min, 1..=365).context("invalid minimum days to failure")?;
        check_num(self.population.dtf_max, self.population.dtf_min..=365)
            .context("invalid maximum days to failure")?;

        check_num(self.simulation.timesteps, 1..=10_000).context("invalid number of timesteps")?;
        if !(self.simulation.gas_density_factor > 0.0) {
            bail!(
                "gas density factor must be positive, but is {}",
                self.simulation.gas_density_factor
            );
        }
        check_num(self.simulation.trial_count, 1..=10_000).context("invalid trial count")?;

        check_pool(&self.rates.prop).context("invalid properly operating rate pool")?;
        check_pool(&self.rates.malf).context("invalid malfunctioning rate pool")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_pool(pool: &[f64]) -> Result<()> {
    if pool.is_empty() {
        bail!("rate pool must not be empty");
    }
    if pool.iter().any(|&rate| !rate.is_finite() || rate < 0.0) {
        bail!("rate pool must have only finite non-negative samples");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_toml() -> String {
        String::new()
            + "[population]\n"
            + "pc_count = 100\n"
            + "s0_mean = 0.82\n"
            + "s0_variation = 0.1\n"
            + "dtf_min = 7\n"
            + "dtf_max = 180\n"
            + "\n"
            + "[simulation]\n"
            + "timesteps = 365\n"
            + "gas_density_factor = 0.0000192\n"
            + "trial_count = 100\n"
            + "seed = 42\n"
            + "\n"
            + "[rates]\n"
            + "prop = [ 0.5, 1.0, 2.5,]\n"
            + "malf = [ 10.0, 25.0, 40.0,]\n"
    }

    #[test]
    fn valid_config_passes() {
        let cfg: Config = toml::from_str(&valid_toml()).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.population.pc_count, 100);
        assert_eq!(cfg.simulation.seed, Some(42));
    }

    #[test]
    fn seed_is_optional() {
        let toml_str = valid_toml().replace("seed = 42\n", "");
        let cfg: Config = toml::from_str(&toml_str).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.simulation.seed, None);
    }

    #[test]
    fn empty_rate_pool_fails() {
        let toml_str = valid_toml().replace("malf = [ 10.0, 25.0, 40.0,]\n", "malf = []\n");
        let cfg: Config = toml::from_str(&toml_str).unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_rate_fails() {
        let toml_str = valid_toml().replace("prop = [ 0.5,", "prop = [ -0.5,");
        let cfg: Config = toml::from_str(&toml_str).unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_dtf_bounds_fail() {
        let toml_str = valid_toml().replace("dtf_max = 180\n", "dtf_max = 3\n");
        let cfg: Config = toml::from_str(&toml_str).unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_pc_count_fails() {
        let toml_str = valid_toml().replace("pc_count = 100\n", "pc_count = 0\n");
        let cfg: Config = toml::from_str(&toml_str).unwrap();
        assert!(cfg.validate().is_err());
    }
}
