//! Cross-run analysis of persisted ensembles.
//!
//! Each observable reduces one ensemble quantity to summary statistics; the
//! [`Analyzer`] feeds every persisted ensemble through all observables and
//! writes their reports as JSON.

use crate::config::Config;
use crate::model::Ensemble;
use crate::stats::Accumulator;
use anyhow::{Context, Result};
use rmp_serde::decode;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

pub trait Obs {
    fn update(&mut self, ens: &Ensemble) -> Result<()>;
    fn report(&self) -> serde_json::Value;
}

/// Time-averaged emission rate per controller (scfh).
pub struct AvgRate {
    acc: Accumulator,
}

impl AvgRate {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for AvgRate {
    fn update(&mut self, ens: &Ensemble) -> Result<()> {
        for &val in &ens.avg_rate {
            self.acc.add(val);
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "avg_emission_rate_scfh": self.acc.report() })
    }
}

/// Annual population emissions (metric tons).
pub struct PopulationEmission {
    acc: Accumulator,
}

impl PopulationEmission {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for PopulationEmission {
    fn update(&mut self, ens: &Ensemble) -> Result<()> {
        for &val in &ens.final_cum_emission {
            self.acc.add(val);
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "population_emission_tons": self.acc.report() })
    }
}

/// Annual emissions per controller (metric tons).
pub struct PerPcEmission {
    pc_count: usize,
    acc: Accumulator,
}

impl PerPcEmission {
    pub fn new(cfg: &Config) -> Self {
        Self {
            pc_count: cfg.population.pc_count,
            acc: Accumulator::new(),
        }
    }
}

impl Obs for PerPcEmission {
    fn update(&mut self, ens: &Ensemble) -> Result<()> {
        for &val in &ens.final_cum_emission {
            self.acc.add(val / self.pc_count as f64);
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "per_pc_emission_tons": self.acc.report() })
    }
}

/// Sampled days to failure.
pub struct DaysToFailure {
    acc: Accumulator,
}

impl DaysToFailure {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for DaysToFailure {
    fn update(&mut self, ens: &Ensemble) -> Result<()> {
        for &dtf in &ens.dtf {
            self.acc.add(dtf as f64);
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "days_to_failure": self.acc.report() })
    }
}

/// Sampled initial properly operating fraction.
pub struct ProperFraction {
    acc: Accumulator,
}

impl ProperFraction {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for ProperFraction {
    fn update(&mut self, ens: &Ensemble) -> Result<()> {
        for &s0 in &ens.s0 {
            self.acc.add(s0);
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::json!({ "proper_fraction": self.acc.report() })
    }
}

pub struct Analyzer {
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new(cfg: &Config) -> Self {
        let mut obs_ptr_vec: Vec<Box<dyn Obs>> = Vec::new();
        obs_ptr_vec.push(Box::new(AvgRate::new()));
        obs_ptr_vec.push(Box::new(PopulationEmission::new()));
        obs_ptr_vec.push(Box::new(PerPcEmission::new(cfg)));
        obs_ptr_vec.push(Box::new(DaysToFailure::new()));
        obs_ptr_vec.push(Box::new(ProperFraction::new()));
        Self { obs_ptr_vec }
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);

        let ens: Ensemble = decode::from_read(&mut reader).context("failed to read ensemble")?;
        for obs in &mut self.obs_ptr_vec {
            obs.update(&ens).context("failed to update observable")?;
        }
        Ok(())
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let writer = BufWriter::new(file);

        let reports: Vec<_> = self.obs_ptr_vec.iter().map(|obs| obs.report()).collect();
        serde_json::to_writer_pretty(writer, &reports)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ensemble() -> Ensemble {
        let mut ens = Ensemble::with_capacity(3);
        ens.push(30, 0.8, 2.0, 10.0);
        ens.push(60, 0.9, 4.0, 20.0);
        ens.push(90, 0.7, 6.0, 30.0);
        ens
    }

    #[test]
    fn avg_rate_obs_reports_mean() {
        let mut obs = AvgRate::new();
        obs.update(&test_ensemble()).unwrap();

        let report = obs.report();
        let mean = report["avg_emission_rate_scfh"]["mean"].as_f64().unwrap();
        assert!((mean - 4.0).abs() < 1e-12);
    }

    #[test]
    fn days_to_failure_obs_reports_mean() {
        let mut obs = DaysToFailure::new();
        obs.update(&test_ensemble()).unwrap();

        let report = obs.report();
        let mean = report["days_to_failure"]["mean"].as_f64().unwrap();
        assert!((mean - 60.0).abs() < 1e-12);
    }
}
