//! Monte Carlo driver.
//!
//! Samples trial parameters from their configured ranges, invokes the
//! simulator once per trial, and collects the cross-trial scalar summaries.

use crate::config::Config;
use crate::engine::{self, TrialParams};
use crate::model::Ensemble;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Uniform;

/// Monte Carlo driver.
///
/// Holds the configuration and the random number generator consumed by all
/// sampling calls within and across trials.
pub struct Driver {
    cfg: Config,
    rng: ChaCha12Rng,
}

impl Driver {
    /// Create a new `Driver`, seeding the RNG from the configuration or,
    /// when no seed is given, from OS entropy.
    pub fn new(cfg: Config) -> Result<Self> {
        let rng = match cfg.simulation.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };
        Ok(Self { cfg, rng })
    }

    /// Run the full ensemble and return one summary entry per trial.
    ///
    /// Any simulator error aborts the remaining trials; no partial ensemble
    /// is returned.
    pub fn run_ensemble(&mut self) -> Result<Ensemble> {
        let pop = self.cfg.population.clone();
        let sim = self.cfg.simulation.clone();

        let s0_min = (pop.s0_mean - pop.s0_variation).max(0.0);
        let s0_max = (pop.s0_mean + pop.s0_variation).min(1.0);

        let dtf_dist = Uniform::new_inclusive(pop.dtf_min, pop.dtf_max)?;
        let s0_dist = Uniform::new_inclusive(s0_min, s0_max)?;

        let mut ens = Ensemble::with_capacity(sim.trial_count);
        for i_trial in 0..sim.trial_count {
            let dtf = dtf_dist.sample(&mut self.rng).max(1);
            let s0 = s0_dist.sample(&mut self.rng);
            let s1 = 1.0 - s0;

            // Target the steady state r / (p + r) = s0 given a mean time to
            // failure of dtf days. With s1 = 0 the derived r is infinite and
            // the simulator's clamp takes it to certain repair.
            let p = s0 / dtf as f64;
            let r = if s1 > 0.0 { (p / s1) - p } else { f64::INFINITY };

            let par = TrialParams {
                pc_count: pop.pc_count,
                dtf,
                s0,
                s1,
                p,
                r,
                timesteps: sim.timesteps,
                gas_density: sim.gas_density_factor,
            };

            let traj = engine::simulate(&par, &self.cfg.rates.prop, &self.cfg.rates.malf, &mut self.rng)
                .with_context(|| format!("failed to simulate trial {i_trial}"))?;

            ens.push(dtf, s0, traj.all_avg_rate, traj.final_cum_emission);

            let progress = 100.0 * (i_trial + 1) as f64 / sim.trial_count as f64;
            log::info!("completed {progress:06.2}%");
        }

        Ok(ens)
    }
}
