//! Population Markov simulator.
//!
//! Advances a population of pneumatic controllers through a two-state
//! discrete-time Markov chain with transition matrix `[[1-p, p], [r, 1-r]]`
//! and accumulates the emission trajectories into per-step series and
//! scalar summaries.

use crate::model::{Pc, PcState, Trajectory};
use rand::prelude::*;
use rand_distr::Bernoulli;
use std::{error, fmt};

/// Error taxonomy of a single simulation call.
///
/// Out-of-range transition probabilities are deliberately *not* part of it:
/// `p` and `r` are clamped into `[0, 1]` to tolerate numerically degenerate
/// derived values.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// A user-supplied parameter violated its constraint.
    InvalidParameter(String),

    /// An empirical rate pool contained no samples.
    EmptyRatePool(&'static str),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::EmptyRatePool(pool) => write!(f, "rate pool {pool:?} is empty"),
        }
    }
}

impl error::Error for SimError {}

/// Parameters of one simulated trial.
#[derive(Debug, Clone)]
pub struct TrialParams {
    /// Number of controllers in the population.
    pub pc_count: usize,
    /// Mean days a controller stays properly operating before failing.
    pub dtf: u32,
    /// Initial properly operating fraction.
    pub s0: f64,
    /// Initial malfunctioning fraction (`1 - s0`).
    pub s1: f64,
    /// Per-day failure probability (properly operating -> malfunctioning).
    pub p: f64,
    /// Per-day repair probability (malfunctioning -> properly operating).
    pub r: f64,
    /// Number of simulated days.
    pub timesteps: usize,
    /// Gas density (metric tons per standard cubic foot).
    pub gas_density: f64,
}

impl TrialParams {
    fn validate(&self) -> Result<(), SimError> {
        if self.pc_count < 1 {
            return Err(SimError::InvalidParameter(
                "PC count must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.s0) {
            return Err(SimError::InvalidParameter(format!(
                "S0 must be in [0, 1], but is {}",
                self.s0
            )));
        }
        if self.dtf < 1 {
            return Err(SimError::InvalidParameter(format!(
                "DTF must be positive, but is {}",
                self.dtf
            )));
        }
        if self.timesteps < 1 {
            return Err(SimError::InvalidParameter(
                "timesteps must be at least 1".into(),
            ));
        }
        if !(self.gas_density > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "gas density must be positive, but is {}",
                self.gas_density
            )));
        }
        Ok(())
    }
}

/// Run one full trial and return its complete trajectory.
///
/// Each controller draws one healthy and one faulty rate from the pools
/// (with replacement), an initial state weighted by `s0`, and then one
/// uniform value per day compared against the clamped `p` or `r`.
/// Transitions are computed from the pre-step state and applied atomically
/// at step end.
///
/// # Errors
/// Returns [`SimError::InvalidParameter`] if a parameter constraint is
/// violated and [`SimError::EmptyRatePool`] if either pool has no samples.
/// No partial trajectory is returned on error.
pub fn simulate<R: Rng>(
    par: &TrialParams,
    prop_pool: &[f64],
    malf_pool: &[f64],
    rng: &mut R,
) -> Result<Trajectory, SimError> {
    par.validate()?;

    if prop_pool.is_empty() {
        return Err(SimError::EmptyRatePool("prop_rates"));
    }
    if malf_pool.is_empty() {
        return Err(SimError::EmptyRatePool("malf_rates"));
    }

    // Tolerance policy: degenerate derived probabilities are truncated, not rejected.
    let p = par.p.clamp(0.0, 1.0);
    let r = par.r.clamp(0.0, 1.0);

    let malf_init = Bernoulli::new(par.s1)
        .map_err(|err| SimError::InvalidParameter(format!("invalid S1 {}: {err}", par.s1)))?;

    let mut pc_vec = Vec::with_capacity(par.pc_count);
    for _ in 0..par.pc_count {
        let &prop_rate = prop_pool
            .choose(rng)
            .ok_or(SimError::EmptyRatePool("prop_rates"))?;
        let &malf_rate = malf_pool
            .choose(rng)
            .ok_or(SimError::EmptyRatePool("malf_rates"))?;
        let state = if malf_init.sample(rng) {
            PcState::Malf
        } else {
            PcState::Prop
        };
        pc_vec.push(Pc::new(state, prop_rate, malf_rate));
    }

    let mut state_fracs = Vec::with_capacity(par.timesteps);
    let mut pc_states = Vec::with_capacity(par.timesteps);
    let mut pc_rates = Vec::with_capacity(par.timesteps);

    for _ in 0..par.timesteps {
        let n_prop = pc_vec
            .iter()
            .filter(|pc| pc.state() == PcState::Prop)
            .count();
        let prop_frac = n_prop as f64 / par.pc_count as f64;
        // The complement keeps the two fractions partitioning to exactly 1.0.
        state_fracs.push([prop_frac, 1.0 - prop_frac]);

        pc_states.push(pc_vec.iter().map(|pc| pc.state() as u8).collect::<Vec<_>>());
        pc_rates.push(pc_vec.iter().map(Pc::emission_rate).collect::<Vec<_>>());

        for pc in &mut pc_vec {
            let draw = rng.random::<f64>();
            match pc.state() {
                PcState::Prop if draw < p => pc.set_state(PcState::Malf),
                PcState::Malf if draw < r => pc.set_state(PcState::Prop),
                _ => {}
            }
        }
    }

    // Conversion factor from scfh to metric tons per day.
    let scfh_to_tons_per_day = 24.0 * par.gas_density;

    let mut avg_rate = Vec::with_capacity(par.timesteps);
    let mut sum_rate = Vec::with_capacity(par.timesteps);
    let mut cum_emission = Vec::with_capacity(par.timesteps);
    let mut running_sum = 0.0;
    for rates in &pc_rates {
        let sum: f64 = rates.iter().sum();
        avg_rate.push(sum / par.pc_count as f64);
        sum_rate.push(sum);
        running_sum += sum;
        cum_emission.push(running_sum * scfh_to_tons_per_day);
    }

    let all_avg_rate = avg_rate.iter().sum::<f64>() / par.timesteps as f64;
    let final_cum_emission = cum_emission.last().copied().unwrap_or(0.0);

    Ok(Trajectory {
        state_fracs,
        pc_states,
        pc_rates,
        avg_rate,
        sum_rate,
        cum_emission,
        all_avg_rate,
        final_cum_emission,
    })
}
