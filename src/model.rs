//! Simulation data types.

use serde::{Deserialize, Serialize};

/// Operating state of a pneumatic controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcState {
    /// Properly operating (low bleed).
    Prop = 0,
    /// Malfunctioning (high bleed).
    Malf = 1,
}

/// One pneumatic controller.
///
/// Both emission rates are drawn once per trial and stay fixed for the
/// controller's lifetime within that trial.
#[derive(Debug, Clone, Copy)]
pub struct Pc {
    state: PcState,
    prop_rate: f64,
    malf_rate: f64,
}

impl Pc {
    pub fn new(state: PcState, prop_rate: f64, malf_rate: f64) -> Self {
        Self {
            state,
            prop_rate,
            malf_rate,
        }
    }

    pub fn state(&self) -> PcState {
        self.state
    }

    pub fn set_state(&mut self, state: PcState) {
        self.state = state;
    }

    /// Get the emission rate (scfh) of the controller in its current state.
    pub fn emission_rate(&self) -> f64 {
        match self.state {
            PcState::Prop => self.prop_rate,
            PcState::Malf => self.malf_rate,
        }
    }
}

/// Complete output of a single simulated trial.
///
/// All per-step vectors have one entry per timestep; the per-controller
/// matrices additionally have one column per controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Per-step population fractions: `[properly operating, malfunctioning]`.
    pub state_fracs: Vec<[f64; 2]>,

    /// Per-step per-controller states (0 = properly operating, 1 = malfunctioning).
    pub pc_states: Vec<Vec<u8>>,

    /// Per-step per-controller emission rates (scfh).
    pub pc_rates: Vec<Vec<f64>>,

    /// Per-step emission rate averaged over all controllers (scfh).
    pub avg_rate: Vec<f64>,

    /// Per-step emission rate summed over all controllers (scfh).
    pub sum_rate: Vec<f64>,

    /// Running cumulative emission (metric tons).
    pub cum_emission: Vec<f64>,

    /// Time average of `avg_rate` (scfh).
    pub all_avg_rate: f64,

    /// Last entry of `cum_emission` (metric tons).
    pub final_cum_emission: f64,
}

/// Cross-trial scalar summaries of a Monte Carlo run.
///
/// Parallel arrays with one entry per trial, read-only once the ensemble
/// loop completes.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    /// Sampled days to failure.
    pub dtf: Vec<u32>,

    /// Sampled initial properly operating fraction.
    pub s0: Vec<f64>,

    /// Per-trial time-averaged emission rate per controller (scfh).
    pub avg_rate: Vec<f64>,

    /// Per-trial final cumulative emission (metric tons).
    pub final_cum_emission: Vec<f64>,
}

impl Ensemble {
    pub fn with_capacity(n_trials: usize) -> Self {
        Self {
            dtf: Vec::with_capacity(n_trials),
            s0: Vec::with_capacity(n_trials),
            avg_rate: Vec::with_capacity(n_trials),
            final_cum_emission: Vec::with_capacity(n_trials),
        }
    }

    pub fn push(&mut self, dtf: u32, s0: f64, avg_rate: f64, final_cum_emission: f64) {
        self.dtf.push(dtf);
        self.s0.push(s0);
        self.avg_rate.push(avg_rate);
        self.final_cum_emission.push(final_cum_emission);
    }

    pub fn len(&self) -> usize {
        self.dtf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dtf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emission_rate_follows_state() {
        let mut pc = Pc::new(PcState::Prop, 1.5, 30.0);
        assert_eq!(pc.emission_rate(), 1.5);

        pc.set_state(PcState::Malf);
        assert_eq!(pc.emission_rate(), 30.0);

        pc.set_state(PcState::Prop);
        assert_eq!(pc.emission_rate(), 1.5);
    }

    #[test]
    fn ensemble_arrays_grow_together() {
        let mut ens = Ensemble::with_capacity(2);
        assert!(ens.is_empty());

        ens.push(30, 0.8, 2.1, 14.5);
        ens.push(90, 0.9, 1.7, 9.2);

        assert_eq!(ens.len(), 2);
        assert_eq!(ens.dtf, vec![30, 90]);
        assert_eq!(ens.s0, vec![0.8, 0.9]);
        assert_eq!(ens.avg_rate, vec![2.1, 1.7]);
        assert_eq!(ens.final_cum_emission, vec![14.5, 9.2]);
    }
}
