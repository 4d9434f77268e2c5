//! Structured progress logging for explanations.
//!
//! The explainer reports through its own small logger rather than a global
//! logging facade; callers pick a [`Verbosity`] in the config and the
//! logger stays silent by default.

/// How much progress output an explanation emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No output (default).
    #[default]
    Silent,
    /// One-line summaries: sampling plan, realized coalition counts.
    Info,
    /// Per-subset-size detail.
    Debug,
}

/// Logger for one explanation.
pub struct ExplainLogger {
    verbosity: Verbosity,
}

impl ExplainLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Log the sampling plan before coalition generation.
    pub fn log_plan(&self, n_features: usize, budget: usize) {
        if self.verbosity >= Verbosity::Info {
            println!(
                "[kernelshap] sampling plan: d = {}, coalition budget = {}",
                n_features, budget
            );
        }
    }

    /// Log one fully enumerated subset-size pair.
    pub fn log_enumerated_size(&self, size: usize, complement: usize, n_masks: u64) {
        if self.verbosity >= Verbosity::Debug {
            if size == complement {
                println!(
                    "[kernelshap] enumerated size {}: {} masks",
                    size, n_masks
                );
            } else {
                println!(
                    "[kernelshap] enumerated sizes {}/{}: {} masks",
                    size, complement, n_masks
                );
            }
        }
    }

    /// Log the realized coalition counts after generation.
    pub fn log_coalitions(&self, n_enumerated: usize, n_sampled: usize, exact: bool) {
        if self.verbosity >= Verbosity::Info {
            println!(
                "[kernelshap] coalitions: {} enumerated, {} sampled{}",
                n_enumerated,
                n_sampled,
                if exact { " (exact)" } else { "" }
            );
        }
    }

    /// Log the regression solve.
    pub fn log_solve(&self, n_masks: usize, n_outputs: usize) {
        if self.verbosity >= Verbosity::Debug {
            println!(
                "[kernelshap] solving weighted regression: {} coalitions, {} outputs",
                n_masks, n_outputs
            );
        }
    }
}
