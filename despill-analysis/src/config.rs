//! Analysis configuration

/// Dataflow analysis configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Emit a trace event per analysed instruction
    pub trace: bool,

    /// Replace the destination of an opaque `op` instruction with `{unknown}`
    ///
    /// When disabled, opaque operations only take part in occupancy checks
    /// and leave every register's value set untouched.
    pub clobber_opaque_defs: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trace: false,
            clobber_opaque_defs: false,
        }
    }
}

impl AnalysisConfig {
    /// Default configuration with per-instruction tracing enabled
    pub fn traced() -> Self {
        Self {
            trace: true,
            ..Self::default()
        }
    }
}
