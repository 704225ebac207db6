//! Feature toggles for optional display branches
//!
//! The statistics view can show an extended block of derived metrics. Whether
//! it does is decided by an external boolean toggle keyed by flag name; the
//! session only sees the [`FeatureToggle`] capability, never the backend.

/// Flag name gating the extended statistics block
pub const EXTENDED_STATS_FLAG: &str = "extended-stats";

/// Boolean capability keyed by a flag name
pub trait FeatureToggle {
    /// Returns true if the named flag is currently enabled
    fn is_enabled(&self, flag: &str) -> bool;
}

/// Any `Fn(&str) -> bool` works as a toggle, which keeps tests simple
impl<F: Fn(&str) -> bool> FeatureToggle for F {
    fn is_enabled(&self, flag: &str) -> bool {
        self(flag)
    }
}

/// Toggle backend answering from the process environment
///
/// A flag named `extended-stats` is looked up as
/// `TRACKER_FEATURE_EXTENDED_STATS`; the values `1`, `true`, and `yes`
/// (case-insensitive) count as enabled, anything else as disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvToggle;

impl EnvToggle {
    fn var_name(flag: &str) -> String {
        format!("TRACKER_FEATURE_{}", flag.replace('-', "_").to_uppercase())
    }
}

impl FeatureToggle for EnvToggle {
    fn is_enabled(&self, flag: &str) -> bool {
        std::env::var(Self::var_name(flag))
            .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false)
    }
}
