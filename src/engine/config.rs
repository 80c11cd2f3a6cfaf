//! Validator configuration

/// PDF/A flavour the validator checks against.
///
/// `NoFlavour` runs the generic rule set without pinning a conformance
/// level, which is what the stress harness uses by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavour {
    #[default]
    NoFlavour,
    Pdfa1A,
    Pdfa1B,
    Pdfa2B,
    Pdfa2U,
    Pdfa3B,
}

impl Flavour {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavour::NoFlavour => "none",
            Flavour::Pdfa1A => "1a",
            Flavour::Pdfa1B => "1b",
            Flavour::Pdfa2B => "2b",
            Flavour::Pdfa2U => "2u",
            Flavour::Pdfa3B => "3b",
        }
    }
}

/// Configuration accepted by [`PdfaValidator`](super::pdfa::PdfaValidator).
///
/// Opaque to the harness itself; the dispatcher builds one with defaults
/// and hands the engine to the workers as-is.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub flavour: Flavour,
    /// Print per-file diagnostics to stderr while validating.
    pub verbose: bool,
    /// Cap on sink records written per rule; failures beyond the cap are
    /// still counted against compliance.
    pub max_fails_per_rule: usize,
    /// Also write records for checks that passed.
    pub log_passed: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            flavour: Flavour::NoFlavour,
            verbose: false,
            max_fails_per_rule: 10,
            log_passed: true,
        }
    }
}
