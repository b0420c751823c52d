//! Validator configuration.
//!
//! All fields have defaults, so a configuration file only needs to name the
//! settings it changes.

/// How a [`crate::ModuleValidator`] reacts to a failing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FailurePolicy {
    /// Stop at the first failing function or global initializer
    #[default]
    FailFast,
    /// Validate every unit and report all failures
    CollectAll,
}

/// Resource limits and reporting policy for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ValidatorConfig {
    /// Maximum operand stack height before `StackOverflow` is reported
    pub max_operand_stack: usize,
    /// Maximum number of nested control frames, the function frame included
    pub max_control_depth: usize,
    /// Module-level failure handling
    pub failure_policy:    FailurePolicy,
}

impl ValidatorConfig {
    /// Default operand stack limit.
    pub const DEFAULT_MAX_OPERAND_STACK: usize = 65536;
    /// Default control nesting limit.
    pub const DEFAULT_MAX_CONTROL_DEPTH: usize = 1024;

    /// Configuration with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_operand_stack: Self::DEFAULT_MAX_OPERAND_STACK,
            max_control_depth: Self::DEFAULT_MAX_CONTROL_DEPTH,
            failure_policy:    FailurePolicy::FailFast,
        }
    }

    /// Set the operand stack limit.
    #[must_use]
    pub const fn with_max_operand_stack(mut self, limit: usize) -> Self {
        self.max_operand_stack = limit;
        self
    }

    /// Set the control nesting limit.
    #[must_use]
    pub const fn with_max_control_depth(mut self, limit: usize) -> Self {
        self.max_control_depth = limit;
        self
    }

    /// Set the module-level failure policy.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
