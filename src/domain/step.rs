// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution steps and hook points.
//!
//! The default workflow loads one source per [`Step`], in the fixed order of
//! [`Step::ORDER`]. That order is also the precedence order: a key loaded by an
//! earlier step shadows the same key from any later step.

use crate::domain::errors::{ConfigError, Result};
use std::fmt;
use std::str::FromStr;

/// One source of configuration, in precedence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Programmatic overrides, never disabled.
    Overrides,
    /// Command-line arguments.
    Argv,
    /// Environment variables.
    Env,
    /// Configuration files.
    Files,
    /// Programmatic defaults.
    Defaults,
}

impl Step {
    /// All steps in the order they are loaded.
    pub const ORDER: [Step; 5] = [
        Step::Overrides,
        Step::Argv,
        Step::Env,
        Step::Files,
        Step::Defaults,
    ];

    /// Returns the name of the step.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Overrides => "overrides",
            Step::Argv => "argv",
            Step::Env => "env",
            Step::Files => "files",
            Step::Defaults => "defaults",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Step {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Step::ORDER
            .into_iter()
            .find(|step| step.name() == s)
            .ok_or_else(|| ConfigError::invalid_settings(format!("unknown step '{}'", s)))
    }
}

/// A point of the default workflow where a hook may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookPoint {
    /// Before any source is loaded.
    First,
    /// Right after the loader of the given step.
    After(Step),
}

impl HookPoint {
    /// Returns the name of the hook point: `first` or the step name.
    pub fn name(&self) -> &'static str {
        match self {
            HookPoint::First => "first",
            HookPoint::After(step) => step.name(),
        }
    }
}

impl From<Step> for HookPoint {
    fn from(step: Step) -> Self {
        HookPoint::After(step)
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HookPoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "first" {
            Ok(HookPoint::First)
        } else {
            s.parse::<Step>().map(HookPoint::After)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order_is_precedence_order() {
        let names: Vec<_> = Step::ORDER.iter().map(Step::name).collect();
        assert_eq!(names, vec!["overrides", "argv", "env", "files", "defaults"]);
        assert!(Step::Overrides < Step::Defaults);
    }

    #[test]
    fn test_step_from_str() {
        assert_eq!("files".parse::<Step>().unwrap(), Step::Files);
        assert!("first".parse::<Step>().is_err());
    }

    #[test]
    fn test_hook_point_names() {
        assert_eq!(HookPoint::First.to_string(), "first");
        assert_eq!(HookPoint::from(Step::Argv).to_string(), "argv");
        assert_eq!(
            "defaults".parse::<HookPoint>().unwrap(),
            HookPoint::After(Step::Defaults)
        );
        assert!("last".parse::<HookPoint>().is_err());
    }
}
