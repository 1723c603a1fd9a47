//! Soft checks and hard assertions
//!
//! A [`SoftCheck`] is logged and counted but never stops a scenario. A hard
//! assertion ([`ensure`]) returns [`E2eError::AssertionFailed`], which
//! propagates out of the scenario to the runner.

use crate::error::{E2eError, E2eResult};
use crate::report::{log_fail, log_pass};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftCheck {
    pub passed: bool,
    pub message: String,
}

impl SoftCheck {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Pick the pass or fail message according to `condition`
    pub fn from_condition(
        condition: bool,
        pass_message: impl Into<String>,
        fail_message: impl Into<String>,
    ) -> Self {
        if condition {
            Self::pass(pass_message)
        } else {
            Self::fail(fail_message)
        }
    }

    pub fn log(&self) {
        if self.passed {
            log_pass(&self.message);
        } else {
            log_fail(&self.message);
        }
    }
}

/// Hard assertion
pub fn ensure(condition: bool, message: impl Into<String>) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(message.into()))
    }
}
