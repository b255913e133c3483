//! Stage markers
//!
//! No-op passes that other passes name in their ordering constraints.

use crate::pipeline::MiddleReplacement;

/// Start of the pre-middle stage
#[derive(Debug, Clone, Copy, Default)]
pub struct PreMiddleStart;

impl PreMiddleStart {
    /// Pass name
    pub const NAME: &'static str = "PreMiddleStart";
}

impl MiddleReplacement for PreMiddleStart {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Start of the middle stage proper
#[derive(Debug, Clone, Copy, Default)]
pub struct MiddleStart;

impl MiddleStart {
    /// Pass name
    pub const NAME: &'static str = "MiddleStart";
}

impl MiddleReplacement for MiddleStart {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run_after(&self) -> Vec<&'static str> {
        vec![PreMiddleStart::NAME]
    }
}

/// End of the middle stage
#[derive(Debug, Clone, Copy, Default)]
pub struct MiddleFinish;

impl MiddleFinish {
    /// Pass name
    pub const NAME: &'static str = "MiddleFinish";
}

impl MiddleReplacement for MiddleFinish {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run_after(&self) -> Vec<&'static str> {
        vec![MiddleStart::NAME]
    }
}
