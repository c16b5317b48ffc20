//! Error classification.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Broad error category used by callers to decide how to react.
///
/// Validation failures are split by what was wrong with the input:
/// the argument had the wrong shape entirely ([`ErrorCategory::TypeCondition`]),
/// or it had the right shape but an unusable value
/// ([`ErrorCategory::ValueCondition`]). Everything raised by a collaborator
/// during a build is [`ErrorCategory::Passthrough`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    TypeCondition,
    ValueCondition,
    Passthrough,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    FixInput,
    CheckConfiguration,
    CheckCollaborator,
    CheckToolImplementation,
}
