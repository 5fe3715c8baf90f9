use crate::ids::ViewerId;

#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    #[error("requirement `{requirement}` failed to evaluate: {reason}")]
    Evaluation { requirement: String, reason: String },
}

/// A requirement checked against one viewer.
pub trait ViewerCondition: Send + Sync {
    fn check(&self, viewer: ViewerId) -> Result<bool, ConditionError>;
}

/// Builds a condition from requirement lines.
pub trait ConditionFactory: Send + Sync {
    fn create(&self, owner: &str, name: &str, lines: &[String]) -> Box<dyn ViewerCondition>;
}

/// Condition with no requirement lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysPass;

impl ViewerCondition for AlwaysPass {
    fn check(&self, _viewer: ViewerId) -> Result<bool, ConditionError> {
        Ok(true)
    }
}

/// Stands in for a condition that could not be built.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverPass;

impl ViewerCondition for NeverPass {
    fn check(&self, _viewer: ViewerId) -> Result<bool, ConditionError> {
        Ok(false)
    }
}
