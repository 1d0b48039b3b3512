use async_trait::async_trait;

use crate::context::{Dependency, Requirement, RuleOutcome};
use crate::traits::Broker;

/// A unit the injection engine can resolve requirements for and invoke.
#[async_trait]
pub trait Component: Send + Sync {
    /// Fully qualified name, unique per registry.
    fn name(&self) -> &str;

    fn requires(&self) -> &[Requirement];

    fn optional(&self) -> &[Dependency];

    async fn invoke(&self, broker: &dyn Broker) -> RuleOutcome;
}
