use crate::context::{Dependency, Resolved};

/// The injection context a component is invoked with.
///
/// `get` returns `None` when the dependency was not collected or failed to
/// resolve; components must treat that as "no value", never as an error.
pub trait Broker: Send + Sync {
    fn get(&self, dependency: &Dependency) -> Option<Resolved>;
}
