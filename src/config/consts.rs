use std::time::Duration;

/// Namespace header dependency tokens resolve against
pub const DEFAULT_DEPENDENCY_NAMESPACE: &str = "specs";
/// Attribute a script component is exported under when no `name` header is given
pub const DEFAULT_COMPONENT_ATTRIBUTE: &str = "report";
/// Discriminator key injected into every completed script result
pub const RULE_TYPE_KEY: &str = "type";
/// Discriminator value marking a completed rule evaluation
pub const RULE_TYPE: &str = "rule";
/// Joins the paths of a multi-valued dependency
pub const PATH_LIST_DELIMITER: &str = ";";
/// Package prefix used when none is configured
pub const DEFAULT_SCRIPT_PACKAGE: &str = "scripts";
/// Bounded wait of a stream node on its input queue
pub const STREAM_POLL_INTERVAL: Duration = Duration::from_secs(2);
