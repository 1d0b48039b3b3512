pub mod broker;
pub mod component;

pub use broker::Broker;
pub use component::Component;
