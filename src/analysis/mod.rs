//! Frame analysis module.
//!
//! Classifies frames by direction and discovers peer names. Both parts
//! are independent of how frames were captured or how results are shown.

mod classifier;
mod resolver;

pub use classifier::{Classification, PacketClassifier};
pub use resolver::{HostnameResolver, NameSource};
