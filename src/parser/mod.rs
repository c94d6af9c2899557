//! Frame parsing module.
//!
//! Decodes raw captured bytes into the layer view used by the analysis
//! code. Only as much of HTTP and TLS is read as is needed to name a peer.

mod frame_parser;
pub mod http;
pub mod tls;

pub use frame_parser::FrameParser;

#[cfg(test)]
pub(crate) use frame_parser::fixtures;
