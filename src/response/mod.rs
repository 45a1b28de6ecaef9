//! Response construction - JSON envelopes and binary payloads

pub mod envelope;

pub use envelope::{binary, success, FeatureReply};
