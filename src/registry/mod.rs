//! Route registry - descriptor contract, input extraction, and dispatch
//!
//! Every feature exports one `RouteDescriptor` bundling its metadata,
//! declared parameters, and a single handler. The registry collects the
//! descriptors and the dispatcher turns them into the HTTP surface,
//! registering each feature under GET (query input) and POST (body input).

pub mod descriptor;
pub mod dispatch;
pub mod input;

pub use descriptor::{
    handler_fn, FeatureHandler, Method, ParamSchema, ParamSpec, RouteDescriptor, RouteRegistry,
};
pub use dispatch::build_router;
pub use input::FeatureInput;
