//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before start):
//!     get/post/put/del(pattern, handler)
//!     → matcher.rs (parse restify-style pattern)
//!     → router.rs (insert or replace in route table)
//!
//! Bulk registration:
//!     RouteDescriptor[] / RouteSpec[] + HandlerRegistry
//!     → descriptor.rs (skip unusable entries)
//!     → verb registration above
//!
//! Dispatch (per request):
//!     method + path
//!     → router.rs (most specific pattern wins)
//!     → Found(handler, params) | MethodNotAllowed | NotFound
//! ```
//!
//! # Design Decisions
//! - Route table is frozen behind an `Arc` once the server is built
//! - Duplicate (verb, pattern) registration replaces the handler in place
//! - Static segments beat parameters, parameters beat splats

pub mod descriptor;
pub mod matcher;
pub mod method;
pub mod router;

pub use descriptor::{HandlerRegistry, RouteDescriptor, RouteSpec};
pub use matcher::{PathParams, PathPattern};
pub use method::{InputSource, Verb};
pub use router::{Lookup, RouteTable};
