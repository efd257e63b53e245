//! # REST API Module
//!
//! Translates REST-style CRUD requests into [`Store`](crate::store::Store)
//! calls and store results into HTTP responses.

pub mod context;
pub mod errors;
pub mod format;
pub mod handler;
pub mod key;
pub mod parser;
pub mod response;
pub mod server;

pub use context::RequestContext;
pub use errors::{RestError, RestResult};
pub use format::OutputFormat;
pub use handler::{RequestTranslator, WriteMode};
pub use key::{coerce_key, resolve_key};
pub use parser::{classify, ClassifiedParams, ParamClass, ReservedParam};
pub use response::{ResponseDescriptor, TOTAL_HEADER};
pub use server::store_routes;
