//! storegate - REST request translator for keyed stores
//!
//! Turns REST-style CRUD requests (query parameters, path identifiers, body
//! entities) into calls against an asynchronous [`store::Store`], and store
//! results back into HTTP responses.

pub mod cli;
pub mod http_server;
pub mod rest_api;
pub mod store;
