//! Depth-guarded GraphQL endpoint
//!
//! Parses each GraphQL request and rejects operations whose field nesting
//! exceeds [`depth::MAX_DEPTH`] before they reach the execution engine.
//!
//! # Features
//!
//! - Query depth limiting with short-circuit on the first over-deep field
//! - Fragment spreads expanded in place so fragments cannot hide nesting
//! - GraphQL error envelopes (`{ data: null, errors: [...] }`) with HTTP 200
//! - Forwarding of accepted requests to an upstream execution engine
//!
//! # Example
//!
//! ```ignore
//! use graphql_depth_guard::{server, GraphQLService, GraphQLServiceConfig, UpstreamExecutor};
//!
//! let config = GraphQLServiceConfig::default();
//! let executor = UpstreamExecutor::new(&config.upstream)?;
//! let service = Arc::new(GraphQLService::new(config.settings, Arc::new(executor)));
//! server::serve(listener, server::router(service), shutdown).await?;
//! ```

pub mod config;
pub mod depth;
pub mod error;
pub mod executor;
pub mod parser;
pub mod server;
pub mod service;

pub use config::GraphQLServiceConfig;
pub use depth::{check_depth, measure_depth, DepthLimitExceeded, MAX_DEPTH};
pub use error::{ErrorType, RequestError, ServiceError};
pub use executor::{Executor, UpstreamExecutor};
pub use service::GraphQLService;
