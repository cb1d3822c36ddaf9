//! layerkit: a layered application scaffold.
//!
//! Two halves share one error type and one cancellation primitive:
//!
//! - **Persistence**: an object-safe [`core::Entity`] model with
//!   relation metadata ([`mapping`]), a unit-of-work session with an
//!   optimistic concurrency guard ([`session`]), a recursive
//!   soft-delete cascade ([`cascade`]), and typed repositories with
//!   paging ([`repository`], [`paging`]) over a pluggable
//!   [`storage::EntityStore`].
//! - **Dispatch**: a type-indexed [`mediator`] that composes
//!   per-request behavior pipelines around a single handler, with
//!   ready-made caching, invalidation, logging, authorization and
//!   performance behaviors ([`behaviors`]), event publication, and
//!   streaming requests.
//!
//! # Examples
//!
//! ```
//! use layerkit::prelude::*;
//! use async_trait::async_trait;
//!
//! struct Ping;
//!
//! impl Request for Ping {
//!     type Response = String;
//! }
//!
//! struct PingHandler;
//!
//! #[async_trait]
//! impl RequestHandler<Ping> for PingHandler {
//!     async fn handle(&self, _request: Ping, _ctx: &DispatchContext) -> Result<String> {
//!         Ok("pong".to_string())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let mediator = Mediator::builder().handler::<Ping, _>(PingHandler).build();
//! assert_eq!(mediator.send(Ping).await?, "pong");
//! # Ok(())
//! # }
//! ```

pub mod behaviors;
pub mod cache;
pub mod cancel;
pub mod cascade;
pub mod config;
pub mod core;
pub mod identity;
pub mod mapping;
pub mod mediator;
pub mod paging;
pub mod prelude;
pub mod repository;
pub mod session;
pub mod storage;

pub use cancel::CancelToken;
pub use config::MediatorConfig;
pub use core::{AppError, Result};
pub use mediator::{Mediator, MediatorBuilder};
pub use repository::{DomainEntity, Repository};
pub use session::WorkSession;
