//! Type directed dependency injection
//!
//! Constructors declare by type what they consume and produce. The
//! [Container] orders them by their dependencies, executes each one once
//! and hands out the produced values.
//!
//! ```
//! use std::sync::Arc;
//! use depinject::{Container, ContainerOptions, Variadic};
//!
//! trait Plugin: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//! struct Metrics;
//! impl Plugin for Metrics {
//!     fn name(&self) -> &'static str { "metrics" }
//! }
//! struct Auth;
//! impl Plugin for Auth {
//!     fn name(&self) -> &'static str { "auth" }
//! }
//!
//! struct Server { plugins: Vec<&'static str> }
//!
//! fn server(plugins: Variadic<dyn Plugin>) -> Arc<Server> {
//!     Arc::new(Server { plugins: plugins.iter().map(|plugin| plugin.name()).collect() })
//! }
//!
//! let mut container = Container::new(ContainerOptions::all());
//! container
//!     .implements::<Metrics, dyn Plugin>(|metrics| metrics as Arc<dyn Plugin>)
//!     .implements::<Auth, dyn Plugin>(|auth| auth as Arc<dyn Plugin>)
//!     .supply(Metrics)?
//!     .supply(Auth)?
//!     .provide(server)?;
//!
//! let server = container.invoke::<Arc<Server>>()?;
//! assert_eq!(server.plugins, vec!["metrics", "auth"]);
//! # Ok::<(), depinject::ContainerError>(())
//! ```

mod capability;
mod container;
mod dependency_graph;
mod errors;
mod factories;
mod initiator;
mod options;
mod provider;
mod registry;
mod resolver;
mod types;

pub use capability::Capabilities;
pub use container::Container;
pub use dependency_graph::{DependencyGraph, GraphError, GraphState, Vertex};
pub use errors::{ConstructError, ContainerError, ErrorKind, InjectError, Phase, RegistryError, ValueError};
pub use factories::{DynFactory, IntoFactory, IntoOutput, IntoOutputs, Invocable};
pub use options::ContainerOptions;
pub use provider::{Provider, ProviderId};
pub use registry::Registry;
pub use resolver::{
    list::Variadic,
    sentinel::{In, InGroup, Out, OutGroup, OutputValue},
    Argument, Arguments, Resolver,
};
pub use types::{
    Collection, DependencyInfo, DynError, InSentinel, Injectable, Instance, OutSentinel, OutputInfo, TypeInfo,
};
