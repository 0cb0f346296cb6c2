use std::{any::type_name, collections::HashSet, fmt::Debug, sync::Arc};

use crate::{
    dependency_graph::DependencyGraph,
    errors::{ContainerError, ErrorKind, Phase},
    factories::{DynFactory, GroupAssembler, GroupSplitter, IntoFactory, Invocable, SuppliedValue},
    options::ContainerOptions,
    provider::{Provider, ProviderId, ProviderNode},
    registry::Registry,
    resolver::{Arguments, Resolver},
    types::{Injectable, Instance},
};

/// Dependency injection container
///
/// Providers are registered with [Container::provide] and [Container::supply].
/// The first request for a value ([Container::invoke], [Container::call])
/// orders all providers by their dependencies and executes each one once.
///
/// ```
/// use std::sync::Arc;
/// use depinject::{Container, ContainerOptions};
///
/// struct Config { url: String }
/// struct Client { url: String }
///
/// fn client(config: Arc<Config>) -> Arc<Client> {
///     Arc::new(Client { url: config.url.clone() })
/// }
///
/// let mut container = Container::new(ContainerOptions::default());
/// container
///     .supply(Config { url: "localhost".into() })?
///     .provide(client)?;
///
/// let client = container.invoke::<Arc<Client>>()?;
/// assert_eq!(client.url, "localhost");
/// # Ok::<(), depinject::ContainerError>(())
/// ```
pub struct Container {
    pub(crate) options: ContainerOptions,
    pub(crate) providers: Vec<Provider>,
    pub(crate) registry: Registry,
    pub(crate) graph: DependencyGraph<ProviderNode>,
    /// Ids of synthetic group providers already registered
    expanded_groups: HashSet<String>,
    /// Execution order of the last build
    pub(crate) sorted: Vec<ProviderId>,
    pub(crate) resolved: bool,
}

/// State restored when a registration fails
struct Checkpoint {
    providers: usize,
    registry: Registry,
    graph: DependencyGraph<ProviderNode>,
    expanded_groups: HashSet<String>,
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("options", &self.options)
            .field("providers", &self.providers)
            .field("resolved", &self.resolved)
            .finish()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(ContainerOptions::default())
    }
}

impl Container {
    pub fn new(options: ContainerOptions) -> Self {
        Container {
            options,
            providers: Vec::new(),
            registry: Registry::new(options.infer_interfaces, options.infer_lists),
            graph: DependencyGraph::new(!options.infer_lists),
            expanded_groups: HashSet::new(),
            sorted: Vec::new(),
            resolved: false,
        }
    }

    pub fn options(&self) -> ContainerOptions {
        self.options
    }

    /// Whether every provider has been executed since the last registration
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Ids of all providers in registration order
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(Provider::id).collect()
    }

    /// Registers a constructor
    ///
    /// The constructor's parameters are its dependencies, its return value
    /// its outputs. Returning `Result` makes the constructor fallible.
    pub fn provide<Marker>(
        &mut self,
        constructor: impl IntoFactory<Marker>,
    ) -> Result<&mut Self, ContainerError> {
        let factory = constructor.into_factory();
        let name = factory.name();
        // Closures of one function share a type name
        let id = if name.contains("{{closure}}") {
            format!("{name}#{}", self.providers.len())
        } else {
            name
        };

        self.register(Phase::Provide, id, factory)?;
        Ok(self)
    }

    /// Registers a constructor under the given id
    pub fn provide_named<Marker>(
        &mut self,
        id: impl Into<String>,
        constructor: impl IntoFactory<Marker>,
    ) -> Result<&mut Self, ContainerError> {
        self.register(Phase::Provide, id.into(), constructor.into_factory())?;
        Ok(self)
    }

    /// Registers an existing value
    pub fn supply<T: Injectable>(&mut self, value: T) -> Result<&mut Self, ContainerError> {
        self.supply_arc(Arc::new(value))
    }

    /// Registers an existing shared value, which may be a trait object
    pub fn supply_arc<T: Injectable + ?Sized>(
        &mut self,
        value: Arc<T>,
    ) -> Result<&mut Self, ContainerError> {
        let factory = SuppliedValue::new(Instance::from_arc(value));
        self.register(Phase::Supply, factory.name(), Box::new(factory))?;
        Ok(self)
    }

    /// Declares that values of `T` can be injected wherever `I` is required
    ///
    /// Only used with interface inference enabled.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use depinject::{Container, ContainerOptions};
    ///
    /// trait Greeter: Send + Sync { fn greet(&self) -> String; }
    /// struct English;
    /// impl Greeter for English { fn greet(&self) -> String { "hello".into() } }
    ///
    /// let mut container = Container::new(ContainerOptions::new().with_interface_inference());
    /// container
    ///     .implements::<English, dyn Greeter>(|english| english as Arc<dyn Greeter>)
    ///     .supply(English)?;
    ///
    /// let greeter = container.invoke::<Arc<dyn Greeter>>()?;
    /// assert_eq!(greeter.greet(), "hello");
    /// # Ok::<(), depinject::ContainerError>(())
    /// ```
    pub fn implements<T, I>(&mut self, cast: fn(Arc<T>) -> Arc<I>) -> &mut Self
    where
        T: Injectable + ?Sized,
        I: Injectable + ?Sized,
    {
        self.registry.declare(cast);
        self.resolved = false;
        self
    }

    /// Resolves the container if needed and returns the requested value
    ///
    /// `R` can be any [Resolver]: `Arc<T>`, `Option<Arc<T>>`, `Vec<Arc<T>>`...
    /// Several values at once are requested through [Container::call].
    pub fn invoke<R: Resolver>(&mut self) -> Result<R, ContainerError> {
        self.ensure_resolved()?;
        self.extract()
    }

    /// Resolves the container if needed and calls `function` with its
    /// dependencies injected
    ///
    /// Returning the parameters, as in `|a: Arc<A>, b: Arc<B>| (a, b)`,
    /// extracts several values in one request. Parameters are assembled in
    /// order and the first one that cannot be satisfied fails the call
    /// before `function` runs.
    pub fn call<Marker, F: Invocable<Marker>>(
        &mut self,
        function: F,
    ) -> Result<F::Output, ContainerError> {
        self.ensure_resolved()?;

        let arguments = F::dependencies()
            .iter()
            .map(|dependency| self.assemble_requested(dependency))
            .collect::<Result<Vec<_>, _>>()?;

        function
            .invoke(Arguments::new(arguments))
            .map_err(|error| self.intercept(ContainerError::new(Phase::Invoke, type_name::<F>(), error)))
    }

    /// Returns a value of an already resolved container
    pub fn get<R: Resolver>(&self) -> Result<R, ContainerError> {
        if !self.resolved {
            return Err(self.intercept(ContainerError::new(
                Phase::Invoke,
                R::dependency_info().type_info.type_name,
                ErrorKind::NotResolved,
            )));
        }
        self.extract()
    }

    /// Renders the registry and the execution order
    pub fn dump(&self) -> String {
        let mut dump = self.registry.dump();
        if self.resolved {
            let order: Vec<&str> = self
                .sorted
                .iter()
                .map(|index| self.providers[index.0].id())
                .collect();
            dump.push_str(&format!("Execution order: [{}]\n", order.join(", ")));
        }
        dump
    }

    /// Logs a failed operation together with the registry contents
    pub(crate) fn intercept(&self, error: ContainerError) -> ContainerError {
        tracing::error!(registry = %self.registry, "{error}");
        error
    }

    fn extract<R: Resolver>(&self) -> Result<R, ContainerError> {
        let dependency = R::dependency_info();
        let argument = self.assemble_requested(&dependency)?;
        R::resolve(argument).map_err(|error| {
            self.intercept(ContainerError::new(
                Phase::Invoke,
                dependency.type_info.type_name,
                error,
            ))
        })
    }

    /// Registers `factory`, undoing every change if it fails
    fn register(
        &mut self,
        phase: Phase,
        id: String,
        factory: Box<dyn DynFactory>,
    ) -> Result<ProviderId, ContainerError> {
        let checkpoint = self.checkpoint();

        match self.try_register(id.clone(), factory) {
            Ok(index) => {
                self.resolved = false;
                Ok(index)
            }
            Err(kind) => {
                self.restore(checkpoint);
                Err(self.intercept(ContainerError::new(phase, id, kind)))
            }
        }
    }

    fn try_register(&mut self, id: String, factory: Box<dyn DynFactory>) -> Result<ProviderId, ErrorKind> {
        let provider = Provider::new(id, factory)?;

        if self.options.use_in_sentinel {
            for dependency in provider.dependencies() {
                if let Some(sentinel) = dependency.sentinel {
                    self.expand(GroupAssembler::new(dependency.type_info, sentinel))?;
                }
            }
        }

        let index = ProviderId(self.providers.len());
        self.registry.register(index, &provider)?;
        self.graph.add_vertex(ProviderNode::new(index, provider.id()))?;

        tracing::debug!(
            "Registered provider '{}' with {} dependencies",
            provider.id(),
            provider.dependencies().len()
        );
        let outputs = provider.outputs().to_vec();
        self.providers.push(provider);

        if self.options.use_out_sentinel {
            for output in outputs {
                if let Some(sentinel) = output.sentinel {
                    self.expand(GroupSplitter::new(output.type_info, sentinel))?;
                }
            }
        }

        Ok(index)
    }

    /// Registers a synthetic group provider once per group
    fn expand(&mut self, factory: impl DynFactory + 'static) -> Result<(), ErrorKind> {
        let id = factory.name();
        if self.expanded_groups.insert(id.clone()) {
            self.try_register(id, Box::new(factory))?;
        }
        Ok(())
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            providers: self.providers.len(),
            registry: self.registry.clone(),
            graph: self.graph.clone(),
            expanded_groups: self.expanded_groups.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.providers.truncate(checkpoint.providers);
        self.registry = checkpoint.registry;
        self.graph = checkpoint.graph;
        self.expanded_groups = checkpoint.expanded_groups;
    }
}
