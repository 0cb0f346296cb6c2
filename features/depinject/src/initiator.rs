//! Building and resolving a [Container]
//!
//! Build derives the graph edges from the declared dependencies and orders
//! the providers. Resolve executes them in that order, feeding each one the
//! values of its dependencies.

use crate::{
    container::Container,
    dependency_graph::Vertex,
    errors::{ConstructError, ContainerError, ErrorKind, Phase},
    provider::{ProviderId, ProviderNode},
    resolver::{Argument, Arguments},
    types::{DependencyInfo, Instance, TypeInfo},
};

impl Container {
    /// Builds and resolves the container, unless nothing changed since the last time
    pub(crate) fn ensure_resolved(&mut self) -> Result<(), ContainerError> {
        if self.resolved {
            return Ok(());
        }

        self.build()?;
        self.resolve()?;
        self.resolved = true;
        Ok(())
    }

    /// Adds an edge from every candidate to each dependent and sorts the graph
    pub(crate) fn build(&mut self) -> Result<(), ContainerError> {
        self.graph.clear_edges();

        let mut edges: Vec<(ProviderNode, ProviderNode)> = Vec::new();
        for dependent in self.graph.vertices() {
            let provider = &self.providers[dependent.index.0];
            for dependency in provider.dependencies() {
                let candidates = self
                    .candidates_for(Some(dependent.index), dependency)
                    .map_err(|kind| self.intercept(ContainerError::new(Phase::Build, provider.id(), kind)))?;

                edges.extend(
                    candidates
                        .into_iter()
                        .map(|candidate| (self.node(candidate), dependent.clone())),
                );
            }
        }

        for (from, to) in edges {
            tracing::debug!("Adding edge '{}' -> '{}'", from.id(), to.id());
            if let Err(error) = self.graph.add_edge(&from, &to) {
                let subject = self.providers[to.index.0].id().to_string();
                return Err(self.intercept(ContainerError::new(Phase::Build, subject, error)));
            }
        }

        match self.graph.topological_sort() {
            Ok(sorted) => {
                self.sorted = sorted.into_iter().map(|node| node.index).collect();
                tracing::debug!("Execution order: {:?}", self.sorted);
                Ok(())
            }
            Err(error) => Err(self.intercept(ContainerError::new(Phase::Build, "graph", error))),
        }
    }

    /// Executes every provider in build order
    ///
    /// The first failing provider aborts the pass.
    pub(crate) fn resolve(&mut self) -> Result<(), ContainerError> {
        tracing::debug!("Resolving {} providers", self.sorted.len());

        for index in self.sorted.clone() {
            let dependencies = self.providers[index.0].dependencies().to_vec();
            let arguments = dependencies
                .iter()
                .map(|dependency| self.assemble(Some(index), dependency))
                .collect::<Result<Vec<_>, _>>();

            let result = arguments.and_then(|arguments| {
                self.providers[index.0]
                    .execute(arguments)
                    .map_err(|error| self.construct_error(index, error))
            });

            if let Err(kind) = result {
                let id = self.providers[index.0].id().to_string();
                return Err(self.intercept(ContainerError::new(Phase::Resolve, id, kind)));
            }
        }

        Ok(())
    }

    /// Assembles the argument for a value requested from outside the graph
    pub(crate) fn assemble_requested(&self, dependency: &DependencyInfo) -> Result<Argument, ContainerError> {
        let sentinel = dependency.sentinel.filter(|_| self.options.use_in_sentinel);

        let argument = match sentinel {
            // Groups are assembled from their members directly
            Some(sentinel) => (sentinel.members)()
                .iter()
                .map(|member| self.assemble(None, member))
                .collect::<Result<Vec<_>, _>>()
                .and_then(|members| {
                    (sentinel.assemble)(&mut Arguments::new(members))
                        .map(Argument::Single)
                        .map_err(ErrorKind::from)
                }),
            None => self.assemble(None, dependency),
        };

        argument.map_err(|kind| {
            self.intercept(ContainerError::new(
                Phase::Invoke,
                dependency.type_info.type_name,
                kind,
            ))
        })
    }

    /// Providers whose outputs satisfy `dependency`
    ///
    /// `dependent` is excluded, it is `None` for values requested from outside.
    fn candidates_for(
        &self,
        dependent: Option<ProviderId>,
        dependency: &DependencyInfo,
    ) -> Result<Vec<ProviderId>, ErrorKind> {
        let mut candidates = self
            .registry
            .lookup(dependency.type_info, dependency.element(), true)?;
        candidates.retain(|candidate| Some(*candidate) != dependent);

        let required_by = || dependent.map(|index| self.providers[index.0].id().to_string());

        match candidates.len() {
            0 if dependency.tolerates_absence() => Ok(candidates),
            0 => Err(match required_by() {
                Some(required_by) => ErrorKind::MissingDependency {
                    dependency: dependency.type_info,
                    required_by,
                },
                None => ErrorKind::MissingOutput(dependency.type_info),
            }),
            1 => Ok(candidates),
            _ if self.aggregates(dependency) => Ok(candidates),
            _ => Err(ErrorKind::AmbiguousDependency {
                dependency: dependency.type_info,
                required_by: required_by().unwrap_or_else(|| "invoke".to_string()),
                candidates: candidates
                    .iter()
                    .map(|candidate| self.providers[candidate.0].id().to_string())
                    .collect(),
            }),
        }
    }

    /// Collects the values of every candidate into one argument
    fn assemble(&self, dependent: Option<ProviderId>, dependency: &DependencyInfo) -> Result<Argument, ErrorKind> {
        let candidates = self.candidates_for(dependent, dependency)?;

        if self.aggregates(dependency) {
            if candidates.is_empty() {
                return Ok(Argument::Absent);
            }
            let element = dependency.element().unwrap_or(dependency.type_info);
            let values = candidates
                .into_iter()
                .map(|candidate| {
                    // Producers of the whole collection come first, then single elements
                    self.value_of(candidate, dependency.type_info)
                        .or_else(|_| self.value_of(candidate, element))
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Argument::List(values));
        }

        match candidates.as_slice() {
            [] => Ok(Argument::Absent),
            [candidate] => Ok(Argument::Single(self.value_of(*candidate, dependency.type_info)?)),
            many => Err(ErrorKind::AmbiguousDependency {
                dependency: dependency.type_info,
                required_by: dependent
                    .map(|index| self.providers[index.0].id().to_string())
                    .unwrap_or_else(|| "invoke".to_string()),
                candidates: many
                    .iter()
                    .map(|candidate| self.providers[candidate.0].id().to_string())
                    .collect(),
            }),
        }
    }

    fn value_of(&self, candidate: ProviderId, requested: TypeInfo) -> Result<Instance, ErrorKind> {
        self.providers[candidate.0]
            .value_of(requested, self.registry.capabilities())
            .map_err(ErrorKind::from)
    }

    /// Whether many producers are collected into one list argument
    fn aggregates(&self, dependency: &DependencyInfo) -> bool {
        self.options.infer_lists && dependency.is_list()
    }

    fn node(&self, index: ProviderId) -> ProviderNode {
        ProviderNode::new(index, self.providers[index.0].id())
    }

    fn construct_error(&self, index: ProviderId, error: ConstructError) -> ErrorKind {
        match error {
            ConstructError::Inject(error) => ErrorKind::Inject(error),
            ConstructError::Failed(error) => ErrorKind::ProviderFailed {
                provider: self.providers[index.0].id().to_string(),
                error,
            },
        }
    }
}
