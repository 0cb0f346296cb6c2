use std::{any::TypeId, fmt::Debug};

use indexmap::IndexMap;

use crate::{
    capability::Capabilities,
    dependency_graph::Vertex,
    errors::{ConstructError, ErrorKind, ValueError},
    factories::DynFactory,
    resolver::{Argument, Arguments},
    types::{DependencyInfo, Instance, OutputInfo, TypeInfo},
};

/// Index of a provider within its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(pub(crate) usize);

/// A registered constructor together with the values it produced
pub struct Provider {
    id: String,
    factory: Box<dyn DynFactory>,
    dependencies: Vec<DependencyInfo>,
    outputs: Vec<OutputInfo>,
    /// Values of the last execution, keyed by their own type
    values: IndexMap<TypeId, Instance>,
    executed: bool,
}
impl Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id)
            .field(
                "dependencies",
                &self
                    .dependencies
                    .iter()
                    .map(|dependency| dependency.type_info.type_name)
                    .collect::<Vec<_>>(),
            )
            .field(
                "outputs",
                &self.output_types().map(|info| info.type_name).collect::<Vec<_>>(),
            )
            .field("executed", &self.executed)
            .finish()
    }
}

impl Provider {
    /// Wraps a factory
    ///
    /// Fails if a variadic dependency is not the last one.
    pub fn new(id: String, factory: Box<dyn DynFactory>) -> Result<Self, ErrorKind> {
        let dependencies = factory.dependencies();
        let last = dependencies.len().saturating_sub(1);
        if let Some(dependency) = dependencies
            .iter()
            .enumerate()
            .find(|(position, dependency)| dependency.variadic && *position != last)
            .map(|(_, dependency)| dependency)
        {
            return Err(ErrorKind::VariadicNotLast {
                dependency: dependency.element().unwrap_or(dependency.type_info),
            });
        }

        let outputs = factory.outputs();
        Ok(Provider {
            id,
            factory,
            dependencies,
            outputs,
            values: IndexMap::new(),
            executed: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dependencies(&self) -> &[DependencyInfo] {
        &self.dependencies
    }

    pub fn outputs(&self) -> &[OutputInfo] {
        &self.outputs
    }

    pub fn output_types(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.outputs.iter().map(|output| output.type_info)
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Runs the constructor, replacing previously produced values
    pub fn execute(&mut self, arguments: Vec<Argument>) -> Result<(), ConstructError> {
        let instances = self.factory.construct(Arguments::new(arguments))?;

        self.values.clear();
        for instance in instances {
            self.values.insert(instance.info.type_id, instance);
        }
        self.executed = true;

        tracing::debug!("Executed '{}' producing {} values", self.id, self.values.len());
        Ok(())
    }

    /// The produced value for `requested`
    ///
    /// Prefers an exact match. With capabilities given, falls back to the
    /// single produced value satisfying `requested`.
    pub fn value_of(
        &self,
        requested: TypeInfo,
        capabilities: Option<&Capabilities>,
    ) -> Result<Instance, ValueError> {
        if let Some(instance) = self.values.get(&requested.type_id) {
            return Ok(instance.clone());
        }

        let not_found = || ValueError::NotFound {
            requested,
            provider: self.id.clone(),
        };
        let Some(capabilities) = capabilities else {
            return Err(not_found());
        };

        let matching: Vec<&Instance> = self
            .values
            .values()
            .filter(|instance| capabilities.satisfies(instance.info.type_id, requested.type_id))
            .collect();

        match matching.as_slice() {
            [] => Err(not_found()),
            [instance] => capabilities.cast(instance, requested).ok_or_else(not_found),
            candidates => Err(ValueError::AmbiguousImplementation {
                requested,
                provider: self.id.clone(),
                candidates: candidates
                    .iter()
                    .map(|instance| instance.info.type_name)
                    .collect(),
            }),
        }
    }
}

/// Graph vertex referencing a provider by index
///
/// Keyed by index and id, so providers sharing an id keep separate vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderNode {
    pub index: ProviderId,
    key: String,
}
impl ProviderNode {
    pub fn new(index: ProviderId, id: &str) -> Self {
        ProviderNode {
            index,
            key: format!("{id}@{}", index.0),
        }
    }
}
impl Vertex for ProviderNode {
    fn id(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{factories::IntoFactory, resolver::list::Variadic};

    trait Engine: Send + Sync {
        fn power(&self) -> u32;
    }
    struct Diesel;
    impl Engine for Diesel {
        fn power(&self) -> u32 {
            90
        }
    }
    struct Electric;
    impl Engine for Electric {
        fn power(&self) -> u32 {
            150
        }
    }
    struct Wheels(u8);

    fn provider<Marker>(callable: impl IntoFactory<Marker>) -> Provider {
        Provider::new("test".to_string(), callable.into_factory()).unwrap()
    }

    fn engines() -> Capabilities {
        let mut capabilities = Capabilities::new();
        capabilities.declare::<Diesel, dyn Engine>(|diesel| diesel as Arc<dyn Engine>);
        capabilities.declare::<Electric, dyn Engine>(|electric| electric as Arc<dyn Engine>);
        capabilities
    }

    #[test]
    fn variadic_must_be_last() {
        let factory = (|_: Variadic<Wheels>, _: Arc<Diesel>| {}).into_factory();
        let error = Provider::new("car".to_string(), factory).unwrap_err();
        assert!(matches!(
            error,
            ErrorKind::VariadicNotLast { dependency } if dependency == TypeInfo::of::<Wheels>()
        ));

        let factory = (|_: Arc<Diesel>, _: Variadic<Wheels>| {}).into_factory();
        assert!(Provider::new("car".to_string(), factory).is_ok());
    }

    #[test]
    fn values_are_keyed_by_type() {
        let mut provider = provider(|| (Arc::new(Diesel), Arc::new(Wheels(4))));
        assert!(!provider.is_executed());
        provider.execute(vec![]).unwrap();
        assert!(provider.is_executed());

        let wheels = provider.value_of(TypeInfo::of::<Wheels>(), None).unwrap();
        assert_eq!(wheels.downcast::<Wheels>().unwrap().0, 4);
        assert!(matches!(
            provider.value_of(TypeInfo::of::<Electric>(), None),
            Err(ValueError::NotFound { .. })
        ));
    }

    #[test]
    fn value_satisfying_a_capability_is_cast() {
        let mut provider = provider(|| Arc::new(Electric));
        provider.execute(vec![]).unwrap();

        let requested = TypeInfo::of::<dyn Engine>();
        assert!(provider.value_of(requested, None).is_err());

        let engine = provider.value_of(requested, Some(&engines())).unwrap();
        assert_eq!(engine.downcast::<dyn Engine>().unwrap().power(), 150);
    }

    #[test]
    fn multiple_implementations_are_ambiguous() {
        let mut provider = provider(|| (Arc::new(Diesel), Arc::new(Electric)));
        provider.execute(vec![]).unwrap();

        let error = provider
            .value_of(TypeInfo::of::<dyn Engine>(), Some(&engines()))
            .unwrap_err();
        assert!(matches!(
            error,
            ValueError::AmbiguousImplementation { candidates, .. } if candidates.len() == 2
        ));
    }
}
