use std::{any::TypeId, fmt::Display, sync::Arc};

use indexmap::IndexMap;

use crate::{
    capability::Capabilities,
    errors::RegistryError,
    provider::{Provider, ProviderId},
    types::{Injectable, TypeInfo},
};

#[derive(Debug, Clone)]
struct Entry {
    info: TypeInfo,
    /// Producers in registration order
    providers: Vec<(ProviderId, String)>,
}

/// Maps every produced type to the providers producing it
#[derive(Debug, Clone)]
pub struct Registry {
    entries: IndexMap<TypeId, Entry>,
    capabilities: Capabilities,
    infer_lists: bool,
    infer_interfaces: bool,
}

impl Registry {
    pub fn new(infer_interfaces: bool, infer_lists: bool) -> Self {
        Registry {
            entries: IndexMap::new(),
            capabilities: Capabilities::new(),
            infer_lists,
            infer_interfaces,
        }
    }

    /// Registers every output of `provider`
    ///
    /// Either all outputs are registered or none is. Without list inference a
    /// type may only have a single producer, and a provider may never list
    /// the same output type twice.
    pub fn register(&mut self, index: ProviderId, provider: &Provider) -> Result<(), RegistryError> {
        let outputs: Vec<TypeInfo> = provider.output_types().collect();

        for (position, output) in outputs.iter().enumerate() {
            // One provider never produces a type twice, the values would overwrite each other
            let repeated = outputs[..position]
                .contains(output)
                .then(|| provider.id().to_string());
            let existing = repeated.or_else(|| {
                self.entries
                    .get(&output.type_id)
                    .and_then(|entry| entry.providers.first())
                    .map(|(_, id)| id.clone())
                    .filter(|_| !self.infer_lists)
            });

            if let Some(existing) = existing {
                return Err(RegistryError::DuplicateProvider {
                    type_info: *output,
                    existing,
                });
            }
        }

        for output in outputs {
            let entry = self.entries.entry(output.type_id).or_insert_with(|| Entry {
                info: output,
                providers: Vec::new(),
            });
            if !entry.providers.iter().any(|(registered, _)| *registered == index) {
                entry.providers.push((index, provider.id().to_string()));
            }
            tracing::debug!("Registered '{}' as a producer of '{}'", provider.id(), output);
        }

        Ok(())
    }

    /// Providers able to produce `requested`
    ///
    /// Candidates are ordered: producers of the exact type, producers of the
    /// exact `element` type (list inference), producers satisfying the type
    /// (interface inference), producers satisfying the element type.
    /// Each group keeps registration order, a provider is listed once.
    pub fn lookup(
        &self,
        requested: TypeInfo,
        element: Option<TypeInfo>,
        optional: bool,
    ) -> Result<Vec<ProviderId>, RegistryError> {
        let element = element.filter(|_| self.infer_lists);

        let mut found: Vec<ProviderId> = Vec::new();
        let mut add = |providers: &[(ProviderId, String)]| {
            for (index, _) in providers {
                if !found.contains(index) {
                    found.push(*index);
                }
            }
        };

        let exact = |wanted: TypeInfo| self.entries.get(&wanted.type_id);
        if let Some(entry) = exact(requested) {
            add(&entry.providers);
        }
        if let Some(entry) = element.and_then(exact) {
            add(&entry.providers);
        }

        if self.infer_interfaces {
            for wanted in std::iter::once(requested).chain(element) {
                for entry in self.entries.values() {
                    if self.capabilities.satisfies(entry.info.type_id, wanted.type_id) {
                        add(&entry.providers);
                    }
                }
            }
        }

        if found.is_empty() && !optional {
            return Err(RegistryError::NoProviders(requested));
        }
        Ok(found)
    }

    /// Declares `T` as satisfying `I`, see [Capabilities::declare]
    pub fn declare<T, I>(&mut self, cast: fn(Arc<T>) -> Arc<I>)
    where
        T: Injectable + ?Sized,
        I: Injectable + ?Sized,
    {
        self.capabilities.declare(cast);
    }

    /// Declared capabilities, if interface inference is enabled
    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.infer_interfaces.then_some(&self.capabilities)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders every registered type with its producers
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl Display for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Registry ({} types):", self.entries.len())?;
        for entry in self.entries.values() {
            let providers: Vec<&str> = entry.providers.iter().map(|(_, id)| id.as_str()).collect();
            writeln!(f, "  {} <- [{}]", entry.info, providers.join(", "))?;
        }
        Ok(())
    }
}
