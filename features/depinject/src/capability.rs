use std::{
    any::TypeId,
    collections::{HashMap, HashSet, VecDeque},
    fmt::Debug,
    sync::Arc,
};

use crate::types::{Injectable, Instance, TypeInfo};

type Cast = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// A declared "`concrete` satisfies `capability`" relation
#[derive(Clone)]
struct Capability {
    capability: TypeInfo,
    cast: Cast,
}

/// Table of declared capabilities
///
/// Rust has no structural typing at runtime, so the types a value may be
/// injected as are declared explicitly, together with the cast which turns
/// `Arc<Concrete>` into `Arc<dyn Trait>`.
/// Satisfaction is transitive: if `A -> B` and `B -> C` are declared, `A` satisfies `C`.
#[derive(Clone, Default)]
pub struct Capabilities {
    by_concrete: HashMap<TypeId, Vec<Capability>>,
}
impl Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for capabilities in self.by_concrete.values() {
            for capability in capabilities {
                list.entry(&capability.capability.type_name);
            }
        }
        list.finish()
    }
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that `T` can be used wherever `I` is required
    ///
    /// Redeclaring the same pair replaces the previous cast.
    pub fn declare<T, I>(&mut self, cast: fn(Arc<T>) -> Arc<I>)
    where
        T: Injectable + ?Sized,
        I: Injectable + ?Sized,
    {
        let capability = TypeInfo::of::<I>();
        let cast: Cast = Arc::new(move |instance: &Instance| {
            instance.downcast::<T>().ok().map(|value| Instance::from_arc(cast(value)))
        });

        let declared = self.by_concrete.entry(TypeId::of::<T>()).or_default();
        declared.retain(|existing| existing.capability != capability);
        declared.push(Capability { capability, cast });

        tracing::debug!(
            "Declared '{}' as an implementation of '{}'",
            std::any::type_name::<T>(),
            capability
        );
    }

    pub fn is_empty(&self) -> bool {
        self.by_concrete.is_empty()
    }

    /// Whether values of `concrete` satisfy `requested`.
    /// A type does not satisfy itself through this table.
    pub fn satisfies(&self, concrete: TypeId, requested: TypeId) -> bool {
        concrete != requested && self.path(concrete, requested).is_some()
    }

    /// Casts `instance` into the `requested` type, following declared capabilities
    pub fn cast(&self, instance: &Instance, requested: TypeInfo) -> Option<Instance> {
        if instance.info.type_id == requested.type_id {
            return Some(instance.clone());
        }

        let path = self.path(instance.info.type_id, requested.type_id)?;
        path.into_iter()
            .try_fold(instance.clone(), |current, capability| (capability.cast)(&current))
    }

    /// Breadth first search for the shortest chain of casts
    fn path(&self, from: TypeId, to: TypeId) -> Option<Vec<&Capability>> {
        let mut previous: HashMap<TypeId, (TypeId, &Capability)> = HashMap::new();
        let mut visited = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = Vec::new();
                let mut step = to;
                while let Some((parent, capability)) = previous.get(&step) {
                    path.push(*capability);
                    step = *parent;
                }
                path.reverse();
                return Some(path);
            }

            for capability in self.by_concrete.get(&current).into_iter().flatten() {
                let next = capability.capability.type_id;
                if visited.insert(next) {
                    previous.insert(next, (current, capability));
                    queue.push_back(next);
                }
            }
        }

        None
    }
}
