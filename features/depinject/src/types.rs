use std::{
    any::{Any, TypeId},
    fmt::Debug,
    sync::Arc,
};

use crate::{errors::InjectError, resolver::Arguments};

/// Errors returned by user constructors
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Anything injectable must be shareable between threads once resolved,
/// so values need to be Send + Sync + 'static.
///
/// Unsized types are allowed so trait objects (`dyn Trait`) can be injected.
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Identity of a registered or requested type
///
/// Compared and hashed by `type_id` alone. The name only labels the type in
/// logs and errors, `std::any::type_name` does not guarantee it is unique.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Whether this describes `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}
impl Eq for TypeInfo {}

impl std::hash::Hash for TypeInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// A value produced by a provider
///
/// The erased value always holds an `Arc<T>`, which lets sized types and
/// trait objects share one representation.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    value: Arc<dyn Any + Send + Sync + 'static>,
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

impl Instance {
    pub fn new<T: Injectable>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Injectable + ?Sized>(value: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            value: Arc::new(value),
        }
    }

    /// Returns the shared value, or the name of the stored type on mismatch
    pub fn downcast<T: Injectable + ?Sized>(&self) -> Result<Arc<T>, &'static str> {
        match self.value.downcast_ref::<Arc<T>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.info.type_name),
        }
    }
}

/// Describes the element type of a list or array dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub element: TypeInfo,
    /// Fixed size of an array, `None` for growable lists
    pub len: Option<usize>,
}

/// Synthesises a group value from its members, see [crate::InGroup]
#[derive(Clone, Copy)]
pub struct InSentinel {
    pub members: fn() -> Vec<DependencyInfo>,
    pub assemble: fn(&mut Arguments) -> Result<Instance, InjectError>,
}
impl Debug for InSentinel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InSentinel").finish_non_exhaustive()
    }
}

/// Splits a group value into its members, see [crate::OutGroup]
#[derive(Clone, Copy)]
pub struct OutSentinel {
    pub members: fn() -> Vec<TypeInfo>,
    pub split: fn(&Instance) -> Result<Vec<Instance>, InjectError>,
}
impl Debug for OutSentinel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutSentinel").finish_non_exhaustive()
    }
}

/// Information about a constructor dependency
#[derive(Debug, Clone)]
pub struct DependencyInfo {
    /// The declared type
    pub type_info: TypeInfo,
    /// Set if the declared type is a list or array of `element`
    pub collection: Option<Collection>,
    /// If zero providers are acceptable
    pub optional: bool,
    /// If this is the trailing variadic parameter
    pub variadic: bool,
    /// Set if the declared type is an input group
    pub sentinel: Option<InSentinel>,
}
impl DependencyInfo {
    /// A plain, required dependency on `T`
    pub fn of<T: Injectable + ?Sized>() -> Self {
        Self::of_type(TypeInfo::of::<T>())
    }

    pub fn of_type(type_info: TypeInfo) -> Self {
        DependencyInfo {
            type_info,
            collection: None,
            optional: false,
            variadic: false,
            sentinel: None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.collection.is_some()
    }

    /// Element type, if this dependency is a list or array
    pub fn element(&self) -> Option<TypeInfo> {
        self.collection.map(|collection| collection.element)
    }

    /// Zero candidates are tolerated for optional and variadic dependencies
    pub fn tolerates_absence(&self) -> bool {
        self.optional || self.variadic
    }
}

/// Information about a constructor output
#[derive(Debug, Clone, Copy)]
pub struct OutputInfo {
    pub type_info: TypeInfo,
    /// Set if the output is an output group
    pub sentinel: Option<OutSentinel>,
}
impl OutputInfo {
    pub fn of<T: Injectable + ?Sized>() -> Self {
        OutputInfo {
            type_info: TypeInfo::of::<T>(),
            sentinel: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    trait Codec: Send + Sync {}
    struct Json;

    #[test]
    fn identity_ignores_the_name() {
        let relabelled = TypeInfo {
            type_name: "json",
            ..TypeInfo::of::<Json>()
        };
        assert_eq!(relabelled, TypeInfo::of::<Json>());

        let set: HashSet<TypeInfo> = [relabelled, TypeInfo::of::<Json>()].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(relabelled.to_string(), "json");
    }

    #[test]
    fn trait_objects_are_described() {
        let info = TypeInfo::of::<dyn Codec>();
        assert!(info.is::<dyn Codec>());
        assert!(!info.is::<Json>());
        assert_ne!(info, TypeInfo::of::<Arc<dyn Codec>>());
    }
}
