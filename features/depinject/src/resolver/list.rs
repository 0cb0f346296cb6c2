use std::{any::type_name, ops::Deref, sync::Arc};

use crate::{
    errors::InjectError,
    resolver::{arc::downcast, Argument, Resolver},
    types::{Collection, DependencyInfo, Injectable, Instance, TypeInfo},
};

/// Collects the elements of a list argument
///
/// Each instance is either a single element, or a whole collection of type
/// `Whole` produced by one provider, which is flattened in place.
fn elements<T, Whole>(instances: Vec<Instance>) -> Result<Vec<Arc<T>>, InjectError>
where
    T: Injectable + ?Sized,
    Whole: Injectable + Clone + IntoIterator<Item = Arc<T>>,
{
    let mut elements = Vec::with_capacity(instances.len());
    for instance in instances {
        if let Ok(element) = instance.downcast::<T>() {
            elements.push(element);
            continue;
        }
        let whole = downcast::<Whole>(&instance)?;
        elements.extend(Whole::clone(&whole));
    }
    Ok(elements)
}

fn collect<T, Whole>(argument: Argument) -> Result<Vec<Arc<T>>, InjectError>
where
    T: Injectable + ?Sized,
    Whole: Injectable + Clone + IntoIterator<Item = Arc<T>>,
{
    match argument {
        Argument::Single(instance) => elements::<T, Whole>(vec![instance]),
        Argument::List(instances) => elements::<T, Whole>(instances),
        Argument::Absent => Ok(Vec::new()),
    }
}

/// A list of every provided `T`
///
/// With list inference enabled, every producer of `T` contributes, in
/// registration order. Otherwise a provider of `Vec<Arc<T>>` is required.
impl<T: Injectable + ?Sized> Resolver for Vec<Arc<T>> {
    fn dependency_info() -> DependencyInfo {
        DependencyInfo {
            collection: Some(Collection {
                element: TypeInfo::of::<T>(),
                len: None,
            }),
            ..DependencyInfo::of::<Vec<Arc<T>>>()
        }
    }

    fn resolve(argument: Argument) -> Result<Self, InjectError> {
        collect::<T, Vec<Arc<T>>>(argument)
    }
}

/// A fixed number of provided `T`
///
/// The number of collected values must match `N` exactly.
impl<T: Injectable + ?Sized, const N: usize> Resolver for [Arc<T>; N] {
    fn dependency_info() -> DependencyInfo {
        DependencyInfo {
            collection: Some(Collection {
                element: TypeInfo::of::<T>(),
                len: Some(N),
            }),
            ..DependencyInfo::of::<[Arc<T>; N]>()
        }
    }

    fn resolve(argument: Argument) -> Result<Self, InjectError> {
        let elements = collect::<T, [Arc<T>; N]>(argument)?;
        <[Arc<T>; N]>::try_from(elements).map_err(|elements| InjectError::ArraySizeMismatch {
            type_name: type_name::<Self>(),
            expected: N,
            actual: elements.len(),
        })
    }
}

/// Trailing variadic parameter
///
/// Behaves like `Vec<Arc<T>>`, but resolves to an empty list when nothing
/// provides `T`. Must be the last parameter of a constructor.
pub struct Variadic<T: ?Sized>(pub Vec<Arc<T>>);

impl<T: ?Sized> Deref for Variadic<T> {
    type Target = Vec<Arc<T>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<T: ?Sized> Variadic<T> {
    pub fn into_inner(self) -> Vec<Arc<T>> {
        self.0
    }
}

impl<T: Injectable + ?Sized> Resolver for Variadic<T> {
    fn dependency_info() -> DependencyInfo {
        DependencyInfo {
            variadic: true,
            ..<Vec<Arc<T>> as Resolver>::dependency_info()
        }
    }

    fn resolve(argument: Argument) -> Result<Self, InjectError> {
        collect::<T, Vec<Arc<T>>>(argument).map(Variadic)
    }
}
