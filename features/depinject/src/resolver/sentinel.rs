//! Input and output groups
//!
//! A group is a struct standing in for several individually typed values.
//! An input group bundles dependencies: `fn new(deps: In<Deps>)`.
//! An output group bundles outputs: `fn new() -> Out<Services>`.
//!
//! With sentinel expansion enabled the container wires the members on its
//! own, see [crate::ContainerOptions].

use std::{ops::Deref, sync::Arc};

use crate::{
    errors::InjectError,
    resolver::{arc::downcast, Argument, Arguments, Resolver},
    types::{DependencyInfo, InSentinel, Injectable, Instance, OutSentinel, TypeInfo},
};

/// A struct whose fields are dependencies, usually declared with [crate::in_group]
pub trait InGroup: Injectable + Sized {
    /// Dependencies of every member, in declaration order
    fn members() -> Vec<DependencyInfo>;

    /// Builds the group from arguments matching [InGroup::members]
    fn assemble(arguments: &mut Arguments) -> Result<Self, InjectError>;
}

/// A struct whose fields are outputs, usually declared with [crate::out_group]
pub trait OutGroup: Injectable + Sized {
    /// Types of every member, in declaration order
    fn members() -> Vec<TypeInfo>;

    /// The values of every member
    fn split(&self) -> Vec<Instance>;
}

/// A field type which can be an output group member
pub trait OutputValue {
    fn type_info() -> TypeInfo;

    fn to_instance(&self) -> Instance;
}
impl<T: Injectable + ?Sized> OutputValue for Arc<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn to_instance(&self) -> Instance {
        Instance::from_arc(self.clone())
    }
}

fn assemble_group<G: InGroup>(arguments: &mut Arguments) -> Result<Instance, InjectError> {
    G::assemble(arguments).map(Instance::new)
}

fn split_group<G: OutGroup>(instance: &Instance) -> Result<Vec<Instance>, InjectError> {
    downcast::<G>(instance).map(|group| group.split())
}

/// Input group parameter
pub struct In<G>(Arc<G>);

impl<G> Deref for In<G> {
    type Target = G;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<G> In<G> {
    pub fn into_inner(self) -> Arc<G> {
        self.0
    }
}

impl<G: InGroup> Resolver for In<G> {
    fn dependency_info() -> DependencyInfo {
        DependencyInfo {
            sentinel: Some(InSentinel {
                members: G::members,
                assemble: assemble_group::<G>,
            }),
            ..DependencyInfo::of::<G>()
        }
    }

    fn resolve(argument: Argument) -> Result<Self, InjectError> {
        Arc::<G>::resolve(argument).map(In)
    }
}

/// Output group return value
pub struct Out<G>(pub G);

impl<G: OutGroup> Out<G> {
    pub(crate) fn sentinel() -> OutSentinel {
        OutSentinel {
            members: G::members,
            split: split_group::<G>,
        }
    }
}

/// Declares an input group struct
///
/// ```
/// use std::sync::Arc;
///
/// struct Database;
/// struct Cache;
///
/// depinject::in_group! {
///     pub struct Storage {
///         pub database: Arc<Database>,
///         pub cache: Option<Arc<Cache>>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! in_group {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($field_vis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($field_vis $field: $ty),*
        }

        impl $crate::InGroup for $name {
            fn members() -> ::std::vec::Vec<$crate::DependencyInfo> {
                ::std::vec![$(<$ty as $crate::Resolver>::dependency_info()),*]
            }

            #[allow(unused_variables)]
            fn assemble(
                arguments: &mut $crate::Arguments,
            ) -> ::std::result::Result<Self, $crate::InjectError> {
                ::std::result::Result::Ok($name {
                    $($field: arguments.next::<$ty>()?),*
                })
            }
        }
    };
}

/// Declares an output group struct
///
/// ```
/// use std::sync::Arc;
///
/// struct Reader;
/// struct Writer;
///
/// depinject::out_group! {
///     pub struct Handles {
///         pub reader: Arc<Reader>,
///         pub writer: Arc<Writer>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! out_group {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($field_vis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($field_vis $field: $ty),*
        }

        impl $crate::OutGroup for $name {
            fn members() -> ::std::vec::Vec<$crate::TypeInfo> {
                ::std::vec![$(<$ty as $crate::OutputValue>::type_info()),*]
            }

            fn split(&self) -> ::std::vec::Vec<$crate::Instance> {
                ::std::vec![$($crate::OutputValue::to_instance(&self.$field)),*]
            }
        }
    };
}
