use std::{any::type_name, marker::PhantomData, sync::Arc};

use crate::{
    errors::{ConstructError, InjectError},
    resolver::{
        sentinel::{Out, OutGroup},
        Arguments, Resolver,
    },
    types::{DependencyInfo, DynError, InSentinel, Injectable, Instance, OutSentinel, OutputInfo, TypeInfo},
};

/// Type erased constructor, as seen by the container
///
/// Callables, supplied values and sentinel groups are all factories.
pub trait DynFactory: Send + Sync {
    /// Human readable name, used as the base of the provider id
    fn name(&self) -> String;

    /// Dependencies in parameter order
    fn dependencies(&self) -> Vec<DependencyInfo>;

    /// Types this factory produces
    fn outputs(&self) -> Vec<OutputInfo>;

    /// Calls the constructor with arguments matching [DynFactory::dependencies]
    ///
    /// Returns one instance per output.
    fn construct(&mut self, arguments: Arguments) -> Result<Vec<Instance>, ConstructError>;
}

/// A value which is a single output of a constructor
pub trait IntoOutput {
    fn output_info() -> OutputInfo;

    fn into_instance(self) -> Instance;
}
impl<T: Injectable + ?Sized> IntoOutput for Arc<T> {
    fn output_info() -> OutputInfo {
        OutputInfo::of::<T>()
    }

    fn into_instance(self) -> Instance {
        Instance::from_arc(self)
    }
}
impl<T: Injectable + ?Sized> IntoOutput for Vec<Arc<T>> {
    fn output_info() -> OutputInfo {
        OutputInfo::of::<Vec<Arc<T>>>()
    }

    fn into_instance(self) -> Instance {
        Instance::new(self)
    }
}
impl<G: OutGroup> IntoOutput for Out<G> {
    fn output_info() -> OutputInfo {
        OutputInfo {
            sentinel: Some(Out::<G>::sentinel()),
            ..OutputInfo::of::<G>()
        }
    }

    fn into_instance(self) -> Instance {
        Instance::new(self.0)
    }
}

/// The return type of a constructor
///
/// The `Err` side of a `Result` is the failure signal and never an output.
pub trait IntoOutputs {
    fn outputs() -> Vec<OutputInfo>;

    fn into_instances(self) -> Result<Vec<Instance>, ConstructError>;
}

macro_rules! single_output {
    ($($ty:ty => [$($generics:tt)*]),*) => {
        $(
            impl<$($generics)*> IntoOutputs for $ty {
                fn outputs() -> Vec<OutputInfo> {
                    vec![<$ty as IntoOutput>::output_info()]
                }

                fn into_instances(self) -> Result<Vec<Instance>, ConstructError> {
                    Ok(vec![self.into_instance()])
                }
            }
        )*
    };
}
single_output!(
    Arc<T> => [T: Injectable + ?Sized],
    Vec<Arc<T>> => [T: Injectable + ?Sized],
    Out<G> => [G: OutGroup]
);

/// Side effect only
impl IntoOutputs for () {
    fn outputs() -> Vec<OutputInfo> {
        Vec::new()
    }

    fn into_instances(self) -> Result<Vec<Instance>, ConstructError> {
        Ok(Vec::new())
    }
}

impl<R: IntoOutputs, E: Into<DynError>> IntoOutputs for Result<R, E> {
    fn outputs() -> Vec<OutputInfo> {
        R::outputs()
    }

    fn into_instances(self) -> Result<Vec<Instance>, ConstructError> {
        self.map_err(|error| ConstructError::Failed(error.into()))?
            .into_instances()
    }
}

macro_rules! tuple_outputs {
    ($($output:ident),*) => {
        #[allow(non_snake_case)]
        impl<$($output: IntoOutput),*> IntoOutputs for ($($output,)*) {
            fn outputs() -> Vec<OutputInfo> {
                vec![$($output::output_info()),*]
            }

            fn into_instances(self) -> Result<Vec<Instance>, ConstructError> {
                let ($($output,)*) = self;
                Ok(vec![$($output.into_instance()),*])
            }
        }
    };
}
tuple_outputs!(A, B);
tuple_outputs!(A, B, C);
tuple_outputs!(A, B, C, D);
tuple_outputs!(A, B, C, D, E);
tuple_outputs!(A, B, C, D, E, F);

/// Factory wrapping a callable
///
/// `Marker` is the callable's signature as a function pointer type, which
/// keeps the impls for different arities apart.
pub struct FnFactory<Fun, Marker> {
    function: Fun,
    marker: PhantomData<fn() -> Marker>,
}

/// A callable which can be registered as a provider
///
/// Implemented for every `FnMut` of arity 0 to 8 whose parameters are
/// [Resolver]s and whose return value is [IntoOutputs].
pub trait IntoFactory<Marker> {
    fn into_factory(self) -> Box<dyn DynFactory>;
}

/// A callable whose dependencies can be injected once, see [crate::Container::call]
pub trait Invocable<Marker> {
    type Output;

    fn dependencies() -> Vec<DependencyInfo>;

    fn invoke(self, arguments: Arguments) -> Result<Self::Output, InjectError>;
}

macro_rules! callable {
    ($($param:ident),*) => {
        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<Fun, Ret, $($param),*> DynFactory for FnFactory<Fun, fn($($param),*) -> Ret>
        where
            Fun: FnMut($($param),*) -> Ret + Send + Sync + 'static,
            Ret: IntoOutputs + 'static,
            $($param: Resolver + 'static,)*
        {
            fn name(&self) -> String {
                type_name::<Fun>().to_string()
            }

            fn dependencies(&self) -> Vec<DependencyInfo> {
                vec![$(<$param as Resolver>::dependency_info()),*]
            }

            fn outputs(&self) -> Vec<OutputInfo> {
                Ret::outputs()
            }

            fn construct(&mut self, mut arguments: Arguments) -> Result<Vec<Instance>, ConstructError> {
                $(let $param = arguments.next::<$param>()?;)*
                (self.function)($($param),*).into_instances()
            }
        }

        impl<Fun, Ret, $($param),*> IntoFactory<fn($($param),*) -> Ret> for Fun
        where
            Fun: FnMut($($param),*) -> Ret + Send + Sync + 'static,
            Ret: IntoOutputs + 'static,
            $($param: Resolver + 'static,)*
        {
            fn into_factory(self) -> Box<dyn DynFactory> {
                Box::new(FnFactory {
                    function: self,
                    marker: PhantomData::<fn() -> fn($($param),*) -> Ret>,
                })
            }
        }

        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<Fun, Ret, $($param),*> Invocable<fn($($param),*) -> Ret> for Fun
        where
            Fun: FnOnce($($param),*) -> Ret,
            $($param: Resolver,)*
        {
            type Output = Ret;

            fn dependencies() -> Vec<DependencyInfo> {
                vec![$(<$param as Resolver>::dependency_info()),*]
            }

            fn invoke(self, mut arguments: Arguments) -> Result<Ret, InjectError> {
                $(let $param = arguments.next::<$param>()?;)*
                Ok(self($($param),*))
            }
        }
    };
}
callable!();
callable!(A1);
callable!(A1, A2);
callable!(A1, A2, A3);
callable!(A1, A2, A3, A4);
callable!(A1, A2, A3, A4, A5);
callable!(A1, A2, A3, A4, A5, A6);
callable!(A1, A2, A3, A4, A5, A6, A7);
callable!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Factory returning an already existing value
pub struct SuppliedValue {
    instance: Instance,
}
impl SuppliedValue {
    pub fn new(instance: Instance) -> Self {
        SuppliedValue { instance }
    }
}
impl DynFactory for SuppliedValue {
    fn name(&self) -> String {
        format!("supply({})", self.instance.info)
    }

    fn dependencies(&self) -> Vec<DependencyInfo> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<OutputInfo> {
        vec![OutputInfo {
            type_info: self.instance.info,
            sentinel: None,
        }]
    }

    fn construct(&mut self, _: Arguments) -> Result<Vec<Instance>, ConstructError> {
        Ok(vec![self.instance.clone()])
    }
}

/// Builds an input group from its members
pub struct GroupAssembler {
    group: TypeInfo,
    sentinel: InSentinel,
}
impl GroupAssembler {
    pub fn new(group: TypeInfo, sentinel: InSentinel) -> Self {
        GroupAssembler { group, sentinel }
    }
}
impl DynFactory for GroupAssembler {
    fn name(&self) -> String {
        format!("in({})", self.group)
    }

    fn dependencies(&self) -> Vec<DependencyInfo> {
        (self.sentinel.members)()
    }

    fn outputs(&self) -> Vec<OutputInfo> {
        vec![OutputInfo {
            type_info: self.group,
            sentinel: None,
        }]
    }

    fn construct(&mut self, mut arguments: Arguments) -> Result<Vec<Instance>, ConstructError> {
        let group = (self.sentinel.assemble)(&mut arguments)?;
        Ok(vec![group])
    }
}

/// Splits an output group into its members
pub struct GroupSplitter {
    group: TypeInfo,
    sentinel: OutSentinel,
}
impl GroupSplitter {
    pub fn new(group: TypeInfo, sentinel: OutSentinel) -> Self {
        GroupSplitter { group, sentinel }
    }
}
impl DynFactory for GroupSplitter {
    fn name(&self) -> String {
        format!("out({})", self.group)
    }

    fn dependencies(&self) -> Vec<DependencyInfo> {
        vec![DependencyInfo::of_type(self.group)]
    }

    fn outputs(&self) -> Vec<OutputInfo> {
        (self.sentinel.members)()
            .into_iter()
            .map(|type_info| OutputInfo {
                type_info,
                sentinel: None,
            })
            .collect()
    }

    fn construct(&mut self, mut arguments: Arguments) -> Result<Vec<Instance>, ConstructError> {
        let group = arguments.next_instance(self.group)?;
        Ok((self.sentinel.split)(&group)?)
    }
}
