use std::{any::type_name, sync::Arc};

use crate::{
    errors::InjectError,
    resolver::{Argument, Resolver},
    types::{DependencyInfo, Injectable, Instance},
};

pub(crate) fn downcast<T: Injectable + ?Sized>(instance: &Instance) -> Result<Arc<T>, InjectError> {
    instance
        .downcast::<T>()
        .map_err(|actual_type| InjectError::DowncastFailed {
            required_type: type_name::<T>(),
            actual_type,
        })
}

impl<T: Injectable + ?Sized> Resolver for Arc<T> {
    fn dependency_info() -> DependencyInfo {
        DependencyInfo::of::<T>()
    }

    fn resolve(argument: Argument) -> Result<Self, InjectError> {
        match argument {
            Argument::Single(instance) => downcast(&instance),
            Argument::List(_) | Argument::Absent => {
                Err(InjectError::MissingArgument(type_name::<T>()))
            }
        }
    }
}

impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    fn dependency_info() -> DependencyInfo {
        let original = Resolvable::dependency_info();
        DependencyInfo {
            optional: true,
            ..original
        }
    }

    fn resolve(argument: Argument) -> Result<Self, InjectError> {
        match argument {
            // If nothing provides the type, Option does not fail
            Argument::Absent => Ok(None),
            argument => Resolvable::resolve(argument).map(Some),
        }
    }
}
