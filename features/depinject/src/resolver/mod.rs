use std::any::type_name;

use crate::{
    errors::InjectError,
    types::{DependencyInfo, Instance, TypeInfo},
};

pub mod arc;
pub mod list;
pub mod sentinel;

/// A value assembled by the container for one constructor parameter
#[derive(Debug, Clone)]
pub enum Argument {
    /// The value of the single matching provider
    Single(Instance),
    /// Values of every matching provider, in lookup order
    List(Vec<Instance>),
    /// No provider matched an optional or variadic parameter
    Absent,
}

/// Positional arguments for one constructor call
#[derive(Debug)]
pub struct Arguments {
    values: std::vec::IntoIter<Argument>,
}
impl Arguments {
    pub fn new(values: Vec<Argument>) -> Self {
        Arguments {
            values: values.into_iter(),
        }
    }

    /// Resolves the next positional argument
    pub fn next<R: Resolver>(&mut self) -> Result<R, InjectError> {
        let argument = self
            .values
            .next()
            .ok_or(InjectError::MissingArgument(type_name::<R>()))?;
        R::resolve(argument)
    }

    /// Takes the next argument as a single, still type erased value
    pub(crate) fn next_instance(&mut self, type_info: TypeInfo) -> Result<Instance, InjectError> {
        match self.values.next() {
            Some(Argument::Single(instance)) => Ok(instance),
            _ => Err(InjectError::MissingArgument(type_info.type_name)),
        }
    }

    /// Number of arguments not yet consumed
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// A type which can be requested from the container
///
/// Declares the dependency it needs and converts the assembled argument
/// into itself.
pub trait Resolver: Sized {
    fn dependency_info() -> DependencyInfo;

    fn resolve(argument: Argument) -> Result<Self, InjectError>;
}
