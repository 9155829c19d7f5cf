use std::collections::HashSet;

use thiserror::Error;

/// Static description of an ODE system.
///
/// Holds the names of the state variables, parameters, and auxiliary outputs,
/// plus the number of noise terms the right-hand side consumes. The lengths of
/// these lists fix the shapes of every buffer the engine exchanges with callers.
///
/// A `ProblemDefinition` is immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemDefinition {
    variables: Vec<String>,
    parameters: Vec<String>,
    aux: Vec<String>,
    num_noise: usize,
}

/// Errors that can occur when constructing a [`ProblemDefinition`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("a problem needs at least one state variable")]
    NoVariables,

    #[error("empty {group} name at position {index}")]
    EmptyName { group: &'static str, index: usize },

    #[error("duplicate {group} name `{name}`")]
    DuplicateName { group: &'static str, name: String },
}

impl ProblemDefinition {
    /// Creates a problem definition from name lists and a noise-term count.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no variables, or if any name is empty or
    /// repeated within its group.
    pub fn new<V, P, A>(
        variables: V,
        parameters: P,
        aux: A,
        num_noise: usize,
    ) -> Result<Self, ProblemError>
    where
        V: IntoIterator,
        V::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let variables: Vec<String> = variables.into_iter().map(Into::into).collect();
        let parameters: Vec<String> = parameters.into_iter().map(Into::into).collect();
        let aux: Vec<String> = aux.into_iter().map(Into::into).collect();

        if variables.is_empty() {
            return Err(ProblemError::NoVariables);
        }
        check_names("variable", &variables)?;
        check_names("parameter", &parameters)?;
        check_names("aux", &aux)?;

        Ok(Self {
            variables,
            parameters,
            aux,
            num_noise,
        })
    }

    /// Returns the state variable names.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Returns the parameter names.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Returns the auxiliary output names.
    #[must_use]
    pub fn aux(&self) -> &[String] {
        &self.aux
    }

    /// Number of state variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// Number of parameters.
    #[must_use]
    pub fn num_params(&self) -> usize {
        self.parameters.len()
    }

    /// Number of auxiliary outputs.
    #[must_use]
    pub fn num_aux(&self) -> usize {
        self.aux.len()
    }

    /// Number of noise terms drawn per step.
    #[must_use]
    pub fn num_noise(&self) -> usize {
        self.num_noise
    }

    /// Returns the index of the named state variable, if present.
    #[must_use]
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }
}

fn check_names(group: &'static str, names: &[String]) -> Result<(), ProblemError> {
    let mut seen = HashSet::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(ProblemError::EmptyName { group, index });
        }
        if !seen.insert(name.as_str()) {
            return Err(ProblemError::DuplicateName {
                group,
                name: name.clone(),
            });
        }
    }
    Ok(())
}
