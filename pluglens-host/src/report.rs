//! Load outcomes and their rendering
//!
//! [`Outcome`] serializes to exactly one of three shapes:
//! `{contract_id, name, version}`, `{class_name, methods, properties, enums}`
//! or `{error_kind, message}`. Its `Display` impl is the text rendering.

use crate::error::{ErrorKind, LoaderError};
use crate::probe::BoundCapability;
use pluglens_api::TypeDescription;
use serde::Serialize;
use std::fmt;

/// Result of one extra contract method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodResult {
    pub method: String,
    pub value: String,
}

/// Values read through a matched contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    pub contract_id: String,
    pub name: String,
    pub version: String,

    /// Results of contract methods beyond `name` and `version`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<MethodResult>,
}

impl CapabilityReport {
    /// Invoke every method of a bound contract
    pub fn from_bound(bound: &BoundCapability<'_>) -> Self {
        let extra = bound
            .method_names()
            .filter(|name| !matches!(*name, "name" | "version"))
            .map(|name| MethodResult {
                method: name.to_string(),
                value: bound.invoke(name).unwrap_or_default(),
            })
            .collect();

        Self {
            contract_id: bound.contract_id().to_string(),
            name: bound.name(),
            version: bound.version(),
            extra,
        }
    }
}

/// A failed load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub error_kind: ErrorKind,
    pub message: String,
}

impl From<&LoaderError> for FailureReport {
    fn from(error: &LoaderError) -> Self {
        Self {
            error_kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Terminal outcome of a load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Capability(CapabilityReport),
    Introspected(TypeDescription),
    Failed(FailureReport),
}

impl Outcome {
    pub fn failed(error: &LoaderError) -> Self {
        Self::Failed(error.into())
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Process exit code: 0 on success, 1 on any failure
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed(failure) => Some(failure.error_kind),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Capability(report) => {
                writeln!(f, "Plugin interface: {}", report.contract_id)?;
                writeln!(f, "Plugin name: {}", report.name)?;
                write!(f, "Plugin version: {}", report.version)?;
                for extra in &report.extra {
                    write!(f, "\nPlugin {}: {}", extra.method, extra.value)?;
                }
                Ok(())
            }
            Outcome::Introspected(description) => write_description(f, description),
            Outcome::Failed(failure) => write!(f, "{}: {}", failure.error_kind, failure.message),
        }
    }
}

fn write_description(f: &mut fmt::Formatter<'_>, description: &TypeDescription) -> fmt::Result {
    write!(f, "Class name: {}", description.class_name)?;

    write!(f, "\nMethods ({}):", description.methods.len())?;
    for method in &description.methods {
        write!(
            f,
            "\n  {} {} {}({})",
            method.access,
            method.kind,
            method.name,
            method.parameters.join(", ")
        )?;
    }

    write!(f, "\nProperties ({}):", description.properties.len())?;
    for property in &description.properties {
        write!(f, "\n  {}: {}", property.name, property.type_name)?;
    }

    write!(f, "\nEnums ({}):", description.enums.len())?;
    for enumeration in &description.enums {
        write!(f, "\n  {}", enumeration.name)?;
        for key in &enumeration.keys {
            write!(f, "\n    {} = {}", key.key, key.value)?;
        }
    }

    Ok(())
}
