//! Kubernetes service addresses.
//!
//! Kubernetes injects `{SERVICE}_SERVICE_HOST` and `{SERVICE}_SERVICE_PORT`
//! (or `{SERVICE}_SERVICE_PORT_{PORT_NAME}` for a named port) into every pod,
//! where `SERVICE` is the service name upper-cased with hyphens replaced by
//! underscores. A Kubernetes address declaration reads both as one composite
//! value, so setting only one of them is an error.

use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::network_port_number;
use crate::composite::VariableComposite;
use crate::constraint::{apply_constraints, Constraint};
use crate::declaration::{Declaration, DeclarationBuilder, DeclarationKind, OptionalDeclaration};
use crate::environment::Environment;
use crate::error::{Error, SpecificationError};
use crate::example::Example;
use crate::maybe::Maybe;
use crate::schema::Schema;
use crate::variable::AnyVariable;

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.?$")
        .unwrap()
});

/// Host and port of a Kubernetes service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KubernetesAddress {
    /// Hostname or IP address
    pub host: String,
    /// Port number
    pub port: u16,
}

impl KubernetesAddress {
    /// Create an address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for KubernetesAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => write!(f, "[{}]:{}", self.host, self.port),
            _ => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

fn is_host(host: &str) -> bool {
    host.parse::<IpAddr>().is_ok() || (host.len() <= 253 && HOSTNAME.is_match(host))
}

/// Check a service or port name: lowercase letters, digits and hyphens,
/// not starting or ending with a hyphen.
fn check_name(name: &str, what: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{} can't be empty", what));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(format!(
            "{} {:?} must only contain lowercase letters, digits, and hyphens",
            what, name
        ));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(format!("{} {:?} can't start or end with a hyphen", what, name));
    }
    Ok(())
}

fn env_name(name: &str) -> String {
    name.to_ascii_uppercase().replace('-', "_")
}

/// Environment variable names for a service's host and port.
pub fn service_variable_names(service: &str, port_name: Option<&str>) -> (String, String) {
    let service = env_name(service);
    let host = format!("{}_SERVICE_HOST", service);
    let port = match port_name {
        Some(port_name) => format!("{}_SERVICE_PORT_{}", service, env_name(port_name)),
        None => format!("{}_SERVICE_PORT", service),
    };
    (host, port)
}

#[derive(Debug, Clone, Default)]
struct HostKind;

impl DeclarationKind for HostKind {
    type Value = String;

    fn schema(&self, constraints: Vec<Constraint<String>>) -> Result<Schema<String>, String> {
        let mut all = vec![Constraint::extrinsic(
            "must be a hostname or IP address",
            |host: &String| {
                if is_host(host) {
                    Ok(())
                } else {
                    Err("must be a hostname or IP address".to_string())
                }
            },
        )];
        all.extend(constraints);
        Ok(Schema::scalar(
            "host",
            |v: &String| v.clone(),
            |raw: &str| Ok(raw.to_string()),
            all,
        ))
    }

    fn examples(&self) -> Vec<Example<String>> {
        vec![
            Example::new("redis.default.svc.cluster.local".to_string(), "a cluster DNS name"),
            Example::new("10.0.0.12".to_string(), "a cluster IP"),
        ]
    }
}

/// Builder for a Kubernetes address declaration.
pub struct KubernetesAddressBuilder {
    env: Environment,
    service: String,
    description: String,
    port_name: Option<String>,
    default: Option<KubernetesAddress>,
    constraints: Vec<Constraint<KubernetesAddress>>,
}

/// Declare the address of the Kubernetes service `service`.
pub fn kubernetes_address(
    env: &Environment,
    service: impl Into<String>,
    description: impl Into<String>,
) -> KubernetesAddressBuilder {
    KubernetesAddressBuilder {
        env: env.clone(),
        service: service.into(),
        description: description.into(),
        port_name: None,
        default: None,
        constraints: Vec::new(),
    }
}

impl KubernetesAddressBuilder {
    /// Read the named port `{SERVICE}_SERVICE_PORT_{PORT_NAME}`.
    pub fn port_name(mut self, port_name: impl Into<String>) -> Self {
        self.port_name = Some(port_name.into());
        self
    }

    /// Address used when neither variable is set.
    pub fn default(mut self, address: KubernetesAddress) -> Self {
        self.default = Some(address);
        self
    }

    /// Add a documented constraint on the combined address.
    pub fn constraint<F>(mut self, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&KubernetesAddress) -> Result<(), String> + Send + Sync + 'static,
    {
        self.constraints.push(Constraint::extrinsic(description, check));
        self
    }

    /// Declare a required (or defaulted) address.
    pub fn declare(self) -> Result<Declaration<KubernetesAddress>, Error> {
        let (env, composite) = self.register(true)?;
        Ok(Declaration::from_composite(env, composite))
    }

    /// Declare an address that may be left unset.
    pub fn declare_optional(self) -> Result<OptionalDeclaration<KubernetesAddress>, Error> {
        let (env, composite) = self.register(false)?;
        Ok(OptionalDeclaration::from_composite(env, composite))
    }

    fn register(
        self,
        is_required: bool,
    ) -> Result<(Environment, Arc<VariableComposite<KubernetesAddress>>), Error> {
        let spec_error = |message: String| SpecificationError::new(self.service.clone(), message);

        check_name(&self.service, "name").map_err(spec_error)?;
        if let Some(port_name) = &self.port_name {
            check_name(port_name, "port name").map_err(spec_error)?;
        }
        if let Some(default) = &self.default {
            apply_constraints(&self.constraints, default).map_err(|e| {
                spec_error(format!("default value {:?} is invalid: {}", default.to_string(), e))
            })?;
        }

        let (host_name, port_name) = service_variable_names(&self.service, self.port_name.as_deref());
        let (host_default, port_default) = match &self.default {
            Some(address) => (Some(address.host.clone()), Some(address.port)),
            None => (None, None),
        };

        let host = DeclarationBuilder::new(
            &self.env,
            host_name,
            format!("{} (host)", self.description),
            HostKind,
        )
        .build(Maybe::Defined(host_default))?;
        let port = network_port_number(
            &self.env,
            port_name,
            format!("{} (port)", self.description),
        )
        .build(Maybe::Defined(port_default))?;

        let variables = vec![
            host.clone() as Arc<dyn AnyVariable>,
            port.clone() as Arc<dyn AnyVariable>,
        ];
        self.env.register_all(variables.clone())?;

        let composite = VariableComposite::new(
            self.service.clone(),
            variables,
            move |env| {
                Ok(KubernetesAddress {
                    host: host.defined_value(env)?,
                    port: port.defined_value(env)?,
                })
            },
            self.constraints,
            is_required && self.default.is_none(),
        )?;

        let composite = Arc::new(composite);
        self.env.register_composite(composite.clone())?;
        Ok((self.env, composite))
    }
}

impl fmt::Debug for KubernetesAddressBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubernetesAddressBuilder")
            .field("service", &self.service)
            .field("port_name", &self.port_name)
            .finish_non_exhaustive()
    }
}
