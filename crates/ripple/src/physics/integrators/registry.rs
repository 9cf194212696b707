//! Name lookup for integrators
//!
//! Each integrator describes itself (canonical name and aliases). The registry
//! indexes instances under every name so configuration files and the command
//! line can pick a scheme by string.

use super::Integrator;
use crate::error::{Result, SimulationError};
use std::collections::{BTreeSet, HashMap};

pub struct IntegratorRegistry {
    /// Canonical names and aliases, all pointing at an instance
    integrators: HashMap<String, Box<dyn Integrator>>,
}

impl IntegratorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            integrators: HashMap::new(),
        }
    }

    /// Register the integrators that ship with the engine.
    pub fn with_standard_integrators(mut self) -> Self {
        use super::{ExplicitEuler, SemiImplicitEuler};

        self.register(Box::new(SemiImplicitEuler));
        self.register(Box::new(ExplicitEuler));
        self
    }

    pub fn with_integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.register(integrator);
        self
    }

    pub fn register(&mut self, integrator: Box<dyn Integrator>) {
        for alias in integrator.aliases() {
            self.integrators
                .insert(alias.to_string(), integrator.clone_box());
        }
        self.integrators
            .insert(integrator.name().to_string(), integrator);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Integrator>> {
        self.integrators
            .get(name)
            .map(|integrator| integrator.clone_box())
            .ok_or_else(|| {
                SimulationError::invalid(format!(
                    "unknown integrator '{}'; available: {}",
                    name,
                    self.list_available().join(", ")
                ))
            })
    }

    /// Canonical names, sorted
    pub fn list_available(&self) -> Vec<String> {
        self.integrators
            .values()
            .map(|integrator| integrator.name().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// `(alias, canonical)` pairs, sorted by alias
    pub fn list_aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .integrators
            .iter()
            .filter(|(key, integrator)| key.as_str() != integrator.name())
            .map(|(key, integrator)| (key.clone(), integrator.name().to_string()))
            .collect();
        aliases.sort();
        aliases
    }
}

impl Default for IntegratorRegistry {
    fn default() -> Self {
        Self::new().with_standard_integrators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::integrators::Spring;
    use crate::physics::node::Node;

    #[derive(Debug, Clone)]
    struct Frozen;

    impl Integrator for Frozen {
        fn clone_box(&self) -> Box<dyn Integrator> {
            Box::new(self.clone())
        }

        fn step(&self, _: &mut Node, _: Spring) {}

        fn name(&self) -> &'static str {
            "frozen"
        }

        fn aliases(&self) -> Vec<&'static str> {
            vec!["still"]
        }
    }

    #[test]
    fn test_standard_integrators() {
        let registry = IntegratorRegistry::default();

        assert_eq!(
            registry.list_available(),
            vec!["explicit_euler", "semi_implicit_euler"]
        );
        assert_eq!(
            registry.create("euler").unwrap().name(),
            "semi_implicit_euler"
        );
        assert_eq!(
            registry.create("symplectic_euler").unwrap().name(),
            "semi_implicit_euler"
        );
    }

    #[test]
    fn test_list_aliases() {
        let registry = IntegratorRegistry::new().with_integrator(Box::new(Frozen));
        assert_eq!(
            registry.list_aliases(),
            vec![("still".to_string(), "frozen".to_string())]
        );
        assert_eq!(registry.list_available(), vec!["frozen"]);
    }

    #[test]
    fn test_unknown_integrator_error() {
        let registry = IntegratorRegistry::default();

        match registry.create("runge_kutta") {
            Err(SimulationError::InvalidConfiguration(message)) => {
                assert!(message.contains("runge_kutta"));
                assert!(message.contains("semi_implicit_euler"));
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn test_case_sensitivity() {
        let registry = IntegratorRegistry::default();
        assert!(registry.create("Euler").is_err());
        assert!(registry.create("euler").is_ok());
    }

    #[test]
    fn test_empty_registry() {
        let registry = IntegratorRegistry::new();
        assert!(registry.list_available().is_empty());
        assert!(registry.list_aliases().is_empty());
        assert!(registry.create("euler").is_err());
    }
}
