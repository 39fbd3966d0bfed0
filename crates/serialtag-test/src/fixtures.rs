//! Test fixtures for elements and interfaces
//!
//! Provides reusable records and multi-element scenarios

use serialtag_common::{defaults, Element, Interface};
use serde_json::Value;

/// Common element fixtures
pub mod element_fixtures {
    use super::*;

    /// Element assigned to a site, named after its id
    pub fn element(id: &str, site_id: &str, serial: &str) -> Element {
        Element {
            id: id.to_string(),
            name: None,
            site_id: Some(site_id.to_string()),
            serial_number: Some(serial.to_string()),
        }
    }

    /// Element with a display name
    pub fn named(id: &str, name: &str, site_id: &str, serial: &str) -> Element {
        Element {
            name: Some(name.to_string()),
            ..element(id, site_id, serial)
        }
    }

    /// Element parked on the unassigned site
    pub fn unassigned(id: &str, serial: &str) -> Element {
        element(id, defaults::UNASSIGNED_SITE_ID, serial)
    }

    /// Element without a serial number
    pub fn without_serial(id: &str, site_id: &str) -> Element {
        Element {
            serial_number: None,
            ..element(id, site_id, "")
        }
    }
}

/// Common interface fixtures
pub mod interface_fixtures {
    use super::*;

    /// Interface with a name and description
    pub fn named(id: &str, name: &str, description: &str) -> Interface {
        let mut interface = Interface {
            id: id.to_string(),
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        };
        interface
            .extra
            .insert("admin_up".to_string(), Value::Bool(true));
        interface
    }

    /// "controller" management interface
    pub fn controller(id: &str, description: &str) -> Interface {
        named(id, "controller", description)
    }

    /// "controller 1" management interface
    pub fn controller_1(id: &str, description: &str) -> Interface {
        named(id, "controller 1", description)
    }

    /// Data-plane interface that is never selected
    pub fn lan(id: &str) -> Interface {
        named(id, "1", "")
    }
}

/// An element together with its interfaces
#[derive(Debug, Clone)]
pub struct ElementSetup {
    /// The element record
    pub element: Element,
    /// Its interfaces, in listing order
    pub interfaces: Vec<Interface>,
}

/// Scenario builder for multi-element runs
#[derive(Debug, Default)]
pub struct TestScenario {
    /// Scenario name
    pub name: String,
    /// Elements in listing order
    pub elements: Vec<ElementSetup>,
}

impl TestScenario {
    /// Create a new scenario
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Add an element with its interfaces
    pub fn add_element(mut self, element: Element, interfaces: Vec<Interface>) -> Self {
        self.elements.push(ElementSetup {
            element,
            interfaces,
        });
        self
    }

    /// Build an in-memory controller holding the scenario
    pub fn controller(&self) -> crate::FakeController {
        let mut fake = crate::FakeController::new();
        for setup in &self.elements {
            fake = fake.with_element(setup.element.clone());
            for interface in &setup.interfaces {
                fake = fake.with_interface(setup.element.id.clone(), interface.clone());
            }
        }
        fake
    }
}
