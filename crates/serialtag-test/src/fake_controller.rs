//! In-memory controller for driving the synchronizer in tests
//!
//! Holds elements and interfaces, applies interface updates in place, and
//! records every call so tests can assert which requests were issued.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serialtag_common::{ApiError, ApiResult, ControllerApi, Element, Interface};

/// A call received by [`FakeController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCall {
    /// `list_elements()`
    ListElements,
    /// `list_interfaces(site_id, element_id)`
    ListInterfaces {
        site_id: String,
        element_id: String,
    },
    /// `update_interface(...)` with the description that was sent
    UpdateInterface {
        site_id: String,
        element_id: String,
        interface_id: String,
        description: Option<String>,
    },
}

#[derive(Debug, Default)]
struct State {
    interfaces: BTreeMap<String, Vec<Interface>>,
    calls: Vec<ControllerCall>,
}

/// In-memory [`ControllerApi`] implementation
#[derive(Debug, Default)]
pub struct FakeController {
    elements: Vec<Element>,
    elements_failure: Option<ApiError>,
    interface_failures: HashMap<String, ApiError>,
    update_failures: HashMap<String, ApiError>,
    state: Mutex<State>,
}

impl FakeController {
    /// Create an empty controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// Add an interface to an element
    pub fn with_interface(mut self, element_id: impl Into<String>, interface: Interface) -> Self {
        self.state_mut()
            .interfaces
            .entry(element_id.into())
            .or_default()
            .push(interface);
        self
    }

    /// Make `list_elements` fail
    pub fn fail_elements(mut self, error: ApiError) -> Self {
        self.elements_failure = Some(error);
        self
    }

    /// Make `list_interfaces` fail for one element
    pub fn fail_interfaces(mut self, element_id: impl Into<String>, error: ApiError) -> Self {
        self.interface_failures.insert(element_id.into(), error);
        self
    }

    /// Make `update_interface` fail for one element
    pub fn fail_updates(mut self, element_id: impl Into<String>, error: ApiError) -> Self {
        self.update_failures.insert(element_id.into(), error);
        self
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> Vec<ControllerCall> {
        self.state().calls.clone()
    }

    /// Forget recorded calls (stored interfaces are kept)
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Number of `update_interface` calls received
    pub fn write_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, ControllerCall::UpdateInterface { .. }))
            .count()
    }

    /// Number of `list_interfaces` calls received
    pub fn interface_fetch_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, ControllerCall::ListInterfaces { .. }))
            .count()
    }

    /// Current stored copy of an interface
    pub fn interface(&self, element_id: &str, interface_id: &str) -> Option<Interface> {
        self.state()
            .interfaces
            .get(element_id)?
            .iter()
            .find(|iface| iface.id == interface_id)
            .cloned()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut State {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ControllerApi for FakeController {
    async fn list_elements(&self) -> ApiResult<Vec<Element>> {
        self.state().calls.push(ControllerCall::ListElements);
        match &self.elements_failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.elements.clone()),
        }
    }

    async fn list_interfaces(
        &self,
        site_id: &str,
        element_id: &str,
    ) -> ApiResult<Vec<Interface>> {
        let mut state = self.state();
        state.calls.push(ControllerCall::ListInterfaces {
            site_id: site_id.to_string(),
            element_id: element_id.to_string(),
        });

        if let Some(error) = self.interface_failures.get(element_id) {
            return Err(error.clone());
        }
        Ok(state.interfaces.get(element_id).cloned().unwrap_or_default())
    }

    async fn update_interface(
        &self,
        site_id: &str,
        element_id: &str,
        interface_id: &str,
        interface: &Interface,
    ) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(ControllerCall::UpdateInterface {
            site_id: site_id.to_string(),
            element_id: element_id.to_string(),
            interface_id: interface_id.to_string(),
            description: interface.description.clone(),
        });

        if let Some(error) = self.update_failures.get(element_id) {
            return Err(error.clone());
        }

        let stored = state
            .interfaces
            .get_mut(element_id)
            .and_then(|list| list.iter_mut().find(|iface| iface.id == interface_id))
            .ok_or_else(|| ApiError::status("put interface", 404, "interface not found"))?;
        *stored = interface.clone();
        Ok(())
    }
}
