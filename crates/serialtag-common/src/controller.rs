//! Controller API contract.
//!
//! The synchronizer only needs three calls from the management API. The
//! production implementation talks HTTP; tests use an in-memory controller.
//! Every call reports failure through [`ApiError`], and callers decide
//! whether that skips an element or aborts the run.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::records::{Element, Interface};

/// Read/update access to elements and their interfaces.
///
/// # Example
///
/// ```ignore
/// use serialtag_common::{ControllerApi, ApiResult, Element, Interface};
///
/// struct Static(Vec<Element>);
///
/// #[async_trait]
/// impl ControllerApi for Static {
///     async fn list_elements(&self) -> ApiResult<Vec<Element>> {
///         Ok(self.0.clone())
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// Lists every element visible to the tenant.
    async fn list_elements(&self) -> ApiResult<Vec<Element>>;

    /// Lists the interfaces of one element.
    async fn list_interfaces(&self, site_id: &str, element_id: &str)
        -> ApiResult<Vec<Interface>>;

    /// Replaces an interface record.
    ///
    /// Success is decided by the controller's status alone; whatever body
    /// it answers with is not interpreted.
    async fn update_interface(
        &self,
        site_id: &str,
        element_id: &str,
        interface_id: &str,
        interface: &Interface,
    ) -> ApiResult<()>;
}

/// Borrowed controllers work anywhere an owned one does, so a caller can
/// keep inspecting the controller after a run.
#[async_trait]
impl<T: ControllerApi + ?Sized> ControllerApi for &T {
    async fn list_elements(&self) -> ApiResult<Vec<Element>> {
        (**self).list_elements().await
    }

    async fn list_interfaces(
        &self,
        site_id: &str,
        element_id: &str,
    ) -> ApiResult<Vec<Interface>> {
        (**self).list_interfaces(site_id, element_id).await
    }

    async fn update_interface(
        &self,
        site_id: &str,
        element_id: &str,
        interface_id: &str,
        interface: &Interface,
    ) -> ApiResult<()> {
        (**self)
            .update_interface(site_id, element_id, interface_id, interface)
            .await
    }
}
