//! SerialTagSync - the per-element synchronization driver.

use std::fmt;
use std::io::{self, Write};

use tracing::{debug, info, instrument, warn};

use serialtag_common::{
    extract_tags, put_tags, remove_tags, ControllerApi, Element, SyncError, SyncResult,
};

use crate::selector::select_management_interface;

/// What the run does to each management interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Add `#serial:<serial_number>` where it is missing.
    #[default]
    Ensure,
    /// Strip every serial tag.
    Remove,
}

impl SyncMode {
    /// Banner printed before the first element.
    pub fn banner(&self) -> &'static str {
        match self {
            SyncMode::Ensure => {
                "Checking all Elements for '#serial' hashtag on Controller with correct serial..."
            }
            SyncMode::Remove => "Removing all '#serial' hashtags on Controller ports.",
        }
    }
}

/// Result of processing one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementOutcome {
    /// Element has no serial number.
    MissingSerial,
    /// Element is not assigned to a site.
    UnassignedSite,
    /// Interface listing failed.
    InterfacesUnavailable {
        /// Failure detail from the API.
        detail: String,
    },
    /// No "controller"/"controller 1" interface.
    NoManagementInterface,
    /// Serial tag already present; nothing written.
    TagPresent,
    /// Serial tag written.
    TagAdded {
        /// Interface name.
        interface: String,
    },
    /// Writing the serial tag failed.
    AddFailed {
        /// Failure detail from the API.
        detail: String,
    },
    /// Serial tags stripped and written.
    TagsRemoved {
        /// Interface name.
        interface: String,
    },
    /// Writing the stripped description failed.
    RemoveFailed {
        /// Failure detail from the API.
        detail: String,
    },
}

impl ElementOutcome {
    /// Returns true if the element was skipped before any write decision.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            ElementOutcome::MissingSerial
                | ElementOutcome::UnassignedSite
                | ElementOutcome::InterfacesUnavailable { .. }
                | ElementOutcome::NoManagementInterface
        )
    }

    /// Returns true if a write was attempted and failed.
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            ElementOutcome::AddFailed { .. } | ElementOutcome::RemoveFailed { .. }
        )
    }
}

impl fmt::Display for ElementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementOutcome::MissingSerial => write!(f, "Error getting Serial Number."),
            ElementOutcome::UnassignedSite => write!(f, "Not assigned to Site, skipping."),
            ElementOutcome::InterfacesUnavailable { .. } => {
                write!(f, "Unable to read 'interfaces'. Skipping.")
            }
            ElementOutcome::NoManagementInterface => write!(
                f,
                "Could not find Controller/Controller 1 interface. Skipping."
            ),
            ElementOutcome::TagPresent => write!(f, "Serial Hashtag Present."),
            ElementOutcome::TagAdded { interface } => {
                write!(f, "Added Serial Hashtag to {}.", interface)
            }
            ElementOutcome::AddFailed { detail } => {
                write!(f, "Failed to add Serial Hashtag: {}", detail)
            }
            ElementOutcome::TagsRemoved { interface } => {
                write!(f, "Cleaned Serial Hashtags from {}.", interface)
            }
            ElementOutcome::RemoveFailed { detail } => {
                write!(f, "Failed Clean Serial Hashtags: {}", detail)
            }
        }
    }
}

/// Per-run counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Elements visited.
    pub processed: usize,
    /// Elements skipped before a write decision.
    pub skipped: usize,
    /// Elements whose serial tag was already present.
    pub already_present: usize,
    /// Interfaces written successfully.
    pub updated: usize,
    /// Interface writes that failed.
    pub failed: usize,
}

impl SyncReport {
    fn record(&mut self, outcome: &ElementOutcome) {
        self.processed += 1;
        match outcome {
            ElementOutcome::TagPresent => self.already_present += 1,
            ElementOutcome::TagAdded { .. } | ElementOutcome::TagsRemoved { .. } => {
                self.updated += 1
            }
            o if o.is_write_failure() => self.failed += 1,
            _ => self.skipped += 1,
        }
    }
}

/// Serial hashtag synchronizer.
///
/// Walks every element once, in order:
/// 1. Skips elements without a serial or site
/// 2. Fetches interfaces and selects the management interface
/// 3. Ensures or removes the serial tag, writing at most once per interface
///
/// A progress line per element goes to the output sink (stdout by default).
pub struct SerialTagSync<C, W = io::Stdout> {
    /// Controller API the run reads from and writes to.
    controller: C,

    /// Ensure or remove.
    mode: SyncMode,

    /// Progress sink.
    out: W,
}

impl<C: ControllerApi> SerialTagSync<C> {
    /// Creates a synchronizer printing progress to stdout.
    pub fn new(controller: C, mode: SyncMode) -> Self {
        Self {
            controller,
            mode,
            out: io::stdout(),
        }
    }
}

impl<C: ControllerApi, W: Write> SerialTagSync<C, W> {
    /// Redirects progress output.
    pub fn with_output<W2: Write>(self, out: W2) -> SerialTagSync<C, W2> {
        SerialTagSync {
            controller: self.controller,
            mode: self.mode,
            out,
        }
    }

    /// Returns the controller.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Returns the mode.
    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Consumes the synchronizer, returning the progress sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Processes every element.
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReport)` - All elements visited, whatever their outcome
    /// * `Err(SyncError::ElementsUnavailable)` - Element listing failed
    /// * `Err(SyncError::Io)` - Progress output could not be written
    pub async fn run(&mut self) -> SyncResult<SyncReport> {
        let banner = self.mode.banner();
        self.print_line(banner)?;

        let elements = self
            .controller
            .list_elements()
            .await
            .map_err(|error| SyncError::ElementsUnavailable { error })?;
        info!(count = elements.len(), mode = ?self.mode, "Loaded elements");

        let mut report = SyncReport::default();
        for element in &elements {
            self.print(&format!("Checking '{}'... ", element.display_name()))?;
            let outcome = self.sync_element(element).await;
            self.print_line(&outcome.to_string())?;
            report.record(&outcome);
        }

        info!(
            processed = report.processed,
            updated = report.updated,
            present = report.already_present,
            skipped = report.skipped,
            failed = report.failed,
            "Serial hashtag run complete"
        );
        Ok(report)
    }

    /// Processes a single element and returns its outcome.
    ///
    /// Never fails: every problem becomes an [`ElementOutcome`].
    #[instrument(skip(self, element), fields(element = %element.id))]
    pub async fn sync_element(&self, element: &Element) -> ElementOutcome {
        let Some(serial_hashtag) = element.serial_hashtag() else {
            warn!("Element has no serial number");
            return ElementOutcome::MissingSerial;
        };
        let Some(site_id) = element.assigned_site() else {
            debug!(site = ?element.site_id, "Element not assigned to a site");
            return ElementOutcome::UnassignedSite;
        };

        let interfaces = match self.controller.list_interfaces(site_id, &element.id).await {
            Ok(interfaces) => interfaces,
            Err(e) => {
                warn!(site = %site_id, "Unable to read interfaces: {}", e);
                return ElementOutcome::InterfacesUnavailable {
                    detail: e.to_string(),
                };
            }
        };

        let Some(interface) = select_management_interface(interfaces) else {
            warn!(site = %site_id, "No management interface");
            return ElementOutcome::NoManagementInterface;
        };

        let interface_id = interface.id.clone();
        let interface_name = interface.name().to_string();

        match self.mode {
            SyncMode::Remove => {
                let candidate = remove_tags(interface);
                match self
                    .controller
                    .update_interface(site_id, &element.id, &interface_id, &candidate)
                    .await
                {
                    Ok(_) => {
                        info!(interface = %interface_name, "Removed serial hashtags");
                        ElementOutcome::TagsRemoved {
                            interface: interface_name,
                        }
                    }
                    Err(e) => {
                        warn!(interface = %interface_name, "Failed to remove serial hashtags: {}", e);
                        ElementOutcome::RemoveFailed {
                            detail: e.to_string(),
                        }
                    }
                }
            }
            SyncMode::Ensure => {
                if extract_tags(&interface).contains(&serial_hashtag) {
                    debug!(interface = %interface_name, "Serial hashtag present");
                    return ElementOutcome::TagPresent;
                }

                let candidate = put_tags(&[serial_hashtag.as_str()], interface);
                match self
                    .controller
                    .update_interface(site_id, &element.id, &interface_id, &candidate)
                    .await
                {
                    Ok(_) => {
                        info!(interface = %interface_name, tag = %serial_hashtag, "Added serial hashtag");
                        ElementOutcome::TagAdded {
                            interface: interface_name,
                        }
                    }
                    Err(e) => {
                        warn!(interface = %interface_name, "Failed to add serial hashtag: {}", e);
                        ElementOutcome::AddFailed {
                            detail: e.to_string(),
                        }
                    }
                }
            }
        }
    }

    fn print(&mut self, text: &str) -> SyncResult<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| SyncError::io("write progress", e))
    }

    fn print_line(&mut self, text: &str) -> SyncResult<()> {
        writeln!(self.out, "{}", text).map_err(|e| SyncError::io("write progress", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialtag_common::{ApiError, Described};
    use serialtag_test::{element_fixtures, interface_fixtures, ControllerCall, FakeController};

    fn ensure(fake: FakeController) -> SerialTagSync<FakeController, Vec<u8>> {
        SerialTagSync::new(fake, SyncMode::Ensure).with_output(Vec::new())
    }

    fn remove(fake: FakeController) -> SerialTagSync<FakeController, Vec<u8>> {
        SerialTagSync::new(fake, SyncMode::Remove).with_output(Vec::new())
    }

    #[tokio::test]
    async fn test_missing_serial_is_skipped() {
        let element = element_fixtures::element("e1", "5", "");
        let fake = FakeController::new().with_element(element.clone());
        let sync = ensure(fake);

        assert_eq!(
            sync.sync_element(&element).await,
            ElementOutcome::MissingSerial
        );
        assert!(sync.controller().calls().is_empty());
    }

    #[tokio::test]
    async fn test_unassigned_site_is_skipped_without_fetch() {
        let element = element_fixtures::unassigned("e1", "SN1");
        let fake = FakeController::new().with_element(element.clone());
        let sync = ensure(fake);

        assert_eq!(
            sync.sync_element(&element).await,
            ElementOutcome::UnassignedSite
        );
        assert!(sync.controller().calls().is_empty());
    }

    #[tokio::test]
    async fn test_interface_fetch_failure_is_skipped() {
        let element = element_fixtures::element("e1", "5", "SN1");
        let fake = FakeController::new()
            .with_element(element.clone())
            .fail_interfaces("e1", ApiError::status("get interfaces", 403, "forbidden"));
        let sync = ensure(fake);

        let outcome = sync.sync_element(&element).await;
        assert!(matches!(
            outcome,
            ElementOutcome::InterfacesUnavailable { ref detail } if detail.contains("403")
        ));
        assert_eq!(sync.controller().write_count(), 0);
    }

    #[tokio::test]
    async fn test_no_management_interface_is_skipped() {
        let element = element_fixtures::element("e1", "5", "SN1");
        let fake = FakeController::new()
            .with_element(element.clone())
            .with_interface("e1", interface_fixtures::named("i1", "internet 1", ""));
        let sync = ensure(fake);

        assert_eq!(
            sync.sync_element(&element).await,
            ElementOutcome::NoManagementInterface
        );
        assert_eq!(sync.controller().write_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_adds_tag() {
        let element = element_fixtures::element("e1", "5", "SN1");
        let fake = FakeController::new()
            .with_element(element.clone())
            .with_interface("e1", interface_fixtures::controller("i1", "#wan"));
        let sync = ensure(fake);

        assert_eq!(
            sync.sync_element(&element).await,
            ElementOutcome::TagAdded {
                interface: "controller".to_string()
            }
        );

        let stored = sync.controller().interface("e1", "i1").unwrap();
        assert_eq!(stored.description(), Some("#wan #serial:SN1"));
    }

    #[tokio::test]
    async fn test_ensure_skips_write_when_present() {
        let element = element_fixtures::element("e1", "5", "SN1");
        let fake = FakeController::new()
            .with_element(element.clone())
            .with_interface("e1", interface_fixtures::controller("i1", "x #serial:SN1"));
        let sync = ensure(fake);

        assert_eq!(sync.sync_element(&element).await, ElementOutcome::TagPresent);
        assert_eq!(sync.controller().write_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_replaces_stale_serial() {
        let element = element_fixtures::element("e1", "5", "NEW");
        let fake = FakeController::new()
            .with_element(element.clone())
            .with_interface("e1", interface_fixtures::controller("i1", "#serial:OLD #foo"));
        let sync = ensure(fake);

        sync.sync_element(&element).await;

        let stored = sync.controller().interface("e1", "i1").unwrap();
        let description = stored.description().unwrap();
        assert!(description.contains("#foo"));
        assert!(description.contains("#serial:NEW"));
        assert!(!description.contains("#serial:OLD"));
    }

    #[tokio::test]
    async fn test_ensure_write_failure_is_reported() {
        let element = element_fixtures::element("e1", "5", "SN1");
        let fake = FakeController::new()
            .with_element(element.clone())
            .with_interface("e1", interface_fixtures::controller("i1", ""))
            .fail_updates("e1", ApiError::status("put interface", 400, "bad etag"));
        let sync = ensure(fake);

        let outcome = sync.sync_element(&element).await;
        assert!(outcome.is_write_failure());
        assert_eq!(
            outcome.to_string(),
            "Failed to add Serial Hashtag: put interface returned HTTP 400: bad etag"
        );
    }

    #[tokio::test]
    async fn test_remove_always_writes() {
        let element = element_fixtures::element("e1", "5", "SN1");
        let fake = FakeController::new()
            .with_element(element.clone())
            .with_interface("e1", interface_fixtures::controller("i1", "no tags here"));
        let sync = remove(fake);

        assert_eq!(
            sync.sync_element(&element).await,
            ElementOutcome::TagsRemoved {
                interface: "controller".to_string()
            }
        );
        assert_eq!(sync.controller().write_count(), 1);
    }

    #[tokio::test]
    async fn test_run_prints_progress_lines() {
        let fake = FakeController::new()
            .with_element(element_fixtures::named("e1", "branch-1", "5", "SN1"))
            .with_interface("e1", interface_fixtures::controller("i1", ""))
            .with_element(element_fixtures::unassigned("e2", "SN2"));
        let mut sync = ensure(fake);

        let report = sync.run().await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);

        let output = String::from_utf8(sync.into_output()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], SyncMode::Ensure.banner());
        assert_eq!(
            lines[1],
            "Checking 'branch-1'... Added Serial Hashtag to controller."
        );
        assert_eq!(lines[2], "Checking 'e2'... Not assigned to Site, skipping.");
    }

    #[tokio::test]
    async fn test_run_aborts_when_elements_unavailable() {
        let fake =
            FakeController::new().fail_elements(ApiError::transport("get elements", "timed out"));
        let mut sync = ensure(fake);

        let err = sync.run().await.unwrap_err();
        assert!(matches!(err, SyncError::ElementsUnavailable { .. }));
        assert_eq!(sync.controller().calls(), vec![ControllerCall::ListElements]);
    }

    #[test]
    fn test_report_counts() {
        let mut report = SyncReport::default();
        report.record(&ElementOutcome::TagPresent);
        report.record(&ElementOutcome::NoManagementInterface);
        report.record(&ElementOutcome::RemoveFailed {
            detail: "x".to_string(),
        });
        report.record(&ElementOutcome::TagsRemoved {
            interface: "controller".to_string(),
        });

        assert_eq!(
            report,
            SyncReport {
                processed: 4,
                skipped: 1,
                already_present: 1,
                updated: 1,
                failed: 1,
            }
        );
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            ElementOutcome::MissingSerial.to_string(),
            "Error getting Serial Number."
        );
        assert_eq!(
            ElementOutcome::InterfacesUnavailable {
                detail: "x".to_string()
            }
            .to_string(),
            "Unable to read 'interfaces'. Skipping."
        );
        assert_eq!(
            ElementOutcome::TagsRemoved {
                interface: "controller 1".to_string()
            }
            .to_string(),
            "Cleaned Serial Hashtags from controller 1."
        );
        assert!(ElementOutcome::UnassignedSite.is_skip());
        assert!(!ElementOutcome::TagPresent.is_skip());
    }
}
