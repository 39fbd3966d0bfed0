//! Verification helpers for testing the synchronizer
//!
//! Assertions over the interfaces and calls recorded by [`FakeController`]

use crate::{ControllerCall, FakeController};
use serialtag_common::extract_tags;
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Interface '{interface}' of element '{element}' not found")]
    InterfaceNotFound { element: String, interface: String },

    #[error("Expected tag '{tag}' on {element}/{interface}, description was {description:?}")]
    TagMissing {
        element: String,
        interface: String,
        tag: String,
        description: Option<String>,
    },

    #[error("Unexpected tag '{tag}' on {element}/{interface}, description was {description:?}")]
    TagUnexpected {
        element: String,
        interface: String,
        tag: String,
        description: Option<String>,
    },

    #[error("Expected {expected} {what}, found {actual}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Element '{element}' had its interfaces fetched")]
    UnexpectedFetch { element: String },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Controller state verification helper
pub struct ControllerVerifier<'a> {
    fake: &'a FakeController,
}

impl<'a> ControllerVerifier<'a> {
    /// Create a new verifier
    pub fn new(fake: &'a FakeController) -> Self {
        Self { fake }
    }

    /// Verify that an interface carries a tag
    pub fn assert_tag_present(&self, element: &str, interface: &str, tag: &str) -> VerifyResult<()> {
        let stored = self.fake.interface(element, interface).ok_or_else(|| {
            VerificationError::InterfaceNotFound {
                element: element.to_string(),
                interface: interface.to_string(),
            }
        })?;

        if !extract_tags(&stored).contains(tag) {
            return Err(VerificationError::TagMissing {
                element: element.to_string(),
                interface: interface.to_string(),
                tag: tag.to_string(),
                description: stored.description,
            });
        }
        Ok(())
    }

    /// Verify that an interface does not carry a tag
    pub fn assert_tag_absent(&self, element: &str, interface: &str, tag: &str) -> VerifyResult<()> {
        let stored = self.fake.interface(element, interface).ok_or_else(|| {
            VerificationError::InterfaceNotFound {
                element: element.to_string(),
                interface: interface.to_string(),
            }
        })?;

        if extract_tags(&stored).contains(tag) {
            return Err(VerificationError::TagUnexpected {
                element: element.to_string(),
                interface: interface.to_string(),
                tag: tag.to_string(),
                description: stored.description,
            });
        }
        Ok(())
    }

    /// Verify the number of interface writes
    pub fn assert_write_count(&self, expected: usize) -> VerifyResult<()> {
        let actual = self.fake.write_count();
        if actual != expected {
            return Err(VerificationError::CountMismatch {
                what: "interface writes",
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Verify that an element's interfaces were never fetched
    pub fn assert_not_fetched(&self, element: &str) -> VerifyResult<()> {
        let fetched = self.fake.calls().iter().any(|call| {
            matches!(call, ControllerCall::ListInterfaces { element_id, .. } if element_id == element)
        });
        if fetched {
            return Err(VerificationError::UnexpectedFetch {
                element: element.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::interface_fixtures;

    #[test]
    fn test_tag_assertions() {
        let fake = FakeController::new()
            .with_interface("e1", interface_fixtures::controller("i1", "#serial:SN1 #x"));
        let verifier = ControllerVerifier::new(&fake);

        assert!(verifier.assert_tag_present("e1", "i1", "serial:SN1").is_ok());
        assert!(verifier.assert_tag_absent("e1", "i1", "serial:SN2").is_ok());
        assert!(matches!(
            verifier.assert_tag_present("e1", "i1", "y"),
            Err(VerificationError::TagMissing { .. })
        ));
        assert!(matches!(
            verifier.assert_tag_present("e1", "nope", "x"),
            Err(VerificationError::InterfaceNotFound { .. })
        ));
    }

    #[test]
    fn test_count_assertions() {
        let fake = FakeController::new();
        let verifier = ControllerVerifier::new(&fake);

        assert!(verifier.assert_write_count(0).is_ok());
        assert!(verifier.assert_not_fetched("e1").is_ok());

        let err = verifier.assert_write_count(1).unwrap_err();
        assert_eq!(err.to_string(), "Expected 1 interface writes, found 0");
    }
}
