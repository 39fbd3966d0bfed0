//! Controller records consumed and written back by the synchronizer.
//!
//! Only the fields the synchronizer reads are modelled explicitly. Every
//! other field an interface carries is kept in [`Interface::extra`] so a
//! write-back sends the record exactly as it was read, apart from the
//! description.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known values used when deciding what to do with an element.
pub mod defaults {
    /// Site id the controller uses for elements that are not assigned.
    pub const UNASSIGNED_SITE_ID: &str = "1";

    /// Interface names that identify the management interface.
    pub const MANAGEMENT_INTERFACE_NAMES: [&str; 2] = ["controller", "controller 1"];

    /// Prefix of the serial hashtag body (without the leading `#`).
    pub const SERIAL_TAG_PREFIX: &str = "serial:";
}

/// A managed network element (appliance).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Element id, empty if the controller omitted it.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Site the element is assigned to.
    #[serde(default)]
    pub site_id: Option<String>,
    /// Hardware serial number.
    #[serde(default)]
    pub serial_number: Option<String>,
}

impl Element {
    /// Returns the name used in progress output, falling back to the id.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }

    /// Returns the serial number, treating an empty string as absent.
    pub fn serial(&self) -> Option<&str> {
        self.serial_number.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns the site id if the element is assigned to a real site.
    pub fn assigned_site(&self) -> Option<&str> {
        self.site_id
            .as_deref()
            .filter(|site| !site.is_empty() && *site != defaults::UNASSIGNED_SITE_ID)
    }

    /// Returns the serial hashtag body (`serial:<serial_number>`), if any.
    pub fn serial_hashtag(&self) -> Option<String> {
        self.serial()
            .map(|serial| format!("{}{}", defaults::SERIAL_TAG_PREFIX, serial))
    }
}

/// A network interface belonging to an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// Interface id, empty if the controller omitted it.
    #[serde(default)]
    pub id: String,
    /// Interface name (e.g., "controller 1").
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text description; the only field this tool changes.
    #[serde(default)]
    pub description: Option<String>,
    /// Remaining fields, passed through untouched on write-back.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Interface {
    /// Returns the interface name, or an empty string if unnamed.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Returns true if this is a management interface.
    pub fn is_management(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| defaults::MANAGEMENT_INTERFACE_NAMES.contains(&name))
    }
}

/// A record that carries a free-text description.
pub trait Described {
    /// Returns the description, `None` if absent or null.
    fn description(&self) -> Option<&str>;

    /// Replaces the description.
    fn set_description(&mut self, description: String);
}

impl Described for Interface {
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }
}

/// Collection envelope used by list endpoints (`{"items": [...]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct Items<T> {
    #[serde(default = "Option::default")]
    items: Option<Vec<T>>,
}

impl<T> Items<T> {
    /// Unwraps the list, treating a missing or null `items` as empty.
    pub fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}
