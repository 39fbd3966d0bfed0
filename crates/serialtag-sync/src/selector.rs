//! Management interface selection.

use serialtag_common::Interface;

/// Picks the management interface ("controller" or "controller 1").
///
/// Names are matched exactly and case-sensitively. When several interfaces
/// match, the last one in list order is returned.
pub fn select_management_interface<I>(interfaces: I) -> Option<Interface>
where
    I: IntoIterator<Item = Interface>,
{
    let mut selected = None;
    for interface in interfaces {
        if interface.is_management() {
            selected = Some(interface);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(id: &str, name: &str) -> Interface {
        Interface {
            id: id.to_string(),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_selects_controller() {
        let list = vec![iface("1", "1"), iface("2", "controller"), iface("3", "2")];
        assert_eq!(select_management_interface(list).unwrap().id, "2");
    }

    #[test]
    fn test_selects_controller_1() {
        let list = vec![iface("1", "controller 1"), iface("2", "internet 1")];
        assert_eq!(select_management_interface(list).unwrap().id, "1");
    }

    #[test]
    fn test_last_match_wins() {
        let list = vec![
            iface("1", "controller 1"),
            iface("2", "lan"),
            iface("3", "controller"),
        ];
        assert_eq!(select_management_interface(list).unwrap().id, "3");

        let reversed = vec![iface("3", "controller"), iface("1", "controller 1")];
        assert_eq!(select_management_interface(reversed).unwrap().id, "1");
    }

    #[test]
    fn test_no_match() {
        let list = vec![iface("1", "Controller"), iface("2", "controller 2")];
        assert!(select_management_interface(list).is_none());
        assert!(select_management_interface(Vec::new()).is_none());
    }

    #[test]
    fn test_unnamed_interface_is_ignored() {
        let unnamed = Interface {
            id: "9".to_string(),
            ..Default::default()
        };
        assert!(select_management_interface(vec![unnamed]).is_none());
    }
}
