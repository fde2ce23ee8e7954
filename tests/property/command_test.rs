// tests/property/command_test.rs

//! Property-based tests for inbound line classification.

use proptest::prelude::*;
use spinelchat::core::ChatCommand;

proptest! {
    #[test]
    fn test_name_prefix_always_sets_name(name in ".{0,64}") {
        let line = format!("/name {name}");
        prop_assert_eq!(ChatCommand::parse(&line), ChatCommand::SetName(name));
    }

    #[test]
    fn test_list_clients_matches_any_case(mask in prop::collection::vec(any::<bool>(), 13)) {
        let line: String = "/list_clients"
            .chars()
            .zip(mask)
            .map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c })
            .collect();
        prop_assert_eq!(ChatCommand::parse(&line), ChatCommand::ListClients);
    }

    #[test]
    fn test_lines_without_command_prefix_are_messages(line in "[^/].{0,200}|") {
        prop_assert_eq!(ChatCommand::parse(&line), ChatCommand::Message(line.clone()));
    }

    #[test]
    fn test_parse_never_loses_the_text(line in ".{0,200}") {
        match ChatCommand::parse(&line) {
            ChatCommand::ListClients => prop_assert!(line.eq_ignore_ascii_case("/list_clients")),
            ChatCommand::SetName(name) => prop_assert_eq!(format!("/name {name}"), line),
            ChatCommand::Message(text) => prop_assert_eq!(text, line),
        }
    }
}
