//! Tests for #[derive(Action)] macro

use todomvc_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum ListAction {
    #[intent]
    AddItem { title: String },

    #[intent]
    ClearCompleted,

    #[intent]
    Rename(u64, String),

    #[outcome]
    ItemAdded { id: u64, title: String },

    #[outcome]
    CompletedCleared,

    #[outcome]
    RequestFailed(String),

    Unclassified,
}

#[test]
fn test_is_intent() {
    let action = ListAction::AddItem {
        title: "Test".to_string(),
    };
    assert!(action.is_intent());
    assert!(!action.is_outcome());
}

#[test]
fn test_is_outcome() {
    let action = ListAction::ItemAdded {
        id: 1,
        title: "Test".to_string(),
    };
    assert!(!action.is_intent());
    assert!(action.is_outcome());
}

#[test]
fn test_unit_and_tuple_variants() {
    assert!(ListAction::ClearCompleted.is_intent());
    assert!(ListAction::Rename(1, "x".to_string()).is_intent());
    assert!(ListAction::CompletedCleared.is_outcome());
    assert!(ListAction::RequestFailed("boom".to_string()).is_outcome());
}

#[test]
fn test_unmarked_variant_is_neither() {
    let action = ListAction::Unclassified;
    assert!(!action.is_intent());
    assert!(!action.is_outcome());
}

#[test]
fn test_names_match_variants() {
    let cases = vec![
        (
            ListAction::AddItem {
                title: "a".to_string(),
            },
            "AddItem",
        ),
        (ListAction::ClearCompleted, "ClearCompleted"),
        (ListAction::Rename(2, "b".to_string()), "Rename"),
        (
            ListAction::ItemAdded {
                id: 3,
                title: "c".to_string(),
            },
            "ItemAdded",
        ),
        (ListAction::RequestFailed("e".to_string()), "RequestFailed"),
        (ListAction::Unclassified, "Unclassified"),
    ];

    for (action, expected) in cases {
        assert_eq!(action.name(), expected);
    }
}
