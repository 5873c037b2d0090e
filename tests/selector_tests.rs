use ui_scenario_runner::browser::locator::Locator;
use ui_scenario_runner::engine::error::StepError;
use ui_scenario_runner::engine::selector::{SelectorKind, Target, resolve, resolve_str};

#[test]
fn each_kind_maps_to_its_query_strategy() {
    let cases = [
        (SelectorKind::Css, "div.card > a", "div.card > a"),
        (SelectorKind::Xpath, "//button[1]", "xpath=//button[1]"),
        (SelectorKind::Id, "login", "#login"),
        (SelectorKind::Text, "Sign in", "text=Sign in"),
        (SelectorKind::TestId, "save-btn", "[data-testid=\"save-btn\"]"),
    ];

    for (kind, selector, expected) in cases {
        assert_eq!(resolve(selector, kind).selector, expected, "kind {}", kind);
    }
}

#[test]
fn kind_names_parse_and_display() {
    for name in ["css", "xpath", "id", "text", "testId"] {
        let kind: SelectorKind = name.parse().expect("known kind");
        assert_eq!(kind.to_string(), name);
    }
    assert_eq!(SelectorKind::default(), SelectorKind::Css);
}

#[test]
fn unknown_kind_is_rejected() {
    let err = resolve_str("#a", "role").expect_err("unknown kind");
    assert!(matches!(err, StepError::UnsupportedSelectorKind(k) if k == "role"));

    let err = Target::parse("#a", Some("CSS")).expect_err("kinds are case-sensitive");
    assert!(matches!(err, StepError::UnsupportedSelectorKind(_)));
}

#[test]
fn target_defaults_to_css() {
    let target = Target::parse(".row", None).unwrap();
    assert_eq!(target, Target::css(".row"));
    assert_eq!(target.locator(), Locator::new(".row"));
}

#[test]
fn locator_index_replaces_and_scopes() {
    let base = Locator::new(".item");

    assert_eq!(base.nth(2).nth(0).nth, Some(0));
    assert_eq!(base.maybe_nth(None), base);
    assert_eq!(base.maybe_nth(Some(3)).to_string(), ".item >> nth=3");

    let child = base.nth(1).locate("input");
    assert_eq!(child.to_string(), ".item >> nth=1 >> input");
    assert_eq!(child.nth(0).to_string(), ".item >> nth=1 >> input >> nth=0");
}

#[test]
fn locator_serializes_for_the_bridge() {
    let locator = Locator::new(".row").nth(1).locate("button");

    let json = serde_json::to_value(&locator).unwrap();

    assert_eq!(
        json,
        serde_json::json!({ "selector": "button", "parent": { "selector": ".row", "nth": 1 } })
    );
}
