use gcvi_proc_macros::{EnumAll, EnumDisplay, EnumFromStr};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay, EnumFromStr, EnumAll)]
enum Cable {
    Composite,
    SVideo,
    Component,
}

#[test]
fn all_lists_variants_in_order() {
    assert_eq!(Cable::ALL, [Cable::Composite, Cable::SVideo, Cable::Component]);
}

#[test]
fn display_uses_variant_names() {
    assert_eq!(Cable::SVideo.to_str(), "SVideo");
    assert_eq!(Cable::Component.to_string(), "Component");
}

#[test]
fn from_str_ignores_case() {
    assert_eq!(Cable::from_str("svideo"), Ok(Cable::SVideo));
    assert_eq!(Cable::from_str("COMPOSITE"), Ok(Cable::Composite));

    for cable in Cable::ALL {
        assert_eq!(cable.to_string().parse::<Cable>(), Ok(cable));
    }
}

#[test]
fn from_str_rejects_unknown_names() {
    assert_eq!(Cable::from_str("scart"), Err("invalid Cable string: 'scart'".into()));
}
