//! Built-in identifiers excluded from data-flow uses.

use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Names the JavaScript/TypeScript frontend never treats as variables.
/// Injected into the builder so other frontends can supply their own set.
pub fn js_builtins() -> &'static BTreeSet<String> {
    static BUILTINS: OnceLock<BTreeSet<String>> = OnceLock::new();
    BUILTINS.get_or_init(|| {
        [
            "true", "false", "null", "undefined", "this", "super", "console", "Math", "Object",
            "Array", "String", "Number", "Boolean", "Error", "Promise", "JSON", "Date", "RegExp",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_contains_globals() {
        let builtins = js_builtins();
        assert!(builtins.contains("Math"));
        assert!(builtins.contains("undefined"));
        assert!(!builtins.contains("myVariable"));
    }
}
