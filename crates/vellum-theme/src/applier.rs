//! Painting primitives over a [`RenderTarget`].
//!
//! All three operations are idempotent and order-independent across disjoint
//! names, so a reconciliation that replays them converges instead of
//! compounding.

use vellum_tokens::TokenSet;

use crate::target::RenderTarget;

/// Set every token in `tokens` on the target.
///
/// Tokens absent from the set are left alone; clearing is [`retract`]'s job.
pub fn apply(target: &dyn RenderTarget, tokens: &TokenSet) {
    for (name, value) in tokens.iter() {
        target.set_token(name, value);
    }
}

/// Remove exactly the named tokens from the target.
pub fn retract<'a>(target: &dyn RenderTarget, names: impl IntoIterator<Item = &'a str>) {
    for name in names {
        target.remove_token(name);
    }
}

/// Swap root classes: remove every candidate, then add the new set.
///
/// `remove_candidates` must be the full universe of class names any theme
/// could have applied; removing only "the previous" class is how residue
/// creeps in when observers disagree about what the previous class was.
/// Names in both sets end up present.
pub fn toggle_classes<'a>(
    target: &dyn RenderTarget,
    add: impl IntoIterator<Item = &'a str>,
    remove_candidates: impl IntoIterator<Item = &'a str>,
) {
    for name in remove_candidates {
        target.remove_class(name);
    }
    for name in add {
        target.add_class(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::InMemoryRenderTarget;

    fn sample_tokens() -> TokenSet {
        [
            ("--background", "hsl(225 27% 15%)"),
            ("--foreground", "hsl(220 14% 85%)"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_apply_sets_only_present_tokens() {
        let target = InMemoryRenderTarget::new();
        target.set_token("--accent", "330 100% 65%");

        apply(&target, &sample_tokens());

        assert_eq!(target.tokens().len(), 3);
        assert_eq!(target.token("--accent").as_deref(), Some("330 100% 65%"));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let target = InMemoryRenderTarget::new();
        apply(&target, &sample_tokens());
        let first = target.tokens();
        apply(&target, &sample_tokens());
        assert_eq!(target.tokens(), first);
    }

    #[test]
    fn test_retract_removes_exactly_the_named() {
        let target = InMemoryRenderTarget::new();
        apply(&target, &sample_tokens());

        retract(&target, ["--background"]);

        assert!(target.token("--background").is_none());
        assert!(target.token("--foreground").is_some());
    }

    #[test]
    fn test_toggle_removes_candidates_before_adding() {
        let target = InMemoryRenderTarget::new();
        target.add_class("dracula");
        target.add_class("stale");

        toggle_classes(&target, ["nord"], ["dracula", "nord", "stale"]);

        assert!(target.has_class("nord"));
        assert!(!target.has_class("dracula"));
        assert!(!target.has_class("stale"));
    }

    #[test]
    fn test_full_retraction_leaves_no_residue() {
        let target = InMemoryRenderTarget::new();
        let mut tokens = sample_tokens();
        tokens.set("--mystery-token", "1 2% 3%");
        apply(&target, &tokens);

        let names: Vec<&str> = tokens.names().collect();
        retract(&target, names);

        assert!(target.tokens().is_empty());
    }
}
