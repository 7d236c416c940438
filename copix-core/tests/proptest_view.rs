use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use copix_core::testing::{ManualClock, RecordingClipboard, ScriptedImageService};
use copix_core::{CopixError, NameEntry, NameListManager};
use proptest::prelude::*;

fn manager_with_clock() -> (NameListManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let manager = NameListManager::new(
        Arc::new(ScriptedImageService::new()),
        Arc::new(RecordingClipboard::new()),
    )
    .with_clock(clock.clone());
    (manager, clock)
}

// Non-blank names; surrounding whitespace is allowed and must be trimmed
fn arb_name() -> impl Strategy<Value = String> {
    ("[ \t]{0,2}", "[A-Za-z][A-Za-z .'-]{0,15}", "[ \t]{0,2}")
        .prop_map(|(pre, body, post)| format!("{pre}{body}{post}"))
}

/// One step of the add flow: name, seconds the clock moves first (may go
/// backwards), and whether to favorite the new entry
fn arb_step() -> impl Strategy<Value = (String, i64, bool)> {
    (arb_name(), -30i64..120, any::<bool>())
}

fn assert_display_order(view: &[NameEntry]) -> Result<(), TestCaseError> {
    let first_plain = view.iter().position(|e| !e.is_favorite).unwrap_or(view.len());
    prop_assert!(view[first_plain..].iter().all(|e| !e.is_favorite));

    for pair in view.windows(2) {
        if pair[0].is_favorite == pair[1].is_favorite {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
    Ok(())
}

proptest! {
    /// Property: one entry per completed add, each with a unique id
    #[test]
    fn prop_each_add_yields_one_unique_entry(names in prop::collection::vec(arb_name(), 0..40)) {
        let (mut manager, _) = manager_with_clock();

        for name in &names {
            manager.add_name(name).unwrap();
            let entry = manager.skip_image().unwrap();
            prop_assert_eq!(&entry.name, name.trim());
        }

        let view = manager.view();
        prop_assert_eq!(view.len(), names.len());
        let ids: HashSet<_> = view.iter().map(|e| e.id).collect();
        prop_assert_eq!(ids.len(), names.len());
    }

    /// Property: favorites precede non-favorites, newest first within each group
    #[test]
    fn prop_view_is_sorted(steps in prop::collection::vec(arb_step(), 0..40)) {
        let (mut manager, clock) = manager_with_clock();

        for (name, shift, favorite) in &steps {
            clock.advance(Duration::seconds(*shift));
            manager.add_name(name).unwrap();
            let entry = manager.skip_image().unwrap();
            if *favorite {
                manager.toggle_favorite(entry.id).unwrap();
            }
        }

        let view = manager.view();
        assert_display_order(&view)?;

        // idempotent without intervening mutation
        prop_assert_eq!(manager.view(), view);
    }

    /// Property: toggling twice restores the flag and nothing else moves
    #[test]
    fn prop_toggle_favorite_is_involution(
        steps in prop::collection::vec(arb_step(), 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut manager, clock) = manager_with_clock();
        for (name, shift, favorite) in &steps {
            clock.advance(Duration::seconds(*shift));
            manager.add_name(name).unwrap();
            let entry = manager.skip_image().unwrap();
            if *favorite {
                manager.toggle_favorite(entry.id).unwrap();
            }
        }

        let before = manager.view();
        let target = before[pick.index(before.len())].id;

        manager.toggle_favorite(target).unwrap();
        manager.toggle_favorite(target).unwrap();

        prop_assert_eq!(manager.view(), before);
    }

    /// Property: blank renames never mutate
    #[test]
    fn prop_blank_rename_rejected(name in arb_name(), blank in "[ \t\n]{0,6}") {
        let (mut manager, _) = manager_with_clock();
        manager.add_name(&name).unwrap();
        let entry = manager.skip_image().unwrap();

        prop_assert_eq!(manager.rename(entry.id, &blank), Err(CopixError::InvalidInput));
        prop_assert_eq!(manager.get(entry.id), Some(&entry));
    }

    /// Property: removed ids never come back, repeated removal is a no-op
    #[test]
    fn prop_remove_is_final(
        names in prop::collection::vec(arb_name(), 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut manager, _) = manager_with_clock();
        let mut ids = Vec::new();
        for name in &names {
            manager.add_name(name).unwrap();
            ids.push(manager.skip_image().unwrap().id);
        }

        let target = ids[pick.index(ids.len())];
        prop_assert!(manager.remove(target).is_some());
        prop_assert!(manager.remove(target).is_none());

        let view = manager.view();
        prop_assert_eq!(view.len(), names.len() - 1);
        prop_assert!(view.iter().all(|e| e.id != target));
    }
}
