mod support;

use lending_engine::{
    Counts, EngineError, Polarity, ReactionChanged, SetOutcome, REACTION_CLEARED, REACTION_SET,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use support::{engine, published_item};

#[test]
fn first_reaction_increments_counter() {
    let engine = engine();
    let item = published_item(&engine, "owner-1", "Dune");

    let outcome = engine
        .reactions()
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();

    assert_eq!(outcome, SetOutcome::Applied(Counts { likes: 1, dislikes: 0 }));
    assert_eq!(
        engine.reactions().get_reaction("reader-a", &item.id).unwrap(),
        Some(Polarity::Like)
    );
}

#[test]
fn same_polarity_is_idempotent() {
    let engine = engine();
    let item = published_item(&engine, "owner-1", "Dune");

    engine
        .reactions()
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();
    let outcome = engine
        .reactions()
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();

    assert_eq!(
        outcome,
        SetOutcome::AlreadySet(Counts { likes: 1, dislikes: 0 })
    );
    assert_eq!(
        engine.reactions().tally(&item.id).unwrap(),
        Counts { likes: 1, dislikes: 0 }
    );
}

#[test]
fn flip_moves_one_count_between_counters() {
    let engine = engine();
    let item = published_item(&engine, "owner-1", "Dune");

    engine
        .reactions()
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();
    let outcome = engine
        .reactions()
        .set_reaction("reader-a", &item.id, Polarity::Dislike)
        .unwrap();

    assert_eq!(outcome, SetOutcome::Applied(Counts { likes: 0, dislikes: 1 }));
}

#[test]
fn like_dislike_clear_scenario() {
    let engine = engine();
    let item = published_item(&engine, "owner-1", "Dune");
    let reactions = engine.reactions();

    reactions
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();
    assert_eq!(reactions.tally(&item.id).unwrap(), Counts { likes: 1, dislikes: 0 });

    reactions
        .set_reaction("reader-a", &item.id, Polarity::Dislike)
        .unwrap();
    assert_eq!(reactions.tally(&item.id).unwrap(), Counts { likes: 0, dislikes: 1 });

    reactions.clear_reaction("reader-a", &item.id).unwrap();
    assert_eq!(reactions.tally(&item.id).unwrap(), Counts { likes: 0, dislikes: 0 });
    assert_eq!(reactions.get_reaction("reader-a", &item.id).unwrap(), None);
}

#[test]
fn clear_then_set_reproduces_counts() {
    let engine = engine();
    let item = published_item(&engine, "owner-1", "Dune");
    let reactions = engine.reactions();

    reactions
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();
    reactions
        .set_reaction("reader-b", &item.id, Polarity::Dislike)
        .unwrap();
    let before = reactions.tally(&item.id).unwrap();

    reactions.clear_reaction("reader-a", &item.id).unwrap();
    reactions
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();

    assert_eq!(reactions.tally(&item.id).unwrap(), before);
}

#[test]
fn clear_absent_reaction_is_a_noop() {
    let engine = engine();
    let item = published_item(&engine, "owner-1", "Dune");

    let counts = engine
        .reactions()
        .clear_reaction("reader-a", &item.id)
        .unwrap();
    assert_eq!(counts, Counts::default());
}

#[test]
fn no_reader_counts_toward_both_polarities() {
    let engine = engine();
    let item = published_item(&engine, "owner-1", "Dune");
    let reactions = engine.reactions();

    // Churn one reader through every transition; net contribution stays <= 1.
    for polarity in [
        Polarity::Like,
        Polarity::Dislike,
        Polarity::Like,
        Polarity::Like,
        Polarity::Dislike,
    ] {
        let counts = reactions
            .set_reaction("reader-a", &item.id, polarity)
            .unwrap()
            .counts();
        assert_eq!(counts.likes + counts.dislikes, 1);
    }
}

#[test]
fn tally_matches_number_of_stored_reactions() {
    let engine = engine();
    let item = published_item(&engine, "owner-1", "Dune");
    let reactions = engine.reactions();

    reactions
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();
    reactions
        .set_reaction("reader-b", &item.id, Polarity::Like)
        .unwrap();
    reactions
        .set_reaction("reader-c", &item.id, Polarity::Dislike)
        .unwrap();
    reactions.clear_reaction("reader-b", &item.id).unwrap();

    let counts = reactions.tally(&item.id).unwrap();
    assert_eq!(counts.likes + counts.dislikes, 2);
    assert_eq!(counts, Counts { likes: 1, dislikes: 1 });
}

#[test]
fn reacting_to_missing_item_fails() {
    let engine = engine();
    let err = engine
        .reactions()
        .set_reaction("reader-a", "item-404", Polarity::Like)
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[test]
fn blank_ids_are_rejected() {
    let engine = engine();
    let err = engine
        .reactions()
        .set_reaction("", "item-1", Polarity::Like)
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn reaction_events_fire_on_change_but_not_on_noop() {
    let engine = engine();
    let item = published_item(&engine, "owner-1", "Dune");

    let set_count = Arc::new(AtomicUsize::new(0));
    let cleared_count = Arc::new(AtomicUsize::new(0));

    let set_clone = set_count.clone();
    engine.events().on(REACTION_SET, move |data: String| {
        let payload: ReactionChanged = serde_json::from_str(&data).unwrap();
        assert_eq!(payload.reader_id, "reader-a");
        set_clone.fetch_add(1, Ordering::SeqCst);
    });
    let cleared_clone = cleared_count.clone();
    engine.events().on(REACTION_CLEARED, move |_data: String| {
        cleared_clone.fetch_add(1, Ordering::SeqCst);
    });

    let reactions = engine.reactions();
    reactions
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();
    // idempotent repeat: no event
    reactions
        .set_reaction("reader-a", &item.id, Polarity::Like)
        .unwrap();
    reactions
        .set_reaction("reader-a", &item.id, Polarity::Dislike)
        .unwrap();
    reactions.clear_reaction("reader-a", &item.id).unwrap();
    // clearing again: no event
    reactions.clear_reaction("reader-a", &item.id).unwrap();

    assert_eq!(set_count.load(Ordering::SeqCst), 2);
    assert_eq!(cleared_count.load(Ordering::SeqCst), 1);
}
