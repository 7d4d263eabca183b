//! Property-based tests for MediaCollection merge semantics.
//!
//! Run with: cargo test -p ao-core --test collection_props

use proptest::prelude::*;

use ao_core::{MediaCollection, MediaItem, MediaKind};

/// Small url alphabet so generated batches overlap often.
fn item_strategy() -> impl Strategy<Value = MediaItem> {
    (0u8..12, prop::bool::ANY).prop_map(|(n, video)| {
        let kind = if video { MediaKind::Video } else { MediaKind::Image };
        MediaItem::prefilled(kind, format!("https://cdn.example/{n}"))
    })
}

fn batch_strategy() -> impl Strategy<Value = Vec<MediaItem>> {
    prop::collection::vec(item_strategy(), 0..10)
}

fn urls(c: &MediaCollection) -> Vec<String> {
    c.iter().map(|i| i.url.clone()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    /// Property: appending the same list twice equals appending it once.
    #[test]
    fn prop_append_is_idempotent(existing in batch_strategy(), incoming in batch_strategy()) {
        let mut once = MediaCollection::new();
        once.append(existing.clone());
        once.append(incoming.clone());

        let mut twice = once.clone();
        let added = twice.append(incoming);

        prop_assert_eq!(added, 0);
        prop_assert_eq!(once, twice);
    }

    /// Property: urls stay unique whatever is appended.
    #[test]
    fn prop_urls_are_unique(batches in prop::collection::vec(batch_strategy(), 1..5)) {
        let mut c = MediaCollection::new();
        for batch in batches {
            c.append(batch);
        }
        let mut seen = urls(&c);
        let len = seen.len();
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), len);
    }

    /// Property: existing items keep their relative order and stay at the front.
    #[test]
    fn prop_append_preserves_existing_order(existing in batch_strategy(), incoming in batch_strategy()) {
        let mut c = MediaCollection::new();
        c.append(existing);
        let before = urls(&c);

        c.append(incoming);
        let after = urls(&c);

        prop_assert!(after.len() >= before.len());
        prop_assert_eq!(&after[..before.len()], &before[..]);
    }

    /// Property: kind counts always add up to the collection length.
    #[test]
    fn prop_kind_counts_sum_to_len(batch in batch_strategy()) {
        let mut c = MediaCollection::new();
        c.append(batch);
        prop_assert_eq!(c.image_count() + c.video_count(), c.len());
    }
}
