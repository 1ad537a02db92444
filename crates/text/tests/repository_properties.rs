use proptest::prelude::*;
use std::sync::Arc;
use text::{LimitedSizeCacheTextRepository, TextRepository, text_len};

const UNREMOVABLE: &[&str] = &["html", "body", "\n  "];

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{0,6}",
        "[a-zA-Z0-9 :-]{1,12}",
        "[ \t\n]{1,4}",
        // Non-BMP chars count as two units.
        "[a-z\u{1F600}-\u{1F64F}]{1,4}",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn size_never_exceeds_budget(
        max in 12usize..80,
        texts in prop::collection::vec(text_strategy(), 1..120),
    ) {
        let repo = LimitedSizeCacheTextRepository::new(max, UNREMOVABLE);
        for text in &texts {
            let interned = repo.intern(text);
            prop_assert_eq!(&*interned, text.as_str());
            let stats = repo.stats();
            prop_assert!(
                stats.size_in_chars <= stats.max_size_in_chars,
                "size {} over max {}", stats.size_in_chars, stats.max_size_in_chars
            );
            for unremovable in UNREMOVABLE {
                prop_assert!(repo.contains(unremovable));
            }
        }
        let snapshot = repo.snapshot();
        let total: usize = snapshot.iter().map(|t| text_len(t)).sum();
        prop_assert_eq!(total, repo.stats().size_in_chars);
        let prefix: Vec<&str> = snapshot[..UNREMOVABLE.len()].iter().map(|t| &**t).collect();
        prop_assert_eq!(prefix, UNREMOVABLE.to_vec());
    }

    #[test]
    fn stored_texts_are_unique_and_stable(
        texts in prop::collection::vec("[a-d]{1,3}", 1..60),
    ) {
        let repo = LimitedSizeCacheTextRepository::new(10_000, &[] as &[&str]);
        let first: Vec<Arc<str>> = texts.iter().map(|t| repo.intern(t)).collect();
        for (text, stored) in texts.iter().zip(&first) {
            prop_assert!(Arc::ptr_eq(stored, &repo.intern(text)));
        }
        let mut snapshot: Vec<String> = repo.snapshot().iter().map(|t| t.to_string()).collect();
        let before = snapshot.len();
        snapshot.sort();
        snapshot.dedup();
        prop_assert_eq!(before, snapshot.len());
    }
}

#[test]
fn eviction_follows_arrival_order_not_reads() {
    // Distinct lengths make every eviction observable through the size.
    let repo = LimitedSizeCacheTextRepository::new(15, &[] as &[&str]);
    repo.intern("a");
    repo.intern("bb");
    repo.intern("ccc");
    repo.intern("dddd");
    repo.intern("eeeee");
    assert_eq!(repo.stats().size_in_chars, 15);

    // Reads do not refresh an entry.
    repo.intern("a");
    repo.intern("a");

    repo.intern("ffffff");
    let texts: Vec<String> = repo.snapshot().iter().map(|t| t.to_string()).collect();
    assert_eq!(texts, ["dddd", "eeeee", "ffffff"]);

    assert!(repo.remove_oldest());
    let texts: Vec<String> = repo.snapshot().iter().map(|t| t.to_string()).collect();
    assert_eq!(texts, ["eeeee", "ffffff"]);
    assert_eq!(repo.stats().size_in_chars, 11);
}

#[test]
fn parallel_mixed_workload_keeps_budget() {
    let repo = Arc::new(LimitedSizeCacheTextRepository::new(64, &["div", "span"]));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let repo = Arc::clone(&repo);
            std::thread::spawn(move || {
                for i in 0..500 {
                    let text = format!("w{}-{}", t % 3, i % 37);
                    assert_eq!(&*repo.intern(&text), text);
                    assert_eq!(&*repo.intern_parts(&["w", &text[1..]]), text);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }
    let stats = repo.stats();
    assert!(stats.size_in_chars <= 64);
    assert!(repo.contains("div") && repo.contains("span"));
}
