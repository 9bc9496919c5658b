//! Parse cache behavior under concurrent use

use crate::common::sample_scripts::*;
use ccassist::{FactoryPattern, ParseCache, match_declaration};
use std::path::Path;
use std::sync::Arc;
use std::thread;

#[test]
fn test_lookup_of_one_file_while_another_reparses() {
    let cache = Arc::new(ParseCache::new());
    let a = Path::new("/p/assets/A.js");
    let b = Path::new("/p/assets/B.js");
    cache.on_file_touched(b, PLAYER);

    thread::scope(|scope| {
        let writer = {
            let cache = cache.clone();
            scope.spawn(move || {
                for i in 0..50 {
                    let content = if i % 2 == 0 { PLAYER } else { EXPRESSION_FORM };
                    cache.on_file_touched(a, content);
                }
            })
        };

        for _ in 0..50 {
            let entry = cache.get(b).expect("B stays cached");
            let decl = match_declaration(&entry.tree, &FactoryPattern::default())
                .unwrap()
                .unwrap();
            assert_eq!(decl.methods.len(), 3);
        }

        writer.join().unwrap();
    });

    assert_eq!(cache.len(), 2);
}

#[test]
fn test_entries_are_whole_snapshots() {
    let cache = Arc::new(ParseCache::new());
    let path = Path::new("/p/assets/Flip.js");
    cache.on_file_touched(path, PLAYER);

    thread::scope(|scope| {
        let cache_w = cache.clone();
        scope.spawn(move || {
            for i in 0..100 {
                let content = if i % 2 == 0 { EXPRESSION_FORM } else { PLAYER };
                cache_w.on_file_touched(path, content);
            }
        });

        for _ in 0..100 {
            let entry = cache.get(path).unwrap();
            let decl = match_declaration(&entry.tree, &FactoryPattern::default())
                .unwrap()
                .unwrap();
            // tree and comments always come from the same parse
            match decl.methods.len() {
                3 => assert_eq!(entry.comments.len(), 5),
                1 => assert!(entry.comments.is_empty()),
                n => panic!("unexpected method count {n}"),
            }
        }
    });
}
