//! Snapshot isolation: clones observe the state at the moment of cloning
//! and evolve independently, including when the two sides mutate from
//! different threads at the same time.

use std::thread;

use cowtree::{BTree, SharedBTree};

fn tree_of(n: u64) -> BTree<u64> {
    let mut tree = BTree::new(|a: &u64, b: &u64| a < b);
    for i in 0..n {
        tree.set(i);
    }
    tree
}

#[test]
fn snapshots_diverge_in_one_thread() {
    let mut a = tree_of(10_000);
    let mut b = a.clone();

    for i in 0..5_000 {
        a.delete(&i);
    }
    b.set(1_000_000);

    assert_eq!(a.len(), 5_000);
    assert_eq!(b.len(), 10_001);
    assert_eq!(a.min(), Some(&5_000));
    assert_eq!(b.min(), Some(&0));
    a.check().unwrap();
    b.check().unwrap();
}

#[test]
fn chained_snapshots_stay_independent() {
    let mut generations = vec![tree_of(1000)];
    for g in 0..5 {
        let mut next = generations[g].clone();
        for i in (0..1000).filter(|i| i % (g as u64 + 2) == 0) {
            next.delete(&i);
        }
        generations.push(next);
    }
    // the original never changed
    assert_eq!(generations[0].len(), 1000);
    for tree in &generations {
        tree.check().unwrap();
    }
}

#[test]
fn concurrent_divergence_even_odd() {
    let n = 100_000u64;
    let mut a = tree_of(n);
    let mut b = a.clone();

    let handle = thread::spawn(move || {
        for i in (0..n).filter(|i| i % 2 == 1) {
            assert_eq!(b.delete(&i), Some(i));
        }
        b
    });
    for i in (0..n).filter(|i| i % 2 == 0) {
        assert_eq!(a.delete(&i), Some(i));
    }
    let b = handle.join().unwrap();

    assert_eq!(a.len(), (n / 2) as usize);
    assert_eq!(b.len(), (n / 2) as usize);

    let mut odds = Vec::new();
    a.scan(|&i| {
        odds.push(i);
        true
    });
    assert!(odds.iter().all(|i| i % 2 == 1));
    assert_eq!(odds.len(), (n / 2) as usize);

    let mut evens = Vec::new();
    b.scan(|&i| {
        evens.push(i);
        true
    });
    assert!(evens.iter().all(|i| i % 2 == 0));
    assert_eq!(evens.len(), (n / 2) as usize);

    a.check().unwrap();
    b.check().unwrap();
}

#[test]
fn many_concurrent_snapshot_writers() {
    let base = tree_of(10_000);
    let mut workers = Vec::new();
    for t in 0..8u64 {
        let mut snap = base.clone();
        workers.push(thread::spawn(move || {
            for i in (t * 1000)..(t * 1000 + 1000) {
                snap.delete(&i);
                snap.set(1_000_000 + t * 1000 + i);
            }
            snap.check().unwrap();
            snap.len()
        }));
    }
    for worker in workers {
        assert_eq!(worker.join().unwrap(), 10_000);
    }
    assert_eq!(base.len(), 10_000);
    base.check().unwrap();
}

#[test]
fn shared_tree_snapshot_isolation() {
    let shared = SharedBTree::new(|a: &u64, b: &u64| a < b);
    for i in 0..10_000 {
        shared.set(i);
    }
    let snapshot = shared.snapshot();

    let writer = {
        let shared = shared.clone();
        thread::spawn(move || {
            for i in 0..10_000 {
                shared.delete(&i);
            }
        })
    };

    // the snapshot is untouched no matter how the race interleaves
    for i in 0..10_000 {
        assert_eq!(snapshot.get(&i), Some(i));
    }
    writer.join().unwrap();
    assert!(shared.is_empty());
    assert_eq!(snapshot.len(), 10_000);
}
