//! This bench builds a large FMEA tree and measures keeping the failure
//! RPNs consistent while ratings change.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use fmea_core::{FmeaTree, NodeId, NodeKind, RatingField};

/// Builds `subsystems × failures` failure paths, each with one rated
/// effect/cause pair. Returns the tree and the cause identifiers.
fn preseed_tree(subsystems: usize, failures: usize) -> (FmeaTree, Vec<NodeId>) {
    let mut tree = FmeaTree::new();
    let mut causes = Vec::with_capacity(subsystems * failures);

    for s in 0..subsystems {
        let subsystem = tree
            .add_node(tree.root(), &format!("Subsystem {s}"), NodeKind::SubSystem)
            .unwrap();
        let function = tree
            .add_node(subsystem, &format!("Function {s}"), NodeKind::Function)
            .unwrap();
        for f in 0..failures {
            let failure = tree
                .add_node(function, &format!("Failure {f}"), NodeKind::Failure)
                .unwrap();
            let effect = tree
                .add_node(failure, &format!("Effect {f}"), NodeKind::Effect)
                .unwrap();
            tree.update_rating(effect, RatingField::Severity, 5).unwrap();
            let cause = tree
                .add_node(effect, &format!("Cause {f}"), NodeKind::Cause)
                .unwrap();
            causes.push(cause);
        }
    }

    (tree, causes)
}

fn add_many(c: &mut Criterion) {
    c.bench_function("add many nodes", |b| {
        b.iter(|| preseed_tree(20, 20));
    });
}

fn update_ratings(c: &mut Criterion) {
    c.bench_function("update ratings", |b| {
        b.iter_batched(
            || preseed_tree(20, 20),
            |(mut tree, causes)| {
                for (i, cause) in causes.into_iter().enumerate() {
                    let value = u8::try_from(i % 10).unwrap() + 1;
                    tree.update_rating(cause, RatingField::Occurrence, value)
                        .unwrap();
                }
                tree
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, add_many, update_ratings);
criterion_main!(benches);
