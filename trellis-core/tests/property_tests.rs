//! Property tests: the graph invariants hold under arbitrary edit sequences.

use proptest::prelude::*;
use trellis_core::{
    EntityGraph, EntityId, RelationId, RelationRegistry, Target, TemplateRegistry,
};

#[derive(Debug, Clone)]
enum Op {
    Add(usize, usize, usize),
    Remove(usize, usize, usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    // 4 entities, 3 relations, targets 0..4 are entities and 4..6 literals.
    (any::<bool>(), 0..4usize, 0..3usize, 0..6usize).prop_map(|(add, s, r, t)| {
        if add {
            Op::Add(s, r, t)
        } else {
            Op::Remove(s, r, t)
        }
    })
}

struct World {
    relations: RelationRegistry,
    graph: EntityGraph,
    entities: Vec<EntityId>,
    rel_ids: Vec<RelationId>,
}

fn world() -> World {
    let mut templates = TemplateRegistry::new();
    let thing = templates.register("Thing", "", &[]).unwrap();

    let mut relations = RelationRegistry::new();
    let forward = relations
        .define(&templates, "governs", "", &[thing.clone()], &[thing.clone()], None, None)
        .unwrap();
    let backward = relations
        .define(
            &templates,
            "governedBy",
            "",
            &[thing.clone()],
            &[thing.clone()],
            Some(&forward),
            None,
        )
        .unwrap();
    let plain = relations
        .define(&templates, "hasNote", "", &[thing.clone()], &[], None, None)
        .unwrap();

    let mut graph = EntityGraph::new();
    let entities: Vec<EntityId> = (0..4)
        .map(|i| graph.create_entity(&templates, &thing, &format!("e{}", i)).unwrap())
        .collect();

    World {
        relations,
        graph,
        entities,
        rel_ids: vec![forward, backward, plain],
    }
}

fn target_for(world: &World, t: usize) -> Target {
    if t < 4 {
        Target::Entity(world.entities[t].clone())
    } else {
        Target::Literal(format!("note{}", t))
    }
}

/// Check the structural invariants after an edit sequence.
fn assert_invariants(world: &World) {
    for entity in world.graph.entities() {
        for (relation, bucket) in &entity.edges {
            // Invariant 4: a bucket is never left empty.
            assert!(!bucket.is_empty(), "empty bucket for {}", relation);

            let inverse = world.relations.get(relation).unwrap().inverse.clone();
            for target in bucket {
                match (&inverse, target.as_entity()) {
                    // Invariant 3: mirrored edge exists for entity targets.
                    (Some(inv), Some(target_id)) => {
                        assert!(
                            world.graph.has_edge(
                                target_id,
                                inv,
                                &Target::Entity(entity.id.clone())
                            ),
                            "missing mirror of ({}, {}, {})",
                            entity.id,
                            relation,
                            target_id
                        );
                    }
                    // Invariant 6: literals never take part in inverse sync.
                    _ => {}
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_invariants_hold_under_random_edits(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut world = world();

        for op in ops {
            match op {
                Op::Add(s, r, t) => {
                    let source = world.entities[s].clone();
                    let relation = world.rel_ids[r].clone();
                    let target = target_for(&world, t);
                    world.graph.add_edge(&world.relations, &source, &relation, &target).unwrap();
                }
                Op::Remove(s, r, t) => {
                    let source = world.entities[s].clone();
                    let relation = world.rel_ids[r].clone();
                    let target = target_for(&world, t);
                    world.graph.remove_edge(&world.relations, &source, &relation, &target).unwrap();
                }
            }
            assert_invariants(&world);
        }
    }

    #[test]
    fn prop_add_is_idempotent(s in 0..4usize, r in 0..3usize, t in 0..6usize, repeats in 1..5usize) {
        let mut world = world();
        let source = world.entities[s].clone();
        let relation = world.rel_ids[r].clone();
        let target = target_for(&world, t);

        for _ in 0..repeats {
            world.graph.add_edge(&world.relations, &source, &relation, &target).unwrap();
        }
        let after_adds = world.graph.edge_count();

        // One more add changes nothing.
        world.graph.add_edge(&world.relations, &source, &relation, &target).unwrap();
        prop_assert_eq!(world.graph.edge_count(), after_adds);

        // A single remove erases the edge (and its mirror) completely.
        world.graph.remove_edge(&world.relations, &source, &relation, &target).unwrap();
        prop_assert_eq!(world.graph.edge_count(), 0);
        assert_invariants(&world);
    }
}
