use std::collections::HashMap;

use defense_arcade_core::{
    rules, BugCategory, Command, DefinitionId, EndReason, Event, SessionSnapshot, SpawnRefusal,
};
use defense_arcade_system_spawning::{
    BugCatalog, Config, SpawnTrigger, Spawning, CATALOG, CATALOG_SIZE,
};
use defense_arcade_world::{self as world, query, World};

fn running_session() -> SessionSnapshot {
    SessionSnapshot {
        score: 0,
        combo: 0,
        health: rules::MAX_HEALTH,
        remaining_bugs: rules::TOTAL_BUGS,
        spawned_count: 0,
        running: true,
        player: Some("ada".to_owned()),
        current_bug: None,
    }
}

#[test]
fn every_pass_draws_each_definition_once() {
    let mut catalog = BugCatalog::new(0x5eed);
    let passes = 4;
    let mut counts: HashMap<DefinitionId, usize> = HashMap::new();

    for _ in 0..passes * CATALOG_SIZE {
        *counts.entry(catalog.draw().id()).or_default() += 1;
    }

    assert_eq!(counts.len(), CATALOG_SIZE);
    assert!(counts.values().all(|count| *count == passes));
}

#[test]
fn a_single_pass_is_a_permutation() {
    let mut catalog = BugCatalog::new(99);
    let mut drawn: Vec<u16> = (0..CATALOG_SIZE).map(|_| catalog.draw().id().get()).collect();
    let shuffled = drawn.clone();
    drawn.sort_unstable();

    let expected: Vec<u16> = CATALOG.iter().map(|definition| definition.id().get()).collect();
    assert_eq!(drawn, expected);
    assert_ne!(shuffled, expected, "a seeded pass should not come out in catalog order");
}

#[test]
fn same_seed_produces_same_sequence() {
    let mut first = Spawning::new(Config::new(42));
    let mut second = Spawning::new(Config::new(42));
    let session = running_session();

    for _ in 0..20 {
        assert_eq!(
            first.try_spawn(&session, SpawnTrigger::Automatic),
            second.try_spawn(&session, SpawnTrigger::Automatic)
        );
    }
}

#[test]
fn spawns_use_valid_lanes_and_fixed_velocity() {
    let mut spawning = Spawning::new(Config::new(3));
    let session = running_session();

    for _ in 0..200 {
        match spawning.try_spawn(&session, SpawnTrigger::Automatic) {
            Ok(Some(Command::SpawnBug { lane, velocity, .. })) => {
                assert!(lane.is_valid());
                let expected = rules::GEOMETRY.production_boundary()
                    / rules::BUG_TRAVEL_TIME.as_secs_f32();
                assert!((velocity - expected).abs() < 1e-4);
            }
            other => panic!("unexpected spawn result: {other:?}"),
        }
    }
}

#[test]
fn nothing_spawns_while_a_bug_travels_or_the_session_is_stopped() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::BeginSession, &mut events);

    let mut spawning = Spawning::new(Config::new(1));
    let first = spawning
        .try_spawn(&query::session(&world), SpawnTrigger::Manual)
        .expect("pool is full")
        .expect("session is idle");
    world::apply(&mut world, first, &mut events);

    assert_eq!(
        spawning.try_spawn(&query::session(&world), SpawnTrigger::Manual),
        Ok(None)
    );

    world::apply(
        &mut world,
        Command::EndSession {
            reason: EndReason::TimeUp,
        },
        &mut events,
    );
    let mut stopped = query::session(&world);
    stopped.current_bug = None;
    assert_eq!(spawning.try_spawn(&stopped, SpawnTrigger::Manual), Ok(None));
}

#[test]
fn exhausted_pool_refuses_manual_requests_only() {
    let mut spawning = Spawning::new(Config::new(8));
    let mut session = running_session();
    session.remaining_bugs = 0;

    assert_eq!(
        spawning.try_spawn(&session, SpawnTrigger::Manual),
        Err(SpawnRefusal::NoBugsRemaining)
    );
    assert_eq!(
        spawning.try_spawn(&session, SpawnTrigger::Automatic),
        Ok(None)
    );
}

#[test]
fn remaining_bugs_drop_by_one_per_spawn_until_empty() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::BeginSession, &mut events);
    let mut spawning = Spawning::new(Config::new(17));

    for expected_remaining in (0..rules::TOTAL_BUGS).rev() {
        let command = spawning
            .try_spawn(&query::session(&world), SpawnTrigger::Automatic)
            .expect("automatic spawns never refuse")
            .expect("session ready for a bug");
        world::apply(&mut world, command, &mut events);

        let bug = query::current_bug(&world).expect("bug spawned");
        assert_eq!(query::session(&world).remaining_bugs, expected_remaining);
        world::apply(
            &mut world,
            Command::ResolveProductionHit { bug: bug.id },
            &mut events,
        );
    }

    let session = query::session(&world);
    assert_eq!(session.remaining_bugs, 0);
    assert_eq!(session.spawned_count, rules::TOTAL_BUGS);
    assert_eq!(
        spawning.try_spawn(&session, SpawnTrigger::Automatic),
        Ok(None)
    );
    assert_eq!(
        spawning.try_spawn(&session, SpawnTrigger::Manual),
        Err(SpawnRefusal::NoBugsRemaining)
    );
}

#[test]
fn handle_chains_a_spawn_after_the_session_begins() {
    let mut spawning = Spawning::new(Config::new(5));
    let session = running_session();
    let mut commands = Vec::new();

    spawning.handle(&[Event::SessionBegan], &session, &mut commands);
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], Command::SpawnBug { .. }));

    commands.clear();
    spawning.handle(&[Event::SessionReset], &session, &mut commands);
    assert!(commands.is_empty());
}

#[test]
fn drawn_categories_match_catalog_layout() {
    let mut catalog = BugCatalog::new(12);
    for _ in 0..CATALOG_SIZE {
        let definition = catalog.draw();
        let index = usize::from(definition.id().get());
        let expected = match index {
            0..=24 => BugCategory::Unit,
            25..=49 => BugCategory::Contract,
            _ => BugCategory::Integration,
        };
        assert_eq!(definition.category(), expected);
    }
}
