use std::time::Duration;

use defense_arcade_core::{
    BugCategory, BugDefinition, Command, DefinitionId, Event, LaneIndex,
};
use defense_arcade_system_movement::Movement;
use defense_arcade_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(16);

fn running_world(category: BugCategory) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::BeginSession, &mut events);
    world::apply(
        &mut world,
        Command::SpawnBug {
            definition: BugDefinition::new(DefinitionId::new(3), "GST calc wrong", category),
            lane: LaneIndex::new(2),
            velocity: 50.0,
        },
        &mut events,
    );
    world
}

fn run_frame(world: &mut World, movement: &mut Movement, now: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: FRAME, now }, &mut events);

    let mut commands = Vec::new();
    movement.handle(
        &events,
        &query::session(world),
        &query::gate_view(world),
        &mut commands,
    );

    let mut resolved = Vec::new();
    for command in commands {
        world::apply(world, command, &mut resolved);
    }
    events.extend(resolved);
    events
}

fn run_until<F>(world: &mut World, movement: &mut Movement, mut done: F) -> (Duration, Vec<Event>)
where
    F: FnMut(&Event) -> bool,
{
    let mut now = Duration::ZERO;
    for _ in 0..2_000 {
        now += FRAME;
        let events = run_frame(world, movement, now);
        if events.iter().any(&mut done) {
            return (now, events);
        }
    }
    panic!("condition never met");
}

#[test]
fn unblocked_bug_reaches_production_after_travel_time() {
    let mut world = running_world(BugCategory::Unit);
    let mut movement = Movement::default();

    let (now, events) = run_until(&mut world, &mut movement, |event| {
        matches!(event, Event::ProductionHit { .. })
    });

    let seconds = now.as_secs_f32();
    assert!((14.9..=15.1).contains(&seconds), "arrived after {seconds}s");
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProductionHit { health: 80, .. })));
    assert!(query::current_bug(&world).is_none());
}

#[test]
fn matching_gate_intercepts_before_production() {
    let mut world = running_world(BugCategory::Contract);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceGate {
            category: BugCategory::Contract,
            lane: LaneIndex::new(2),
            offset: 300.0,
        },
        &mut events,
    );
    let mut movement = Movement::default();

    let (now, events) = run_until(&mut world, &mut movement, |event| {
        matches!(event, Event::BugIntercepted { .. })
    });

    let seconds = now.as_secs_f32();
    assert!((5.7..=5.8).contains(&seconds), "intercepted after {seconds}s");
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::BugIntercepted { reward: 170, .. })));
}

#[test]
fn wrong_gate_freezes_the_bug_for_half_a_second() {
    let mut world = running_world(BugCategory::Integration);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceGate {
            category: BugCategory::Unit,
            lane: LaneIndex::new(2),
            offset: 100.0,
        },
        &mut events,
    );
    let mut movement = Movement::default();

    let (hit_at, events) = run_until(&mut world, &mut movement, |event| {
        matches!(event, Event::WrongGate { .. })
    });
    let paused_until = events
        .iter()
        .find_map(|event| match event {
            Event::WrongGate { paused_until, .. } => Some(*paused_until),
            _ => None,
        })
        .expect("wrong gate event");
    assert_eq!(paused_until, hit_at + Duration::from_millis(500));

    let frozen_at = query::current_bug(&world).expect("bug survives").position;
    let mut now = hit_at;
    while now + FRAME < paused_until {
        now += FRAME;
        let _ = run_frame(&mut world, &mut movement, now);
        let bug = query::current_bug(&world).expect("bug survives");
        assert_eq!(bug.position, frozen_at, "bug moved while frozen at {now:?}");
    }

    now = paused_until;
    let _ = run_frame(&mut world, &mut movement, now);
    let bug = query::current_bug(&world).expect("bug survives");
    assert!(bug.position > frozen_at);
}

#[test]
fn ticks_without_a_running_session_move_nothing() {
    let mut world = World::new();
    let mut movement = Movement::default();

    let events = run_frame(&mut world, &mut movement, FRAME);

    assert_eq!(
        events,
        vec![Event::TimeAdvanced {
            dt: FRAME,
            now: FRAME
        }]
    );
}
