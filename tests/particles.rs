// Integration tests for the particle engine. Native-friendly: they drive the
// simulation only and never touch the canvas.

use macaron_quiz::fx::particle::{LIFE_DECAY, LIFE_FLOOR, Particle, Rocket, Vec2};
use macaron_quiz::fx::{ANSWER_BURST_COUNT, CELEBRATION_COUNT, PASTEL_PALETTE, Stage};
use macaron_quiz::rng::Rng;

#[test]
fn life_decreases_by_a_fixed_decrement_until_removal() {
    let mut p = Particle::new(
        Vec2::new(400.0, 300.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 0.0),
        [255, 205, 210],
        8.0,
        255.0,
    );
    let mut previous = p.life;
    let mut steps = 0;
    while !p.done(800.0, 600.0) {
        p.update();
        assert_eq!(p.life, previous - LIFE_DECAY, "decay must be constant");
        previous = p.life;
        steps += 1;
        assert!(steps < 1000, "particle never reached removal");
    }
    assert!(p.life <= LIFE_FLOOR);
}

#[test]
fn stage_never_retains_a_removed_particle() {
    let mut stage = Stage::with_seed(21);
    stage.spawn_answer_burst(400.0, 300.0, ANSWER_BURST_COUNT);
    for _ in 0..200 {
        stage.step(800.0, 600.0);
        for piece in stage.confetti() {
            assert!(!piece.done(800.0, 600.0), "dead particle left in the stage");
        }
    }
    assert!(stage.confetti().is_empty(), "burst should drain within 200 frames");
}

#[test]
fn explosion_is_idempotent() {
    let mut rng = Rng::from_seed(5);
    let mut rocket = Rocket::launch(200.0, 500.0, &mut rng);
    let mut debris = Vec::new();
    rocket.explode(&mut debris, &mut rng);
    let first = debris.len();
    assert!((50..120).contains(&first));
    rocket.explode(&mut debris, &mut rng);
    assert_eq!(debris.len(), first, "second trigger must not spawn more debris");
}

#[test]
fn every_rocket_eventually_leaves_the_stage() {
    let mut stage = Stage::with_seed(8);
    stage.launch_fireworks(400.0, 500.0, 6, 800.0);
    for _ in 0..300 {
        stage.step(800.0, 600.0);
    }
    assert!(stage.rockets().is_empty(), "rockets past the age cap must be swept");
}

#[test]
fn rockets_explode_into_confetti_on_the_stage() {
    let mut stage = Stage::with_seed(13);
    stage.launch_fireworks(400.0, 500.0, 6, 800.0);
    let mut saw_debris = false;
    for _ in 0..120 {
        stage.step(800.0, 600.0);
        if !stage.confetti().is_empty() {
            saw_debris = true;
            break;
        }
    }
    assert!(saw_debris, "no rocket burst within 120 frames");
}

#[test]
fn answer_burst_sticks_to_the_pastel_palette() {
    let mut stage = Stage::with_seed(34);
    stage.spawn_answer_burst(100.0, 100.0, ANSWER_BURST_COUNT);
    stage.spawn_celebration(100.0, 100.0, CELEBRATION_COUNT);
    for piece in stage.confetti() {
        assert!(
            PASTEL_PALETTE.contains(&piece.color),
            "unexpected color {:?}",
            piece.color
        );
    }
}

#[test]
fn constant_acceleration_integrates_into_velocity() {
    let mut p = Particle::new(
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, -4.0),
        Vec2::new(0.0, 0.08),
        [255, 205, 210],
        8.0,
        255.0,
    );
    for _ in 0..50 {
        p.update();
    }
    assert!((p.vel.x - 1.0).abs() < 1e-9, "no horizontal acceleration");
    assert!((p.vel.y - (-4.0 + 50.0 * 0.08)).abs() < 1e-9);
}

#[test]
fn celebration_drains_within_its_life_bound() {
    let mut stage = Stage::with_seed(55);
    stage.spawn_celebration(400.0, 300.0, CELEBRATION_COUNT);
    // Longest-lived piece starts at 280 and loses 3 per frame.
    for _ in 0..120 {
        stage.step(800.0, 600.0);
    }
    assert!(stage.confetti().is_empty());
}

#[test]
fn identical_seeds_produce_identical_runs() {
    let mut a = Stage::with_seed(99);
    let mut b = Stage::with_seed(99);
    for stage in [&mut a, &mut b] {
        stage.spawn_answer_burst(250.0, 250.0, ANSWER_BURST_COUNT);
        stage.launch_fireworks(400.0, 500.0, 3, 800.0);
        for _ in 0..30 {
            stage.step(800.0, 600.0);
        }
    }
    assert_eq!(a.confetti().len(), b.confetti().len());
    for (pa, pb) in a.confetti().iter().zip(b.confetti()) {
        assert_eq!(pa.pos, pb.pos);
        assert_eq!(pa.color, pb.color);
    }
}
