//! Particle and rocket primitives.
//!
//! Both integrate with a fixed per-frame step: velocity accumulates
//! acceleration, position accumulates velocity, once per animation frame.
//! No delta-time scaling anywhere; the tuning assumes 60fps and tolerates
//! drift.

use crate::rng::Rng;

/// Life drained from a confetti piece each frame.
pub const LIFE_DECAY: f64 = 3.0;
/// At or below this remaining life a piece is culled.
pub const LIFE_FLOOR: f64 = 5.0;
/// Pieces farther than this outside the viewport are culled.
pub const OFFSCREEN_MARGIN: f64 = 400.0;

const ROCKET_MAX_AGE: u32 = 200;
const ROCKET_SKY_LIMIT: f64 = -100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// Vector of the given length pointing at `angle` radians.
    pub fn polar(angle: f64, len: f64) -> Self {
        Vec2 {
            x: angle.cos() * len,
            y: angle.sin() * len,
        }
    }

    pub fn add(&mut self, other: Vec2) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// A single confetti piece (also used for explosion debris).
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub color: [u8; 3],
    pub size: f64,
    pub life: f64,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, acc: Vec2, color: [u8; 3], size: f64, life: f64) -> Self {
        Particle {
            pos,
            vel,
            acc,
            color,
            size,
            life,
        }
    }

    pub fn update(&mut self) {
        self.vel.add(self.acc);
        self.pos.add(self.vel);
        self.life -= LIFE_DECAY;
    }

    /// Faded out, or drifted past the margin on any side of the viewport.
    pub fn done(&self, view_w: f64, view_h: f64) -> bool {
        self.life <= LIFE_FLOOR
            || self.pos.y > view_h + OFFSCREEN_MARGIN
            || self.pos.y < -OFFSCREEN_MARGIN
            || self.pos.x < -OFFSCREEN_MARGIN
            || self.pos.x > view_w + OFFSCREEN_MARGIN
    }
}

/// A firework rocket: climbs against gravity, then bursts into debris.
#[derive(Clone, Debug)]
pub struct Rocket {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub color: [u8; 3],
    pub size: f64,
    pub age: u32,
    pub exploded: bool,
}

impl Rocket {
    pub fn launch(x: f64, y: f64, rng: &mut Rng) -> Self {
        Rocket {
            pos: Vec2::new(x, y),
            vel: Vec2::new(rng.range(-1.2, 1.2), rng.range(-9.5, -6.5)),
            acc: Vec2::new(0.0, 0.12),
            color: [
                rng.range(200.0, 255.0) as u8,
                rng.range(150.0, 255.0) as u8,
                rng.range(150.0, 255.0) as u8,
            ],
            size: rng.range(4.0, 6.0),
            age: 0,
            exploded: false,
        }
    }

    pub fn update(&mut self) {
        if self.exploded {
            return;
        }
        self.vel.add(self.acc);
        self.pos.add(self.vel);
        self.age += 1;
    }

    /// Burst near apogee (upward speed mostly spent) or after a jittered
    /// age deadline so stragglers never hang around.
    pub fn should_explode(&self, rng: &mut Rng) -> bool {
        if self.exploded {
            return false;
        }
        self.vel.y > -2.0 || self.age as f64 > 60.0 + rng.range(0.0, 30.0)
    }

    /// Convert the rocket into 50..120 debris particles pushed onto
    /// `confetti`. Idempotent: a second call does nothing.
    pub fn explode(&mut self, confetti: &mut Vec<Particle>, rng: &mut Rng) {
        if self.exploded {
            return;
        }
        self.exploded = true;
        let count = rng.range(50.0, 120.0) as usize;
        for _ in 0..count {
            let color = [
                jitter_channel(self.color[0], rng),
                jitter_channel(self.color[1], rng),
                jitter_channel(self.color[2], rng),
            ];
            let vel = Vec2::polar(rng.range(0.0, std::f64::consts::TAU), rng.range(2.0, 8.0));
            confetti.push(Particle::new(
                self.pos,
                vel,
                Vec2::new(0.0, 0.08),
                color,
                rng.range(4.0, 10.0),
                200.0 + rng.range(40.0, 120.0),
            ));
        }
    }

    /// Finished; either burst already or escaped the simulation bounds.
    pub fn spent(&self) -> bool {
        self.exploded || self.pos.y < ROCKET_SKY_LIMIT || self.age > ROCKET_MAX_AGE
    }
}

/// Shift a color channel by +-30, clamped to the byte range.
fn jitter_channel(base: u8, rng: &mut Rng) -> u8 {
    (base as f64 + rng.range(-30.0, 30.0)).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_applies_acceleration_then_velocity() {
        let mut p = Particle::new(
            Vec2::new(10.0, 20.0),
            Vec2::new(1.0, -2.0),
            Vec2::new(0.0, 0.5),
            [255, 0, 0],
            8.0,
            255.0,
        );
        p.update();
        assert_eq!(p.vel, Vec2::new(1.0, -1.5));
        assert_eq!(p.pos, Vec2::new(11.0, 18.5));
        assert_eq!(p.life, 252.0);
    }

    #[test]
    fn particle_is_done_when_life_reaches_floor() {
        let mut p = Particle::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
            [0, 0, 0],
            6.0,
            LIFE_FLOOR + LIFE_DECAY,
        );
        assert!(!p.done(800.0, 600.0));
        p.update();
        assert!(p.done(800.0, 600.0));
    }

    #[test]
    fn particle_is_done_past_any_margin() {
        let base = Particle::new(
            Vec2::new(400.0, 300.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
            [0, 0, 0],
            6.0,
            255.0,
        );
        let mut below = base.clone();
        below.pos.y = 600.0 + OFFSCREEN_MARGIN + 1.0;
        let mut above = base.clone();
        above.pos.y = -OFFSCREEN_MARGIN - 1.0;
        let mut left = base.clone();
        left.pos.x = -OFFSCREEN_MARGIN - 1.0;
        let mut right = base.clone();
        right.pos.x = 800.0 + OFFSCREEN_MARGIN + 1.0;
        assert!(!base.done(800.0, 600.0));
        assert!(below.done(800.0, 600.0));
        assert!(above.done(800.0, 600.0));
        assert!(left.done(800.0, 600.0));
        assert!(right.done(800.0, 600.0));
    }

    #[test]
    fn rocket_launches_upward_and_decelerates() {
        let mut rng = Rng::from_seed(7);
        let mut r = Rocket::launch(100.0, 500.0, &mut rng);
        assert!(r.vel.y <= -6.5 && r.vel.y >= -9.5);
        let v0 = r.vel.y;
        r.update();
        assert!(r.vel.y > v0);
        assert_eq!(r.age, 1);
    }

    #[test]
    fn rocket_explodes_into_bounded_debris() {
        let mut rng = Rng::from_seed(42);
        let mut r = Rocket::launch(100.0, 500.0, &mut rng);
        let mut confetti = Vec::new();
        r.explode(&mut confetti, &mut rng);
        assert!(r.exploded);
        assert!((50..120).contains(&confetti.len()));
        for p in &confetti {
            assert_eq!(p.pos, r.pos);
            let speed = (p.vel.x * p.vel.x + p.vel.y * p.vel.y).sqrt();
            assert!(speed >= 2.0 - 1e-9 && speed <= 8.0 + 1e-9);
            assert!(p.size >= 4.0 && p.size <= 10.0);
            assert!(p.life >= 240.0 && p.life <= 320.0);
        }
        // Second burst must not double the debris.
        let n = confetti.len();
        r.explode(&mut confetti, &mut rng);
        assert_eq!(confetti.len(), n);
    }

    #[test]
    fn exploded_rocket_neither_moves_nor_explodes_again() {
        let mut rng = Rng::from_seed(3);
        let mut r = Rocket::launch(50.0, 400.0, &mut rng);
        let mut confetti = Vec::new();
        r.explode(&mut confetti, &mut rng);
        let pos = r.pos;
        r.update();
        assert_eq!(r.pos, pos);
        assert!(!r.should_explode(&mut rng));
        assert!(r.spent());
    }

    #[test]
    fn slow_rocket_is_due_to_explode() {
        let mut rng = Rng::from_seed(11);
        let mut r = Rocket::launch(50.0, 400.0, &mut rng);
        r.vel.y = -1.0;
        assert!(r.should_explode(&mut rng));
        r.vel.y = -5.0;
        r.age = 95;
        // Past the worst-case deadline of 90 frames.
        assert!(r.should_explode(&mut rng));
    }

    #[test]
    fn rocket_is_spent_out_of_bounds_or_old() {
        let mut rng = Rng::from_seed(5);
        let mut r = Rocket::launch(50.0, 400.0, &mut rng);
        assert!(!r.spent());
        r.pos.y = ROCKET_SKY_LIMIT - 1.0;
        assert!(r.spent());
        r.pos.y = 200.0;
        r.age = ROCKET_MAX_AGE + 1;
        assert!(r.spent());
    }
}
