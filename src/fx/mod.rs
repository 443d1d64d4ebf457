//! Transient visual effects: confetti pieces and firework rockets.
//!
//! The [`Stage`] owns both populations and is driven by the frame loop:
//! `step` advances physics and sweeps dead entities, `render` draws the
//! survivors. Emission presets are the only way in; nothing outside holds a
//! reference to a live particle.

use web_sys::CanvasRenderingContext2d;

use crate::rng::Rng;

pub mod particle;

pub use particle::{Particle, Rocket, Vec2};

/// Soft macaron palette shared by the answer burst and the celebration.
pub const PASTEL_PALETTE: [[u8; 3]; 5] = [
    [255, 205, 210], // pink
    [225, 245, 254], // pale blue
    [232, 245, 233], // mint
    [255, 243, 224], // pale yellow
    [243, 229, 245], // pale purple
];

/// Pieces spawned at the click point when an answer is correct.
pub const ANSWER_BURST_COUNT: usize = 20;
/// Pieces sprayed over the result card on every result screen.
pub const CELEBRATION_COUNT: usize = 120;
/// Pieces in the zero-score red burst.
pub const RED_BURST_COUNT: usize = 120;
/// Rockets launched for a score of 90% or better.
pub const FIREWORK_ROCKET_COUNT: usize = 6;

/// Particle system for one canvas. Owns every live entity; swept each tick
/// by reverse iteration so removal never skips an element.
pub struct Stage {
    confetti: Vec<Particle>,
    rockets: Vec<Rocket>,
    frame: u64,
    rng: Rng,
}

impl Stage {
    pub fn new() -> Self {
        Stage::with_rng(Rng::seeded())
    }

    /// Deterministic stage for tests.
    pub fn with_seed(seed: u64) -> Self {
        Stage::with_rng(Rng::from_seed(seed))
    }

    fn with_rng(rng: Rng) -> Self {
        Stage {
            confetti: Vec::new(),
            rockets: Vec::new(),
            frame: 0,
            rng,
        }
    }

    // --- Emission presets ---

    /// Default random burst at the click point: pastel pieces thrown
    /// sideways and downward.
    pub fn spawn_answer_burst(&mut self, x: f64, y: f64, count: usize) {
        for _ in 0..count {
            let color = self.pastel();
            let vel = Vec2::new(self.rng.range(-2.0, 2.0), self.rng.range(1.0, 6.0));
            self.confetti.push(Particle::new(
                Vec2::new(x, y),
                vel,
                Vec2::new(0.0, 0.08),
                color,
                self.rng.range(6.0, 12.0),
                255.0,
            ));
        }
    }

    /// Upward cone of pastel pieces, jittered around the spawn point.
    pub fn spawn_celebration(&mut self, x: f64, y: f64, count: usize) {
        for _ in 0..count {
            let color = self.pastel();
            let pos = Vec2::new(
                x + self.rng.range(-20.0, 20.0),
                y + self.rng.range(-10.0, 10.0),
            );
            let vel = Vec2::polar(
                self.rng.range(-std::f64::consts::PI, 0.0),
                self.rng.range(2.0, 8.0),
            );
            self.confetti.push(Particle::new(
                pos,
                vel,
                Vec2::new(0.0, 0.08),
                color,
                self.rng.range(6.0, 14.0),
                180.0 + self.rng.range(30.0, 100.0),
            ));
        }
    }

    /// Omnidirectional red-dominant burst for a zero score. Heavier pieces,
    /// stronger gravity.
    pub fn spawn_red_burst(&mut self, x: f64, y: f64, count: usize) {
        for _ in 0..count {
            let color = [
                self.rng.range(180.0, 255.0) as u8,
                self.rng.range(10.0, 80.0) as u8,
                self.rng.range(10.0, 60.0) as u8,
            ];
            let vel = Vec2::polar(
                self.rng.range(0.0, std::f64::consts::TAU),
                self.rng.range(2.0, 10.0),
            );
            self.confetti.push(Particle::new(
                Vec2::new(x, y),
                vel,
                Vec2::new(0.0, 0.12),
                color,
                self.rng.range(6.0, 18.0),
                220.0 + self.rng.range(20.0, 120.0),
            ));
        }
    }

    /// Launch rockets scattered around `x`, lifting off a little below
    /// `base_y`. Spread scales with the viewport width.
    pub fn launch_fireworks(&mut self, x: f64, base_y: f64, count: usize, view_w: f64) {
        for _ in 0..count {
            let fx = x + self.rng.range(-view_w * 0.2, view_w * 0.2);
            let fy = base_y + self.rng.range(20.0, 80.0);
            let rocket = Rocket::launch(fx, fy, &mut self.rng);
            self.rockets.push(rocket);
        }
    }

    fn pastel(&mut self) -> [u8; 3] {
        PASTEL_PALETTE[self.rng.index(PASTEL_PALETTE.len())]
    }

    // --- Simulation ---

    /// Drop every live entity, for session reset.
    pub fn clear(&mut self) {
        self.confetti.clear();
        self.rockets.clear();
    }

    /// Advance one frame. Rockets first, so debris from a burst joins the
    /// confetti sweep of the same tick.
    pub fn step(&mut self, view_w: f64, view_h: f64) {
        self.frame += 1;

        let mut i = self.rockets.len();
        while i > 0 {
            i -= 1;
            self.rockets[i].update();
            if self.rockets[i].should_explode(&mut self.rng) {
                self.rockets[i].explode(&mut self.confetti, &mut self.rng);
            }
            if self.rockets[i].spent() {
                self.rockets.swap_remove(i);
            }
        }

        let mut i = self.confetti.len();
        while i > 0 {
            i -= 1;
            self.confetti[i].update();
            if self.confetti[i].done(view_w, view_h) {
                self.confetti.swap_remove(i);
            }
        }
    }

    /// Draw rockets then confetti, so confetti stays on top.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        let rng = &mut self.rng;
        for rocket in &self.rockets {
            if rocket.exploded {
                continue;
            }
            ctx.begin_path();
            ctx.set_fill_style_str(&rgb(rocket.color));
            ctx.arc(
                rocket.pos.x,
                rocket.pos.y,
                rocket.size / 2.0,
                0.0,
                std::f64::consts::TAU,
            )
            .ok();
            ctx.fill();
            // Two loose sparks trailing below the head.
            ctx.set_fill_style_str("rgba(255,220,180,0.47)");
            for _ in 0..2 {
                let tx = rocket.pos.x + rng.range(-3.0, 3.0);
                let ty = rocket.pos.y + rng.range(0.0, 6.0);
                ctx.begin_path();
                ctx.arc(tx, ty, rng.range(0.5, 1.5), 0.0, std::f64::consts::TAU)
                    .ok();
                ctx.fill();
            }
        }

        for piece in &self.confetti {
            ctx.save();
            ctx.translate(piece.pos.x, piece.pos.y).ok();
            ctx.rotate((self.frame as f64 + piece.pos.x) / 40.0).ok();
            ctx.set_fill_style_str(&rgba(piece.color, piece.life));
            ctx.fill_rect(
                -piece.size / 2.0,
                -piece.size * 0.3,
                piece.size,
                piece.size * 0.6,
            );
            ctx.restore();
        }
    }

    pub fn confetti(&self) -> &[Particle] {
        &self.confetti
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::new()
    }
}

fn rgb(c: [u8; 3]) -> String {
    format!("rgb({},{},{})", c[0], c[1], c[2])
}

/// Remaining life doubles as the alpha channel, clamped to the valid range.
fn rgba(c: [u8; 3], life: f64) -> String {
    let alpha = (life / 255.0).clamp(0.0, 1.0);
    format!("rgba({},{},{},{:.3})", c[0], c[1], c[2], alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed(v: Vec2) -> f64 {
        (v.x * v.x + v.y * v.y).sqrt()
    }

    #[test]
    fn answer_burst_matches_preset() {
        let mut stage = Stage::with_seed(1);
        stage.spawn_answer_burst(100.0, 200.0, ANSWER_BURST_COUNT);
        assert_eq!(stage.confetti().len(), ANSWER_BURST_COUNT);
        for p in stage.confetti() {
            assert_eq!(p.pos, Vec2::new(100.0, 200.0));
            assert!(p.vel.x >= -2.0 && p.vel.x <= 2.0);
            assert!(p.vel.y >= 1.0 && p.vel.y <= 6.0);
            assert_eq!(p.acc, Vec2::new(0.0, 0.08));
            assert!(PASTEL_PALETTE.contains(&p.color));
            assert!(p.size >= 6.0 && p.size <= 12.0);
            assert_eq!(p.life, 255.0);
        }
    }

    #[test]
    fn celebration_cone_points_upward() {
        let mut stage = Stage::with_seed(2);
        stage.spawn_celebration(400.0, 300.0, CELEBRATION_COUNT);
        for p in stage.confetti() {
            assert!(p.pos.x >= 380.0 && p.pos.x <= 420.0);
            assert!(p.pos.y >= 290.0 && p.pos.y <= 310.0);
            // Angle is drawn from the upper half-plane.
            assert!(p.vel.y <= 0.0);
            let s = speed(p.vel);
            assert!(s >= 2.0 - 1e-9 && s <= 8.0 + 1e-9);
            assert!(PASTEL_PALETTE.contains(&p.color));
            assert!(p.size >= 6.0 && p.size <= 14.0);
            assert!(p.life >= 210.0 && p.life <= 280.0);
        }
    }

    #[test]
    fn red_burst_is_red_dominant_and_omnidirectional() {
        let mut stage = Stage::with_seed(3);
        stage.spawn_red_burst(400.0, 300.0, RED_BURST_COUNT);
        let mut saw_up = false;
        let mut saw_down = false;
        for p in stage.confetti() {
            assert!(p.color[0] >= 180);
            assert!(p.color[1] <= 80);
            assert!(p.color[2] <= 60);
            let s = speed(p.vel);
            assert!(s >= 2.0 - 1e-9 && s <= 10.0 + 1e-9);
            assert_eq!(p.acc, Vec2::new(0.0, 0.12));
            assert!(p.size >= 6.0 && p.size <= 18.0);
            assert!(p.life >= 240.0 && p.life <= 340.0);
            saw_up |= p.vel.y < 0.0;
            saw_down |= p.vel.y > 0.0;
        }
        assert!(saw_up && saw_down);
    }

    #[test]
    fn fireworks_launch_within_spread() {
        let mut stage = Stage::with_seed(4);
        stage.launch_fireworks(400.0, 300.0, FIREWORK_ROCKET_COUNT, 800.0);
        assert_eq!(stage.rockets().len(), FIREWORK_ROCKET_COUNT);
        for r in stage.rockets() {
            assert!(r.pos.x >= 240.0 && r.pos.x <= 560.0);
            assert!(r.pos.y >= 320.0 && r.pos.y <= 380.0);
            assert!(!r.exploded);
        }
    }

    #[test]
    fn step_sweeps_spent_confetti() {
        let mut stage = Stage::with_seed(5);
        stage.spawn_answer_burst(100.0, 100.0, 1);
        stage.confetti[0].life = particle::LIFE_FLOOR + particle::LIFE_DECAY;
        stage.step(800.0, 600.0);
        assert!(stage.confetti().is_empty());
    }

    #[test]
    fn slow_rocket_bursts_and_is_swept_in_one_step() {
        let mut stage = Stage::with_seed(6);
        stage.launch_fireworks(400.0, 500.0, 1, 800.0);
        // Force apogee on the next update.
        stage.rockets[0].vel = Vec2::new(0.0, 0.5);
        stage.step(800.0, 600.0);
        assert!(stage.rockets().is_empty());
        assert!(stage.confetti().len() >= 50);
    }

    #[test]
    fn step_advances_the_frame_counter() {
        let mut stage = Stage::with_seed(7);
        stage.step(800.0, 600.0);
        stage.step(800.0, 600.0);
        assert_eq!(stage.frame, 2);
    }

    #[test]
    fn clear_empties_both_populations() {
        let mut stage = Stage::with_seed(8);
        stage.spawn_answer_burst(10.0, 10.0, 5);
        stage.launch_fireworks(400.0, 500.0, 2, 800.0);
        stage.clear();
        assert!(stage.confetti().is_empty());
        assert!(stage.rockets().is_empty());
    }
}
