//! Scene tessellation
//!
//! Turns a `SimState` into one triangle list plus the text the GPU pass cannot
//! draw (gift glyphs, the dog, banners). Read-only: drawing never touches state.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::sim::entity::{Color, Entity, EntityKind, ObstacleShape};
use crate::sim::level::has_projectiles;
use crate::sim::{LevelStatus, SimState};
use crate::strings::{MessageKey, StringTable};

const CIRCLE_SEGMENTS: u32 = 12;

/// Horizontal anchoring of a text label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Text to draw on top of the triangles; `pos` is the baseline anchor
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub pos: Vec2,
    /// Font size in canvas units
    pub size: f32,
    pub color: Color,
    pub align: Align,
}

impl TextLabel {
    fn new(text: &str, pos: Vec2, size: f32, color: Color) -> Self {
        Self {
            text: text.to_string(),
            pos,
            size,
            color,
            align: Align::Left,
        }
    }

    fn centered(text: &str, pos: Vec2, size: f32) -> Self {
        Self {
            align: Align::Center,
            ..Self::new(text, pos, size, colors::TEXT)
        }
    }
}

/// One rendered frame
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub vertices: Vec<Vertex>,
    pub labels: Vec<TextLabel>,
}

/// Optional decoration
#[derive(Debug, Clone, Copy)]
pub struct DrawOptions {
    pub snow: bool,
    pub trail: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            snow: true,
            trail: true,
        }
    }
}

fn with_alpha(mut c: Color, alpha: f32) -> Color {
    c[3] = alpha;
    c
}

/// Draw with every decoration enabled
pub fn draw(state: &SimState, strings: &dyn StringTable) -> Frame {
    draw_with(state, strings, &DrawOptions::default())
}

pub fn draw_with(state: &SimState, strings: &dyn StringTable, opts: &DrawOptions) -> Frame {
    let mut f = Frame::default();
    let v = &mut f.vertices;

    v.extend(shapes::gradient_rect(
        Vec2::ZERO,
        Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
        colors::SKY_TOP,
        colors::SKY_BOTTOM,
    ));

    if opts.snow {
        for flake in &state.snow {
            v.extend(shapes::circle(flake.pos, 0.5 + flake.speed * 0.4, colors::SNOW, 6));
        }
    }

    if let Some(elf) = state.pursuer.as_ref() {
        if opts.trail {
            for point in &elf.trail {
                let color = with_alpha(point.color, point.alpha.clamp(0.0, 1.0));
                v.extend(shapes::circle(point.pos, 4.0, color, CIRCLE_SEGMENTS));
            }
        }
        if elf.is_live() {
            let p = elf.pos;
            v.extend(shapes::ring(elf.center(), 16.0, 20.0, colors::ELF_GLOW, CIRCLE_SEGMENTS));
            v.extend(shapes::rect(p + Vec2::new(5.0, 10.0), Vec2::new(20.0, 15.0), colors::ELF_BODY));
            v.extend(shapes::rect(p + Vec2::new(10.0, 5.0), Vec2::new(10.0, 10.0), colors::ELF_FACE));
            v.extend(shapes::triangle(
                p + Vec2::new(10.0, 5.0),
                p + Vec2::new(20.0, 5.0),
                p + Vec2::new(15.0, -5.0),
                colors::ELF_HAT,
            ));
        }
    }

    let locked = state.platform_locked();
    for obj in &state.obstacles {
        draw_obstacle(v, state, obj, locked);
    }

    for gift in &state.collectibles {
        if let EntityKind::Collectible {
            icon,
            collected: false,
        } = gift.kind
        {
            f.labels.push(TextLabel::new(
                icon,
                gift.pos + Vec2::new(0.0, 28.0),
                28.0,
                colors::TEXT,
            ));
        }
    }

    let flap = (state.clock as f32 / 6.0).sin() * 5.0;
    for bird in &state.birds {
        let c = bird.pos + bird.size / 2.0;
        v.extend(shapes::ellipse(
            c,
            Vec2::new(bird.size.x / 2.0, bird.size.y / 4.0),
            colors::BIRD,
            CIRCLE_SEGMENTS,
        ));
        v.extend(shapes::line(c, c + Vec2::new(-10.0, -5.0 - flap), 2.0, colors::WING));
        v.extend(shapes::line(c, c + Vec2::new(10.0, -5.0 - flap), 2.0, colors::WING));
    }

    for dog in &state.dogs {
        f.labels.push(TextLabel::new(
            "🐕",
            dog.pos + Vec2::new(0.0, dog.size.y),
            30.0,
            colors::TEXT,
        ));
    }

    for shot in &state.projectiles {
        v.extend(shapes::circle(shot.pos, 4.0, colors::SNOWBALL, CIRCLE_SEGMENTS));
    }

    if has_projectiles(state.level) {
        for x in [300.0, 450.0] {
            v.extend(shapes::rect(Vec2::new(x, 580.0), Vec2::new(15.0, 20.0), colors::LAUNCHER));
        }
    }

    let sleigh = state.vehicle.pos;
    if let Some(arrival) = state.arrival.as_ref() {
        v.extend(shapes::rect(
            Vec2::new(arrival.x, sleigh.y + 10.0),
            Vec2::new(14.0, 20.0),
            colors::WALKER,
        ));
        f.labels.push(TextLabel::new(
            strings.lookup(MessageKey::Arrival),
            Vec2::new(arrival.x - 20.0, sleigh.y - 10.0),
            10.0,
            colors::TEXT,
        ));
    }

    if state.status == LevelStatus::Crashed {
        f.labels.push(TextLabel::new(
            strings.lookup(MessageKey::Crash),
            sleigh - Vec2::new(20.0, 0.0),
            16.0,
            colors::CRASH_TEXT,
        ));
    } else if !state.arrival.is_some_and(|a| !a.is_complete()) {
        draw_sleigh(v, sleigh, state.vehicle.thrusting_up, state.clock);
    }

    if let Some(message) = state.message {
        v.extend(shapes::rect(
            Vec2::new(0.0, FIELD_HEIGHT / 2.0 - 40.0),
            Vec2::new(FIELD_WIDTH, 80.0),
            colors::BANNER,
        ));
        f.labels.push(TextLabel::centered(
            strings.lookup(message.key),
            Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0 + 5.0),
            10.0,
        ));
    } else if state.status == LevelStatus::Playing && state.is_paused() {
        v.extend(shapes::rect(
            Vec2::ZERO,
            Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
            colors::DIM,
        ));
        f.labels.push(TextLabel::centered(
            strings.lookup(MessageKey::Paused),
            Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
            24.0,
        ));
        f.labels.push(TextLabel::centered(
            strings.lookup(MessageKey::ResumeHint),
            Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0 + 40.0),
            12.0,
        ));
    }

    f
}

fn draw_obstacle(v: &mut Vec<Vertex>, state: &SimState, obj: &Entity, locked: bool) {
    let (p, s) = (obj.pos, obj.size);
    match obj.kind {
        EntityKind::Obstacle(ObstacleShape::Mountain) => {
            v.extend(shapes::triangle(
                Vec2::new(p.x, p.y + s.y),
                Vec2::new(p.x + s.x / 2.0, p.y),
                Vec2::new(p.x + s.x, p.y + s.y),
                obj.color,
            ));
            if let Some(a) = state.antagonist.as_ref() {
                draw_antagonist(v, a.pos, state.vehicle.pos);
            }
        }
        EntityKind::Obstacle(ObstacleShape::House) => {
            v.extend(shapes::rect(p, s, obj.color));
            v.extend(shapes::rect(p + Vec2::new(25.0, 40.0), Vec2::splat(20.0), colors::WINDOW));
            v.extend(shapes::rect(
                Vec2::new(p.x + s.x - 45.0, p.y + 40.0),
                Vec2::splat(20.0),
                colors::WINDOW,
            ));
            v.extend(shapes::rect(
                Vec2::new(p.x + s.x / 2.0 - 10.0, p.y + s.y - 35.0),
                Vec2::new(20.0, 35.0),
                colors::DOOR,
            ));
        }
        EntityKind::Platform => {
            let (stripe, deck) = if locked {
                (colors::STRIPE_LOCKED, colors::PLATFORM_LOCKED)
            } else {
                (colors::STRIPE_OPEN, colors::PLATFORM_OPEN)
            };
            v.extend(shapes::line(
                Vec2::new(p.x, p.y - 8.0),
                Vec2::new(p.x + s.x, p.y - 8.0),
                6.0,
                stripe,
            ));
            v.extend(shapes::rect(p, s, deck));
        }
        EntityKind::Obstacle(ObstacleShape::Tree) => {
            let trunk_x = p.x + s.x / 2.0;
            v.extend(shapes::rect(
                Vec2::new(trunk_x - 6.0, p.y + s.y - 30.0),
                Vec2::new(12.0, 30.0),
                colors::TRUNK,
            ));
            for i in 0..4 {
                let y = p.y + i as f32 * 25.0;
                let half = (s.x - i as f32 * 12.0) / 2.0;
                v.extend(shapes::triangle(
                    Vec2::new(trunk_x, y),
                    Vec2::new(trunk_x - half, y + 40.0),
                    Vec2::new(trunk_x + half, y + 40.0),
                    obj.color,
                ));
            }
        }
        _ => v.extend(shapes::rect(p, s, obj.color)),
    }
}

/// The puller on its mountain, with a dashed tether to the sleigh
fn draw_antagonist(v: &mut Vec<Vertex>, g: Vec2, sleigh: Vec2) {
    v.extend(shapes::rect(g + Vec2::new(-15.0, -20.0), Vec2::new(30.0, 40.0), colors::ANTAGONIST_BODY));
    v.extend(shapes::rect(g + Vec2::new(-10.0, -25.0), Vec2::new(20.0, 15.0), colors::ANTAGONIST_HEAD));
    v.extend(shapes::rect(g + Vec2::new(-6.0, -20.0), Vec2::splat(3.0), colors::ANTAGONIST_EYES));
    v.extend(shapes::rect(g + Vec2::new(3.0, -20.0), Vec2::splat(3.0), colors::ANTAGONIST_EYES));
    v.extend(shapes::triangle(
        g + Vec2::new(-10.0, -25.0),
        g + Vec2::new(10.0, -25.0),
        g + Vec2::new(0.0, -40.0),
        colors::ANTAGONIST_HAT,
    ));
    v.extend(shapes::rect(g + Vec2::new(15.0, -5.0), Vec2::new(25.0, 15.0), colors::VACUUM));
    v.extend(shapes::rect(g + Vec2::new(40.0, -2.0), Vec2::new(5.0, 9.0), colors::VACUUM_NOZZLE));
    v.extend(shapes::dashed_line(
        g + Vec2::new(40.0, 2.0),
        sleigh + Vec2::new(VEHICLE_WIDTH / 2.0, VEHICLE_HEIGHT / 2.0),
        1.0,
        5.0,
        5.0,
        colors::TETHER,
    ));
}

fn draw_sleigh(v: &mut Vec<Vertex>, p: Vec2, thrusting: bool, clock: u64) {
    v.extend(shapes::rect(p + Vec2::new(0.0, 12.0), Vec2::new(44.0, 18.0), colors::SLEIGH_BODY));
    v.extend(shapes::rect(p, Vec2::new(6.0, 15.0), colors::SLEIGH_BACK));
    v.extend(shapes::rect(p + Vec2::new(6.0, 2.0), Vec2::splat(12.0), colors::SANTA));
    v.extend(shapes::rect(p + Vec2::new(10.0, 2.0), Vec2::splat(4.0), colors::BEARD));
    v.extend(shapes::line(
        p + Vec2::new(-10.0, 32.0),
        p + Vec2::new(54.0, 32.0),
        3.0,
        colors::RUNNER,
    ));
    if thrusting {
        // Cheap flicker without touching the simulation RNG
        let flicker = ((clock * 7) % 12) as f32;
        v.extend(shapes::triangle(
            p + Vec2::new(8.0, 28.0),
            p + Vec2::new(14.0, 42.0 + flicker),
            p + Vec2::new(20.0, 28.0),
            colors::FLAME,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision;
    use crate::sim::state::CrashCause;
    use crate::strings::EnglishStrings;

    fn has_color(frame: &Frame, c: Color) -> bool {
        frame.vertices.iter().any(|v| v.color == c)
    }

    fn has_label(frame: &Frame, text: &str) -> bool {
        frame.labels.iter().any(|l| l.text == text)
    }

    #[test]
    fn test_triangle_list_is_well_formed() {
        for level in 1..=FINAL_LEVEL {
            let state = SimState::new(level, 3, true, 4);
            let frame = draw(&state, &EnglishStrings);
            assert_eq!(frame.vertices.len() % 3, 0);
        }
    }

    #[test]
    fn test_platform_color_follows_lock() {
        let mut state = SimState::new(1, 3, false, 4);
        let frame = draw(&state, &EnglishStrings);
        assert!(has_color(&frame, colors::STRIPE_LOCKED));
        assert!(!has_color(&frame, colors::STRIPE_OPEN));

        state.collected_count = TOTAL_COLLECTIBLES;
        let frame = draw(&state, &EnglishStrings);
        assert!(has_color(&frame, colors::STRIPE_OPEN));
        assert!(!has_color(&frame, colors::STRIPE_LOCKED));
    }

    #[test]
    fn test_collected_gifts_are_hidden() {
        let mut state = SimState::new(1, 3, false, 4);
        let icons = |f: &Frame| f.labels.iter().filter(|l| l.size == 28.0).count();
        assert_eq!(icons(&draw(&state, &EnglishStrings)), 10);
        state.collectibles[0].kind = EntityKind::Collectible {
            icon: "🎁",
            collected: true,
        };
        assert_eq!(icons(&draw(&state, &EnglishStrings)), 9);
    }

    #[test]
    fn test_pause_overlay_only_without_message() {
        let mut state = SimState::new(1, 3, false, 4);
        state.paused = true;
        let frame = draw(&state, &EnglishStrings);
        assert!(has_label(&frame, "PAUSED"));
        assert!(has_label(&frame, "PRESS P TO RESUME"));

        state.show_message(MessageKey::CanLand, None);
        let frame = draw(&state, &EnglishStrings);
        assert!(!has_label(&frame, "PAUSED"));
        assert!(has_label(&frame, EnglishStrings.lookup(MessageKey::CanLand)));
    }

    #[test]
    fn test_external_pause_shows_overlay() {
        let mut state = SimState::new(1, 3, false, 4);
        crate::sim::tick(
            &mut state,
            &crate::sim::TickInput {
                external_pause: true,
                ..Default::default()
            },
        );
        assert!(!state.paused);
        let frame = draw(&state, &EnglishStrings);
        assert!(has_label(&frame, "PAUSED"));
        assert!(has_color(&frame, colors::DIM));
    }

    #[test]
    fn test_sleigh_hidden_during_arrival_walk() {
        let mut state = SimState::new(1, 3, false, 4);
        state.collected_count = TOTAL_COLLECTIBLES;
        collision::land(&mut state);
        let frame = draw(&state, &EnglishStrings);
        assert!(has_color(&frame, colors::WALKER));
        assert!(!has_color(&frame, colors::RUNNER));
    }

    #[test]
    fn test_crash_replaces_sleigh_with_label() {
        let mut state = SimState::new(1, 3, false, 4);
        assert!(has_color(&draw(&state, &EnglishStrings), colors::RUNNER));
        collision::crash(&mut state, CrashCause::Obstacle);
        let frame = draw(&state, &EnglishStrings);
        assert!(has_label(&frame, "CRASH!"));
        assert!(!has_color(&frame, colors::RUNNER));
    }

    #[test]
    fn test_level_specific_props() {
        let l1 = draw(&SimState::new(1, 3, false, 4), &EnglishStrings);
        assert!(!has_color(&l1, colors::LAUNCHER));
        assert!(!has_color(&l1, colors::VACUUM));

        let l4 = draw(&SimState::new(4, 3, false, 4), &EnglishStrings);
        assert!(has_color(&l4, colors::LAUNCHER));
        assert!(has_color(&l4, colors::VACUUM));
        assert!(has_color(&l4, colors::TETHER));
    }

    #[test]
    fn test_snow_can_be_disabled() {
        let state = SimState::new(1, 3, false, 4);
        let with = draw(&state, &EnglishStrings);
        let without = draw_with(
            &state,
            &EnglishStrings,
            &DrawOptions {
                snow: false,
                trail: true,
            },
        );
        assert!(without.vertices.len() < with.vertices.len());
    }
}
