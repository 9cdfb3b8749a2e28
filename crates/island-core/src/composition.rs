//! The island scene: every element with its base coordinates, depth modifier,
//! ambient loops and lazy gating.

use crate::ambient::{AmbientSpec, Sample};
use crate::config::SceneConfig;
use crate::easing::Ease;
use crate::lazy::GateOptions;
use crate::parallax::{Channels, DepthModifier, ParallaxSpec};
use crate::scene::ElementSpec;
use crate::target::{NodeId, NodeRegistry, NodeStyle, Property};
use glam::Vec2;

pub const ISLAND_ROOT_MARGIN_PX: f32 = 300.0;

/// Island ripple travel targets, relative to the island.
pub const ISLAND_RIPPLES: [(f32, f32); 4] =
    [(50.0, 38.0), (244.0, 60.0), (545.0, 60.0), (786.0, 47.0)];

pub const TOWEL_COUNT: usize = 8;
pub const PLANT_LEAF_GROUPS: usize = 2;
pub const PALM_LEAF_GROUPS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoliageKind {
    Grass,
    Plant,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoliageInstance {
    pub kind: FoliageKind,
    pub x: f32,
    pub y: f32,
    pub variant: u8,
}

const fn grass(x: f32, y: f32, variant: u8) -> FoliageInstance {
    FoliageInstance {
        kind: FoliageKind::Grass,
        x,
        y,
        variant,
    }
}

const fn plant(x: f32, y: f32, variant: u8) -> FoliageInstance {
    FoliageInstance {
        kind: FoliageKind::Plant,
        x,
        y,
        variant,
    }
}

pub const FOLIAGE: [FoliageInstance; 12] = [
    grass(528.0, 288.0, 1),
    grass(600.0, 290.0, 2),
    plant(570.0, 279.0, 1),
    grass(500.0, 293.0, 1),
    grass(415.0, 287.0, 2),
    grass(430.0, 293.0, 1),
    grass(360.0, 283.0, 3),
    grass(284.0, 286.0, 2),
    grass(310.0, 288.0, 1),
    plant(490.0, 270.0, 2),
    plant(410.0, 280.0, 3),
    plant(320.0, 279.0, 4),
];

fn foliage_origin(kind: FoliageKind, variant: u8) -> (f32, f32) {
    match (kind, variant) {
        (FoliageKind::Grass, 2) => (21.0, 13.0),
        (FoliageKind::Grass, 3) => (32.0, 15.0),
        (FoliageKind::Grass, _) => (25.0, 11.0),
        (FoliageKind::Plant, 2) => (39.0, 32.0),
        (FoliageKind::Plant, 3) => (33.0, 27.0),
        (FoliageKind::Plant, 4) => (33.0, 21.0),
        (FoliageKind::Plant, _) => (30.0, 24.0),
    }
}

/// Palm trees: position, trunk origin, leaf origin.
pub const PALM_TREES: [((f32, f32), (f32, f32), (f32, f32)); 3] = [
    ((286.0, 110.0), (71.0, 168.0), (46.0, 15.0)),
    ((494.0, 86.0), (54.0, 167.0), (65.0, 14.0)),
    ((588.0, 126.0), (4.0, 173.0), (91.0, 20.0)),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudSpec {
    pub width: f32,
    pub y: f32,
    /// Seconds to cross the scene.
    pub duration: f32,
    pub repeat_delay: f32,
    /// Seconds into the first crossing at mount.
    pub start: f32,
}

pub const CLOUDS: [CloudSpec; 4] = [
    CloudSpec {
        width: 180.0,
        y: 30.0,
        duration: 90.0,
        repeat_delay: 4.0,
        start: 10.0,
    },
    CloudSpec {
        width: 140.0,
        y: 70.0,
        duration: 120.0,
        repeat_delay: 8.0,
        start: 60.0,
    },
    CloudSpec {
        width: 220.0,
        y: 15.0,
        duration: 150.0,
        repeat_delay: 2.0,
        start: 110.0,
    },
    CloudSpec {
        width: 120.0,
        y: 95.0,
        duration: 100.0,
        repeat_delay: 6.0,
        start: 30.0,
    },
];

/// Water layers: name, y, modifier, skew channel.
const WATER_LAYERS: [(&str, f32, f32, f32, bool); 8] = [
    ("water-horizon-top", 2.0, 2.0, 1.0, false),
    ("water-waves", 0.0, 8.0, 8.0, false),
    ("water-ground-waves-near", 45.0, 13.0, 13.0, true),
    ("water-ground-waves-far", 60.0, 16.0, 16.0, true),
    ("water-horizon-mid", 0.0, 2.0, 1.0, false),
    ("water-horizon-low", 15.0, 2.0, 1.0, false),
    ("water-horizon-front", 0.0, 2.0, 1.0, false),
    ("water-ripples", 50.0, 15.0, 15.0, true),
];

/// Registers `name` at its base position and returns the matching binding.
fn layer(
    registry: &mut NodeRegistry,
    name: &str,
    base: (f32, f32),
    modifier: (f32, f32),
) -> (NodeId, ParallaxSpec) {
    let node = registry.register(name, NodeStyle::at(base.0, base.1));
    let spec = ParallaxSpec::new(
        node,
        Vec2::new(base.0, base.1),
        DepthModifier::new(modifier.0, modifier.1),
    );
    (node, spec)
}

fn sway(
    node: NodeId,
    duration: (f32, f32),
    rotation: (f32, f32),
    skew: Option<(f32, f32)>,
) -> AmbientSpec {
    let mut spec = AmbientSpec::new(node)
        .segment(Sample::range(duration.0, duration.1), Ease::SineInOut)
        .to(Property::Rotation, Sample::range(rotation.0, rotation.1));
    if let Some((lo, hi)) = skew {
        spec = spec.to(Property::SkewX, Sample::range(lo, hi));
    }
    spec.yoyo()
}

/// Bobbing water level inside a vessel: no yoyo, each cycle continues from
/// where the previous one ended.
fn water_level(node: NodeId, duration: (f32, f32), y: (f32, f32)) -> AmbientSpec {
    AmbientSpec::new(node)
        .segment(Sample::range(duration.0, duration.1), Ease::Power1InOut)
        .to(Property::TranslateY, Sample::range(y.0, y.1))
}

fn simple(
    registry: &mut NodeRegistry,
    name: &str,
    base: (f32, f32),
    modifier: (f32, f32),
) -> ElementSpec {
    let (node, spec) = layer(registry, name, base, modifier);
    ElementSpec::new(name, node).parallax(spec)
}

fn child(registry: &mut NodeRegistry, name: String, origin: (f32, f32)) -> NodeId {
    registry.register(name, NodeStyle::default().with_origin(origin.0, origin.1))
}

pub fn island(registry: &mut NodeRegistry, config: &SceneConfig) -> Vec<ElementSpec> {
    let mut out = Vec::new();

    out.push(simple(registry, "scene-background", (0.0, 0.0), (0.0, 1.0)));
    out.extend(water(registry));
    out.push(simple(registry, "moon", (820.0, 40.0), (1.0, 1.0)));
    out.extend(clouds(registry, config));
    out.push(island_body(registry));
    out.push(palm_trees(registry));
    out.push(simple(registry, "rocks", (0.0, 0.0), (14.0, 10.0)));
    out.push(foliage(registry));

    let (bottle, spec) = layer(registry, "bottle", (720.0, 326.0), (19.0, 13.0));
    let level = child(registry, "bottle-water-level".into(), (0.0, 0.0));
    out.push(
        ElementSpec::new("bottle", bottle)
            .parallax(spec)
            .ambient(water_level(level, (1.5, 2.5), (-2.0, 2.0))),
    );

    out.push(simple(registry, "campfire", (157.0, 119.0), (15.0, 10.0)));

    let (fire, spec) = layer(registry, "fire", (200.0, 196.0), (15.0, 10.0));
    let flame = child(registry, "fire-flame".into(), (20.0, 40.0));
    out.push(
        ElementSpec::new("fire", fire).parallax(spec).ambient(
            AmbientSpec::new(flame)
                .segment(Sample::range(0.15, 0.35), Ease::SineInOut)
                .to(Property::ScaleY, Sample::range(0.9, 1.1))
                .to(Property::SkewX, Sample::range(-3.0, 3.0))
                .yoyo(),
        ),
    );

    out.push(simple(registry, "mug", (158.0, 270.0), (15.0, 10.0)));
    out.push(simple(registry, "map", (244.0, 296.0), (15.0, 10.0)));
    out.push(clothesline(registry));

    let (plank, spec) = layer(registry, "plank", (380.0, 350.0), (18.0, 11.0));
    let level = child(registry, "plank-water-level".into(), (0.0, 0.0));
    out.push(
        ElementSpec::new("plank", plank)
            .parallax(spec)
            .ambient(water_level(level, (1.5, 2.0), (0.1, 1.0))),
    );

    out
}

fn water(registry: &mut NodeRegistry) -> Vec<ElementSpec> {
    let root = registry.register("water", NodeStyle::at(0.0, 280.0));
    let turbulence = registry.register("water-turbulence", NodeStyle::default());
    let mut out = vec![ElementSpec::new("water", root).ambient(
        AmbientSpec::new(turbulence)
            .segment(Sample::Fixed(3.0), Ease::Linear)
            .to(Property::Hue, Sample::Fixed(180.0))
            .segment(Sample::Fixed(3.0), Ease::Linear)
            .to(Property::Hue, Sample::Fixed(359.0)),
    )];
    for (name, y, mx, my, skew) in WATER_LAYERS {
        let (node, mut spec) = layer(registry, name, (0.0, y), (mx, my));
        if skew {
            spec = spec.channels(Channels::position().with_skew());
        }
        out.push(ElementSpec::new(name, node).parallax(spec));
    }
    out
}

fn clouds(registry: &mut NodeRegistry, config: &SceneConfig) -> Vec<ElementSpec> {
    let speed = config.clouds_speed.max(f32::EPSILON);
    CLOUDS
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let name = format!("cloud-{}", i + 1);
            let node = registry.register(name.clone(), NodeStyle::at(-c.width, c.y));
            ElementSpec::new(name, node).ambient(
                AmbientSpec::new(node)
                    .segment(Sample::Fixed(c.duration * speed), Ease::Linear)
                    .from_to(
                        Property::TranslateX,
                        Sample::Fixed(-c.width),
                        Sample::Fixed(config.scene_size.x),
                    )
                    .repeat_delay(c.repeat_delay as f64)
                    .seek((c.start * speed) as f64),
            )
        })
        .collect()
}

fn island_body(registry: &mut NodeRegistry) -> ElementSpec {
    let (node, spec) = layer(registry, "island", (17.0, 286.0), (15.0, 10.0));
    let mut el = ElementSpec::new("island", node)
        .parallax(spec)
        .lazy(GateOptions::default().with_margin(ISLAND_ROOT_MARGIN_PX));
    for (i, (x, y)) in ISLAND_RIPPLES.into_iter().enumerate() {
        let ripple = registry.register(format!("island-ripple-{i}"), NodeStyle::default());
        el = el.ambient(
            AmbientSpec::new(ripple)
                .segment(Sample::range(1.5, 2.0), Ease::SineInOut)
                .to(Property::TranslateX, Sample::Fixed(x))
                .to(Property::TranslateY, Sample::Fixed(y))
                .to(Property::Opacity, Sample::Fixed(0.0))
                .yoyo(),
        );
    }
    el
}

fn palm_trees(registry: &mut NodeRegistry) -> ElementSpec {
    let (node, spec) = layer(registry, "palm-trees", (0.0, 0.0), (13.0, 10.0));
    let mut el = ElementSpec::new("palm-trees", node).parallax(spec);
    for (t, ((x, y), trunk, leaves)) in PALM_TREES.into_iter().enumerate() {
        let tree = registry.register(
            format!("palm-tree-{}", t + 1),
            NodeStyle::at(x, y).with_origin(trunk.0, trunk.1),
        );
        el = el.ambient(sway(tree, (1.5, 2.5), (-1.0, 1.0), None));
        for g in 0..PALM_LEAF_GROUPS {
            let group = child(registry, format!("palm-tree-{}-leaves-{g}", t + 1), leaves);
            el = el.ambient(sway(group, (1.0, 1.5), (-3.0, 3.0), None));
        }
    }
    el
}

fn foliage(registry: &mut NodeRegistry) -> ElementSpec {
    let (node, spec) = layer(registry, "foliage", (0.0, 0.0), (15.0, 10.0));
    let mut el = ElementSpec::new("foliage", node).parallax(spec);
    for (i, f) in FOLIAGE.into_iter().enumerate() {
        let origin = foliage_origin(f.kind, f.variant);
        let rest = NodeStyle::at(f.x, f.y).with_origin(origin.0, origin.1);
        match f.kind {
            FoliageKind::Grass => {
                let blade = registry.register(format!("grass-{i}"), rest);
                el = el.ambient(sway(blade, (1.0, 1.5), (-1.0, 1.0), Some((-15.0, 15.0))));
            }
            FoliageKind::Plant => {
                let body = registry.register(format!("plant-{i}"), rest);
                el = el.ambient(sway(body, (1.0, 2.0), (-2.0, 2.0), Some((-4.0, 4.0))));
                for g in 0..PLANT_LEAF_GROUPS {
                    let group = child(registry, format!("plant-{i}-leaves-{g}"), origin);
                    el = el.ambient(sway(group, (1.0, 1.5), (-3.0, 3.0), None));
                }
            }
        }
    }
    el
}

fn clothesline(registry: &mut NodeRegistry) -> ElementSpec {
    let (node, spec) = layer(registry, "clothesline", (656.0, 240.0), (16.0, 12.0));
    let line = child(registry, "clothesline-line".into(), (51.0, 79.0));
    let mut el = ElementSpec::new("clothesline", node).parallax(spec).ambient(
        AmbientSpec::new(line)
            .segment(Sample::range(1.5, 2.5), Ease::Power1InOut)
            .to(Property::SkewX, Sample::range(-1.0, 1.0)),
    );
    for i in 1..=TOWEL_COUNT {
        let towel = child(registry, format!("clothesline-towel-{i}"), (8.0, 0.0));
        el = el.ambient(
            AmbientSpec::new(towel)
                .segment(Sample::range(1.5, 2.0), Ease::SineInOut)
                .to(Property::SkewX, Sample::range(-4.0, 4.0)),
        );
    }
    el
}
