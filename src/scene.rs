//! The night-train scene: a fixed set of procedurally drawn elements (moon,
//! stars, mountains, trees, track, train, smoke) plus the parallax actors that
//! keep them moving. Geometry is built once; after that only node position,
//! rotation, scale and alpha change.

use crate::{
    actor::{Actor, Axis, Oscillator, Puff, PuffStream, Rotator, Scroller, WrapRule},
    animator::Animator,
    core::{Point, Rgba8, Rng64, Vec2, Viewport},
    error::NightrailResult,
    node::{DisplayNode, NodeId, Shape, Stage},
    shapes, svg,
};

const BACKGROUND: u32 = 0x021F4B;

const MOON_SVG: &[u8] = include_bytes!("../assets/moon.svg");

const STAR_COUNT: usize = 20;
const STAR_COLOR: u32 = 0xFFDF00;

const MOUNTAIN_SPEED: f64 = 0.5;
const MOUNTAIN_COLOR_LEFT: u32 = 0xC1C0C2;
const MOUNTAIN_COLOR_MIDDLE: u32 = 0x7E818F;
const MOUNTAIN_COLOR_RIGHT: u32 = 0x8C919F;

const TREE_WIDTH: f64 = 200.0;
const TREE_SPACING: f64 = 15.0;
const TREE_SPEED: f64 = 3.0;
const TREE_CROWN_COLOR: u32 = 0x264D3D;
const TREE_TRUNK_COLOR: u32 = 0x563929;

const GROUND_HEIGHT: f64 = 20.0;
const GROUND_COLOR: u32 = 0xDDDDDD;
const TRACK_HEIGHT: f64 = 15.0;
const PLANK_WIDTH: f64 = 50.0;
const PLANK_GAP: f64 = 20.0;
const PLANK_SPEED: f64 = 6.0;
const PLANK_COLOR: u32 = 0x241811;
const RAIL_COLOR: u32 = 0x5C5C5C;

const TRAIN_SCALE: f64 = 0.75;
const TRAIN_BOB_AMPLITUDE: f64 = 3.0;
const TRAIN_BOB_FREQ: f64 = 0.25;
const WHEEL_RATE: f64 = 0.15;
const BIG_WHEEL_RADIUS: f64 = 55.0;
const SMALL_WHEEL_RADIUS: f64 = 35.0;

const CABIN_WIDTH: f64 = 150.0;
const CABIN_HEIGHT: f64 = 200.0;
const CABIN_RADIUS: f64 = 15.0;
const FRONT_WIDTH: f64 = 140.0;
const FRONT_HEIGHT: f64 = 100.0;
const ROOF_EXCESS: f64 = 20.0;

const COLOR_DARK_IRON: u32 = 0x121212;
const COLOR_FRONT: u32 = 0x7F3333;
const COLOR_CABIN: u32 = 0x725F19;
const COLOR_TRIM: u32 = 0x52431C;
const COLOR_STEEL: u32 = 0x848484;
const COLOR_SPOKE: u32 = 0x4F4F4F;

const SMOKE_GROUP_COUNT: usize = 5;
const SMOKE_PARTICLE_COUNT: usize = 7;
const SMOKE_COLOR: u32 = 0xC9C9C9;
const SMOKE_RATE: f64 = 0.01;
const SMOKE_DRIFT: Vec2 = Vec2::new(400.0, 200.0);

/// A fully constructed scene: display state plus the animator driving it.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Scene {
    pub viewport: Viewport,
    pub background: Rgba8,
    pub stage: Stage,
    pub animator: Animator,
}

impl Scene {
    /// Build the night-train scene with the bundled moon asset.
    pub fn night_train(viewport: Viewport, seed: u64) -> NightrailResult<Self> {
        Self::night_train_with_moon(viewport, seed, MOON_SVG)
    }

    /// Build the night-train scene with a caller-supplied moon SVG. The same
    /// viewport and seed always produce the same scene.
    #[tracing::instrument(skip(moon_svg))]
    pub fn night_train_with_moon(
        viewport: Viewport,
        seed: u64,
        moon_svg: &[u8],
    ) -> NightrailResult<Self> {
        let mut stage = Stage::new();
        let mut animator = Animator::new();
        let mut rng = Rng64::new(seed);

        add_moon(&mut stage, viewport, moon_svg)?;
        add_stars(&mut stage, viewport, &mut rng);
        add_mountains(&mut stage, &mut animator, viewport)?;
        add_trees(&mut stage, &mut animator, viewport, &mut rng)?;
        add_ground(&mut stage, &mut animator, viewport)?;
        let (_, train_x, train_y) = add_train(&mut stage, &mut animator, viewport)?;
        add_smoke(&mut stage, &mut animator, train_x, train_y, &mut rng)?;

        Ok(Self {
            viewport,
            background: Rgba8::from_rgb(BACKGROUND),
            stage,
            animator,
        })
    }

    /// Advance the scene by one host tick. `delta` is the elapsed-time
    /// multiplier relative to the reference frame rate (1.0 = one frame).
    pub fn tick(&mut self, delta: f64) -> NightrailResult<()> {
        self.animator.advance(&mut self.stage, delta)
    }
}

fn add_moon(stage: &mut Stage, viewport: Viewport, moon_svg: &[u8]) -> NightrailResult<NodeId> {
    let tree = svg::parse_svg(moon_svg)?;
    let raster = svg::rasterize_svg(&tree, 1.0)?;
    let node = DisplayNode::with_shapes(vec![Shape::Raster(raster)]).at(
        viewport.width_f64() * 0.6,
        viewport.height_f64() / 8.0,
    );
    Ok(stage.add(node))
}

fn add_stars(stage: &mut Stage, viewport: Viewport, rng: &mut Rng64) -> NodeId {
    let (w, h) = (viewport.width_f64(), viewport.height_f64());
    let mut star_shapes = Vec::with_capacity(STAR_COUNT);

    for index in 0..STAR_COUNT {
        // Deterministic scatter; radius and rotation are seeded.
        let x = (index as f64 * 0.78695 * w) % w;
        let y = (index as f64 * 0.9382 * h) % h;
        let radius = rng.next_f64_range(2.0, 5.0);
        let rotation = rng.next_f64_range(0.0, std::f64::consts::TAU);

        star_shapes.push(Shape::Fill {
            path: shapes::star(x, y, 5, radius, radius / 2.0, rotation),
            color: Rgba8::from_rgb(STAR_COLOR).with_alpha(radius / 5.0),
        });
    }

    stage.add(DisplayNode::with_shapes(star_shapes))
}

fn mountain_group(viewport: Viewport) -> DisplayNode {
    let (w, h) = (viewport.width_f64(), viewport.height_f64());
    let width = w / 2.0;
    let base_y = h;

    // Middle first so the taller mound sits behind its neighbours' overlap.
    DisplayNode::with_shapes(vec![
        Shape::Fill {
            path: shapes::hill(w / 4.0, base_y, width, h * 4.0 / 5.0),
            color: Rgba8::from_rgb(MOUNTAIN_COLOR_MIDDLE),
        },
        Shape::Fill {
            path: shapes::hill(0.0, base_y, width, h / 2.0),
            color: Rgba8::from_rgb(MOUNTAIN_COLOR_LEFT),
        },
        Shape::Fill {
            path: shapes::hill(w / 2.0, base_y, width, h * 2.0 / 3.0),
            color: Rgba8::from_rgb(MOUNTAIN_COLOR_RIGHT),
        },
    ])
}

fn add_mountains(
    stage: &mut Stage,
    animator: &mut Animator,
    viewport: Viewport,
) -> NightrailResult<()> {
    let w = viewport.width_f64();

    // Two identical groups, one starting off screen; each wraps a full two
    // screen-widths forward once it has scrolled out on the left.
    let group1 = stage.add(mountain_group(viewport));
    let group2 = stage.add(mountain_group(viewport).at(w, 0.0));

    animator.push(Actor::Scroller(Scroller {
        nodes: vec![group1, group2],
        speed: MOUNTAIN_SPEED,
        wrap: WrapRule {
            axis: Axis::X,
            threshold: -w,
            offset: w * 2.0,
        },
    }))
}

fn tree(width: f64, height: f64) -> DisplayNode {
    let trunk_width = 30.0;
    let trunk_height = height / 4.0;

    let crown_height = height - trunk_height;
    let crown_levels = 4usize;
    let level_height = crown_height / crown_levels as f64;
    let width_increment = width / crown_levels as f64;

    let mut tree_shapes = vec![Shape::Fill {
        path: shapes::rect(-trunk_width / 2.0, -trunk_height, trunk_width, trunk_height),
        color: Rgba8::from_rgb(TREE_TRUNK_COLOR),
    }];

    for index in 0..crown_levels {
        let y = -trunk_height - level_height * index as f64;
        let level_width = width - width_increment * index as f64;
        // Lower layers tuck under the one above; the top layer ends in a point.
        let overlap = if index < crown_levels - 1 {
            level_height / 2.0
        } else {
            0.0
        };

        tree_shapes.push(Shape::Fill {
            path: shapes::triangle(
                Point::new(-level_width / 2.0, y),
                Point::new(0.0, y - level_height - overlap),
                Point::new(level_width / 2.0, y),
            ),
            color: Rgba8::from_rgb(TREE_CROWN_COLOR),
        });
    }

    DisplayNode::with_shapes(tree_shapes)
}

fn add_trees(
    stage: &mut Stage,
    animator: &mut Animator,
    viewport: Viewport,
    rng: &mut Rng64,
) -> NightrailResult<()> {
    let (w, h) = (viewport.width_f64(), viewport.height_f64());
    let tile = TREE_WIDTH + TREE_SPACING;
    let count = (w / tile + 1.0).ceil() as usize;
    let base_y = h - GROUND_HEIGHT;

    let mut nodes = Vec::with_capacity(count);
    for index in 0..count {
        let tree_height = rng.next_f64_range(225.0, 275.0);
        nodes.push(stage.add(tree(TREE_WIDTH, tree_height).at(index as f64 * tile, base_y)));
    }

    animator.push(Actor::Scroller(Scroller {
        nodes,
        speed: TREE_SPEED,
        wrap: WrapRule {
            axis: Axis::X,
            threshold: -(TREE_WIDTH / 2.0 + TREE_SPACING),
            offset: count as f64 * tile + TREE_SPACING * 3.0,
        },
    }))
}

fn add_ground(
    stage: &mut Stage,
    animator: &mut Animator,
    viewport: Viewport,
) -> NightrailResult<()> {
    let (w, h) = (viewport.width_f64(), viewport.height_f64());

    stage.add(DisplayNode::with_shapes(vec![Shape::Fill {
        path: shapes::rect(0.0, h - GROUND_HEIGHT, w, GROUND_HEIGHT),
        color: Rgba8::from_rgb(GROUND_COLOR),
    }]));

    let plank_height = TRACK_HEIGHT / 2.0;
    let plank_y = h - GROUND_HEIGHT;
    let tile = PLANK_WIDTH + PLANK_GAP;
    let count = (w / tile + 1.0).ceil() as usize;

    let mut planks = Vec::with_capacity(count);
    for index in 0..count {
        let plank = DisplayNode::with_shapes(vec![Shape::Fill {
            path: shapes::rect(0.0, plank_y - plank_height, PLANK_WIDTH, plank_height),
            color: Rgba8::from_rgb(PLANK_COLOR),
        }])
        .at(index as f64 * tile, 0.0);
        planks.push(stage.add(plank));
    }

    // The rail and ground are uniform strips, so only the planks scroll.
    let rail_height = TRACK_HEIGHT / 2.0;
    let rail_y = plank_y - plank_height;
    stage.add(DisplayNode::with_shapes(vec![Shape::Fill {
        path: shapes::rect(0.0, rail_y - rail_height, w, rail_height),
        color: Rgba8::from_rgb(RAIL_COLOR),
    }]));

    animator.push(Actor::Scroller(Scroller {
        nodes: planks,
        speed: PLANK_SPEED,
        wrap: WrapRule {
            axis: Axis::X,
            threshold: -tile,
            offset: count as f64 * tile + PLANK_GAP * 1.5,
        },
    }))
}

fn wheel_shapes(radius: f64) -> Vec<Shape> {
    let stroke = radius / 3.0;
    let inner = radius - stroke;

    vec![
        Shape::Fill {
            path: shapes::circle(0.0, 0.0, radius),
            color: Rgba8::from_rgb(COLOR_STEEL),
        },
        // Tyre sits inside the outer radius.
        Shape::Fill {
            path: shapes::ring(0.0, 0.0, radius, inner),
            color: Rgba8::from_rgb(COLOR_DARK_IRON),
        },
        Shape::Fill {
            path: shapes::rect(-stroke / 2.0, -inner, stroke, inner * 2.0),
            color: Rgba8::from_rgb(COLOR_SPOKE),
        },
        Shape::Fill {
            path: shapes::rect(-inner, -stroke / 2.0, inner * 2.0, stroke),
            color: Rgba8::from_rgb(COLOR_SPOKE),
        },
    ]
}

fn train_head_shapes() -> Vec<Shape> {
    let front_radius = FRONT_HEIGHT / 2.0;

    let chimney_base_width = 30.0;
    let chimney_top_width = 50.0;
    let chimney_height = 70.0;
    let chimney_dome_height = 25.0;
    let chimney_top_offset = (chimney_top_width - chimney_base_width) / 2.0;
    let chimney_start_x = CABIN_WIDTH + FRONT_WIDTH - front_radius - chimney_base_width;
    let chimney_start_y = -FRONT_HEIGHT;

    let mut chimney = kurbo::BezPath::new();
    chimney.move_to((chimney_start_x, chimney_start_y));
    chimney.line_to((
        chimney_start_x - chimney_top_offset,
        chimney_start_y - chimney_height + chimney_dome_height,
    ));
    chimney.quad_to(
        (
            chimney_start_x + chimney_base_width / 2.0,
            chimney_start_y - chimney_height - chimney_dome_height,
        ),
        (
            chimney_start_x + chimney_base_width + chimney_top_offset,
            chimney_start_y - chimney_height + chimney_dome_height,
        ),
    );
    chimney.line_to((chimney_start_x + chimney_base_width, chimney_start_y));
    chimney.close_path();

    let roof_height = 25.0;

    let door_width = CABIN_WIDTH * 0.7;
    let door_height = CABIN_HEIGHT * 0.7;
    let door_start_x = (CABIN_WIDTH - door_width) * 0.5;
    let door_start_y = -(CABIN_HEIGHT - door_height) * 0.5 - door_height;

    let window_width = door_width * 0.8;
    let window_height = door_height * 0.4;
    let window_offset = (door_width - window_width) / 2.0;

    vec![
        Shape::Fill {
            path: chimney,
            color: Rgba8::from_rgb(COLOR_DARK_IRON),
        },
        Shape::Fill {
            path: shapes::rounded_rect(
                CABIN_WIDTH - front_radius - CABIN_RADIUS,
                -FRONT_HEIGHT,
                FRONT_WIDTH + front_radius + CABIN_RADIUS,
                FRONT_HEIGHT,
                front_radius,
            ),
            color: Rgba8::from_rgb(COLOR_FRONT),
        },
        Shape::Fill {
            path: shapes::rounded_rect(0.0, -CABIN_HEIGHT, CABIN_WIDTH, CABIN_HEIGHT, CABIN_RADIUS),
            color: Rgba8::from_rgb(COLOR_CABIN),
        },
        Shape::Fill {
            path: shapes::rect(
                -ROOF_EXCESS / 2.0,
                CABIN_RADIUS - CABIN_HEIGHT - roof_height,
                CABIN_WIDTH + ROOF_EXCESS,
                roof_height,
            ),
            color: Rgba8::from_rgb(COLOR_TRIM),
        },
        Shape::Fill {
            path: shapes::rounded_rect_ring(
                door_start_x,
                door_start_y,
                door_width,
                door_height,
                CABIN_RADIUS,
                3.0,
            ),
            color: Rgba8::from_rgb(COLOR_TRIM),
        },
        Shape::Fill {
            path: shapes::rounded_rect(
                door_start_x + window_offset,
                door_start_y + window_offset,
                window_width,
                window_height,
                10.0,
            ),
            color: Rgba8::from_rgb(COLOR_STEEL),
        },
    ]
}

fn carriage_shapes() -> Vec<Shape> {
    let body_height = 125.0;
    let body_width = 200.0;
    let body_radius = 15.0;
    let edge_height = 25.0;
    let edge_excess = 20.0;
    let connector_width = 30.0;
    let connector_height = 10.0;
    let connector_gap = 10.0;
    let connector_offset_y = 20.0;

    vec![
        Shape::Fill {
            path: shapes::rounded_rect(
                edge_excess / 2.0,
                -body_height,
                body_width,
                body_height,
                body_radius,
            ),
            color: Rgba8::from_rgb(COLOR_CABIN),
        },
        Shape::Fill {
            path: shapes::rect(
                0.0,
                body_radius - body_height - edge_height,
                body_width + edge_excess,
                edge_height,
            ),
            color: Rgba8::from_rgb(COLOR_TRIM),
        },
        Shape::Fill {
            path: shapes::rect(
                body_width + edge_excess / 2.0,
                -connector_offset_y - connector_height,
                connector_width,
                connector_height,
            ),
            color: Rgba8::from_rgb(COLOR_DARK_IRON),
        },
        Shape::Fill {
            path: shapes::rect(
                body_width + edge_excess / 2.0,
                -connector_offset_y - connector_height * 2.0 - connector_gap,
                connector_width,
                connector_height,
            ),
            color: Rgba8::from_rgb(COLOR_DARK_IRON),
        },
    ]
}

fn add_train(
    stage: &mut Stage,
    animator: &mut Animator,
    viewport: Viewport,
) -> NightrailResult<(NodeId, f64, f64)> {
    let (w, h) = (viewport.width_f64(), viewport.height_f64());

    // Local width of the head graphics, roof overhang included.
    let head_width = CABIN_WIDTH + FRONT_WIDTH + ROOF_EXCESS / 2.0;
    let train_x = w / 2.0 - head_width / 2.0;
    let base_y = h - 35.0 - BIG_WHEEL_RADIUS * TRAIN_SCALE;

    let mut container = DisplayNode::new().at(train_x, base_y);
    container.scale = TRAIN_SCALE;
    let train = stage.add(container);

    // Head with one big and two small wheels.
    let head = stage.add_child(train, DisplayNode::with_shapes(train_head_shapes()))?;

    let wheel_gap = 5.0;
    let wheel_offset_y = 5.0;
    let back_x = BIG_WHEEL_RADIUS;
    let mid_x = back_x + BIG_WHEEL_RADIUS + SMALL_WHEEL_RADIUS + wheel_gap;
    let mid_y = wheel_offset_y + BIG_WHEEL_RADIUS - SMALL_WHEEL_RADIUS;
    let front_x = mid_x + SMALL_WHEEL_RADIUS * 2.0 + wheel_gap;

    let back_wheel = stage.add_child(
        head,
        DisplayNode::with_shapes(wheel_shapes(BIG_WHEEL_RADIUS)).at(back_x, wheel_offset_y),
    )?;
    let mid_wheel = stage.add_child(
        head,
        DisplayNode::with_shapes(wheel_shapes(SMALL_WHEEL_RADIUS)).at(mid_x, mid_y),
    )?;
    let front_wheel = stage.add_child(
        head,
        DisplayNode::with_shapes(wheel_shapes(SMALL_WHEEL_RADIUS)).at(front_x, mid_y),
    )?;

    // Carriage behind the head, with two equal wheels.
    let carriage_width = 240.0;
    let carriage = stage.add_child(
        train,
        DisplayNode::with_shapes(carriage_shapes()).at(-carriage_width, 0.0),
    )?;

    let center_x = (200.0 + 20.0) / 2.0;
    let offset_x = SMALL_WHEEL_RADIUS + 40.0 / 2.0;
    let car_back = stage.add_child(
        carriage,
        DisplayNode::with_shapes(wheel_shapes(SMALL_WHEEL_RADIUS)).at(center_x - offset_x, 25.0),
    )?;
    let car_front = stage.add_child(
        carriage,
        DisplayNode::with_shapes(wheel_shapes(SMALL_WHEEL_RADIUS)).at(center_x + offset_x, 25.0),
    )?;

    // The big wheel turns proportionally slower than the small ones.
    animator.push(Actor::Rotator(Rotator {
        nodes: vec![
            (back_wheel, WHEEL_RATE * SMALL_WHEEL_RADIUS / BIG_WHEEL_RADIUS),
            (mid_wheel, WHEEL_RATE),
            (front_wheel, WHEEL_RATE),
            (car_back, WHEEL_RATE),
            (car_front, WHEEL_RATE),
        ],
    }))?;

    animator.push(Actor::Oscillator(Oscillator {
        node: train,
        base: base_y,
        amplitude: TRAIN_BOB_AMPLITUDE,
        freq: TRAIN_BOB_FREQ,
        elapsed: 0.0,
    }))?;

    Ok((train, train_x, base_y))
}

fn add_smoke(
    stage: &mut Stage,
    animator: &mut Animator,
    train_x: f64,
    train_y: f64,
    rng: &mut Rng64,
) -> NightrailResult<()> {
    // Emission point above the chimney, relative to the train's resting pose.
    let base = Point::new(train_x + 170.0, train_y - 120.0);

    let mut puffs = Vec::with_capacity(SMOKE_GROUP_COUNT);
    for index in 0..SMOKE_GROUP_COUNT {
        let mut puff_shapes = Vec::with_capacity(SMOKE_PARTICLE_COUNT);
        for _ in 0..SMOKE_PARTICLE_COUNT {
            let radius = rng.next_f64_range(20.0, 40.0);
            let x = rng.next_f64_range(-40.0, 40.0);
            let y = rng.next_f64_range(-40.0, 40.0);
            puff_shapes.push(Shape::Fill {
                path: shapes::circle(x, y, radius),
                color: Rgba8::from_rgb(SMOKE_COLOR),
            });
        }

        let node = stage.add(DisplayNode::with_shapes(puff_shapes).at(base.x, base.y));
        puffs.push(Puff {
            node,
            // Evenly staggered phases keep the stream continuous.
            progress: index as f64 / SMOKE_GROUP_COUNT as f64,
        });
    }

    animator.push(Actor::PuffStream(PuffStream {
        base,
        drift: SMOKE_DRIFT,
        rate: SMOKE_RATE,
        puffs,
    }))
}
