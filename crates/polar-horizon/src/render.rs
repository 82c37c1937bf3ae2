//! Overlay rendering.
//!
//! [`draw_commands`] turns the geometry state into a flat list of primitives;
//! it never touches pixels. [`rasterize`] burns those primitives into an
//! `image::RgbImage` with `imageproc`, used for previews and tests.
//! Interactive front-ends are expected to consume the command list directly.
//!
//! Text commands are not rasterized: the workspace ships no font, and labels
//! are left to front-ends that have one.

use ::image::Rgb;
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use nalgebra::{Point2, Vector2};
use polar_horizon_core::{CoordinateMapper, HorizonPoint};

pub type Color = [u8; 3];

pub const YELLOW: Color = [255, 255, 0];
pub const RED: Color = [255, 0, 0];
pub const GREEN: Color = [0, 255, 0];
pub const BLACK: Color = [0, 0, 0];
pub const WHITE: Color = [255, 255, 255];

const ZENITH_CROSS_HALF: f32 = 15.0;
const LABEL_INSET: f32 = 25.0;
const POINT_RADIUS: f32 = 3.0;
const DASH_PX: f32 = 4.0;
/// Start arrow: fraction of the horizon radius, swept bearings, segments.
const ARROW_RADIUS_FRAC: f32 = 0.35;
const ARROW_SWEEP_DEG: f32 = 55.0;
const ARROW_SEGMENTS: usize = 11;
const ARROW_HEAD_PX: f32 = 10.0;

/// Compass labels, placed along their bearing near the canvas edge.
const COMPASS_LABELS: [(&str, f32); 4] = [
    ("359(N)", 0.0),
    ("90(E)", 90.0),
    ("180(S)", 180.0),
    ("270(W)", 270.0),
];

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: Point2<f32>,
        radius: f32,
        color: Color,
    },
    Line {
        from: Point2<f32>,
        to: Point2<f32>,
        color: Color,
        dashed: bool,
    },
    Dot {
        at: Point2<f32>,
        radius: f32,
        color: Color,
    },
    Text {
        at: Point2<f32>,
        text: String,
        color: Color,
    },
}

/// Everything the overlay needs, borrowed from the session.
#[derive(Clone, Copy, Debug)]
pub struct OverlayInput<'a> {
    pub mapper: CoordinateMapper,
    pub canvas_size: usize,
    pub path: &'a [HorizonPoint],
    pub reference: &'a [HorizonPoint],
}

/// Build the overlay, back to front: guides, reference, traced path, limiter.
pub fn draw_commands(input: &OverlayInput<'_>) -> Vec<DrawCommand> {
    let mapper = &input.mapper;
    let c = mapper.center();
    let size = input.canvas_size as f32;
    let mut cmds = Vec::new();

    // Guides.
    cmds.push(DrawCommand::Circle {
        center: c,
        radius: mapper.horizon_radius(),
        color: YELLOW,
    });
    cmds.push(DrawCommand::Line {
        from: c,
        to: Point2::new(c.x, size),
        color: BLACK,
        dashed: false,
    });
    cmds.push(DrawCommand::Line {
        from: Point2::new(c.x - ZENITH_CROSS_HALF, c.y),
        to: Point2::new(c.x + ZENITH_CROSS_HALF, c.y),
        color: WHITE,
        dashed: false,
    });
    cmds.push(DrawCommand::Line {
        from: Point2::new(c.x, c.y - ZENITH_CROSS_HALF),
        to: Point2::new(c.x, c.y + ZENITH_CROSS_HALF),
        color: WHITE,
        dashed: false,
    });
    let label_r = (size / 2.0 - LABEL_INSET).max(0.0);
    for (text, az) in COMPASS_LABELS {
        let a = az.to_radians();
        cmds.push(DrawCommand::Text {
            at: Point2::new(c.x + label_r * a.sin(), c.y + label_r * a.cos()),
            text: text.to_string(),
            color: if az == 0.0 { YELLOW } else { WHITE },
        });
    }
    cmds.push(DrawCommand::Text {
        at: Point2::new(c.x + ZENITH_CROSS_HALF, c.y - 2.0 * ZENITH_CROSS_HALF),
        text: "Zenith".to_string(),
        color: WHITE,
    });
    start_arrow(mapper, &mut cmds);

    // Reference overlay: dashed, no markers.
    let reference: Vec<Point2<f32>> = input
        .reference
        .iter()
        .map(|&p| mapper.angle_to_pixel(p))
        .collect();
    for pair in reference.windows(2) {
        cmds.push(DrawCommand::Line {
            from: pair[0],
            to: pair[1],
            color: RED,
            dashed: true,
        });
    }

    // Traced path: polyline plus point markers.
    let traced: Vec<Point2<f32>> = input
        .path
        .iter()
        .map(|&p| mapper.angle_to_pixel(p))
        .collect();
    for pair in traced.windows(2) {
        cmds.push(DrawCommand::Line {
            from: pair[0],
            to: pair[1],
            color: GREEN,
            dashed: false,
        });
    }
    for &at in &traced {
        cmds.push(DrawCommand::Dot {
            at,
            radius: POINT_RADIUS,
            color: GREEN,
        });
    }

    // Limiter: the bearing the next point has to stay below.
    if let Some(&last) = traced.last() {
        cmds.push(DrawCommand::Line {
            from: c,
            to: last,
            color: RED,
            dashed: false,
        });
    }

    cmds
}

/// Arc from the north line towards lower bearings, an arrowhead at its end
/// and the start caption: the direction the trace has to run in.
fn start_arrow(mapper: &CoordinateMapper, cmds: &mut Vec<DrawCommand>) {
    let c = mapper.center();
    let r = mapper.horizon_radius() * ARROW_RADIUS_FRAC;
    let at = |bearing_deg: f32| {
        let a = bearing_deg.to_radians();
        Point2::new(c.x + r * a.sin(), c.y + r * a.cos())
    };

    let step = ARROW_SWEEP_DEG / ARROW_SEGMENTS as f32;
    for i in 0..ARROW_SEGMENTS {
        cmds.push(DrawCommand::Line {
            from: at(-(i as f32) * step),
            to: at(-((i + 1) as f32) * step),
            color: BLACK,
            dashed: false,
        });
    }

    // Heading of travel at the tip (bearing decreasing) and the radial axis.
    let tip_bearing = (-ARROW_SWEEP_DEG).to_radians();
    let tip = at(-ARROW_SWEEP_DEG);
    let heading = Vector2::new(-tip_bearing.cos(), tip_bearing.sin());
    let radial = Vector2::new(tip_bearing.sin(), tip_bearing.cos());
    for side in [-0.5_f32, 0.5] {
        cmds.push(DrawCommand::Line {
            from: tip,
            to: tip - heading * ARROW_HEAD_PX + radial * (side * ARROW_HEAD_PX),
            color: BLACK,
            dashed: false,
        });
    }

    cmds.push(DrawCommand::Text {
        at: Point2::new(c.x + 10.0, c.y + r + 5.0),
        text: "START \u{2192}".to_string(),
        color: BLACK,
    });
}

/// Burn commands into `target`. Text is skipped; anything outside the canvas
/// is clipped by `imageproc`.
pub fn rasterize(commands: &[DrawCommand], target: &mut ::image::RgbImage) {
    for cmd in commands {
        match cmd {
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => {
                if finite(*center) && radius.is_finite() && *radius > 0.0 {
                    draw_hollow_circle_mut(
                        target,
                        pixel(*center),
                        radius.round() as i32,
                        Rgb(*color),
                    );
                }
            }
            DrawCommand::Line {
                from,
                to,
                color,
                dashed,
            } => draw_line(target, *from, *to, Rgb(*color), *dashed),
            DrawCommand::Dot { at, radius, color } => {
                if finite(*at) && radius.is_finite() {
                    draw_filled_circle_mut(target, pixel(*at), radius.round() as i32, Rgb(*color));
                }
            }
            DrawCommand::Text { .. } => {}
        }
    }
}

fn finite(p: Point2<f32>) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

fn pixel(p: Point2<f32>) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

fn draw_line(
    target: &mut ::image::RgbImage,
    from: Point2<f32>,
    to: Point2<f32>,
    color: Rgb<u8>,
    dashed: bool,
) {
    if !finite(from) || !finite(to) {
        return;
    }
    if !dashed {
        draw_line_segment_mut(target, (from.x, from.y), (to.x, to.y), color);
        return;
    }
    // Dashes of DASH_PX pixels, gaps of the same length.
    let d = to - from;
    let len = d.norm();
    if len == 0.0 {
        draw_line_segment_mut(target, (from.x, from.y), (to.x, to.y), color);
        return;
    }
    let dir = d / len;
    let mut s = 0.0;
    while s <= len {
        let a = from + dir * s;
        let b = from + dir * (s + DASH_PX - 1.0).min(len);
        draw_line_segment_mut(target, (a.x, a.y), (b.x, b.y), color);
        s += 2.0 * DASH_PX;
    }
}
