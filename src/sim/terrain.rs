//! Two-layer destructible heightfield
//!
//! One entry per world column. Values are screen Y of the layer top, so a
//! larger number means lower ground. `surface` is the visible, collidable
//! top; `substrate` is a denser layer beneath it that the surface cannot
//! sink through. After every mutation:
//! - `SURFACE_MIN <= surface[x] <= SURFACE_MAX`
//! - `SUBSTRATE_MIN <= substrate[x] <= SUBSTRATE_MAX`
//! - `substrate[x] >= surface[x] + LAYER_GAP`

use rand::Rng;

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

const H: i32 = WORLD_HEIGHT as i32;

/// Legal band for the surface layer
pub const SURFACE_MIN: i32 = H - 140;
pub const SURFACE_MAX: i32 = H - 20;
/// Minimum separation between surface and substrate
pub const LAYER_GAP: i32 = 2;
/// Legal band for the substrate layer
pub const SUBSTRATE_MIN: i32 = SURFACE_MIN + LAYER_GAP;
pub const SUBSTRATE_MAX: i32 = H - 6;

/// Band used when generating a fresh surface
const GEN_SURFACE_MIN: i32 = H - 118;
const GEN_SURFACE_MAX: i32 = H - 32;
const GEN_BASELINE: f32 = WORLD_HEIGHT - 70.0;
const GEN_SEGMENTS: usize = 10;
/// Substrate depth below a freshly generated surface
const GEN_SUBSTRATE_GAP: i32 = 10;
/// Separation restored under a direct-impact crater
const CRATER_GAP: i32 = 8;

/// Columns beyond the nominal radius a deformation may visit
const SPAN_PAD: f32 = 2.0;

/// Which layer a deformation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Surface,
    Substrate,
}

#[derive(Debug, Clone)]
pub struct Terrain {
    surface: Vec<i32>,
    substrate: Vec<i32>,
}

impl Terrain {
    /// Uniform terrain at the given heights (clamped into the legal bands)
    pub fn flat(surface: i32, substrate: i32) -> Self {
        let surface = surface.clamp(SURFACE_MIN, SURFACE_MAX);
        let substrate = substrate
            .clamp(SUBSTRATE_MIN, SUBSTRATE_MAX)
            .max(surface + LAYER_GAP);
        Self {
            surface: vec![surface; WORLD_WIDTH],
            substrate: vec![substrate; WORLD_WIDTH],
        }
    }

    /// Random rolling profile: control points with a few hills and dips,
    /// sinusoidal detail, two smoothing passes, then a substrate offset
    pub fn generate(rng: &mut impl Rng) -> Self {
        let mut controls = [0.0f32; GEN_SEGMENTS + 1];
        let baseline = GEN_BASELINE - rng.random_range(4.0..10.0);
        for c in controls.iter_mut() {
            *c = baseline + rng.random_range(-8.0..8.0);
        }
        for _ in 0..2 {
            let idx = pick_control(rng);
            controls[idx] += rng.random_range(28.0..40.0);
        }
        for _ in 0..2 {
            let idx = pick_control(rng);
            controls[idx] -= rng.random_range(18.0..30.0);
        }

        let segment_width = WORLD_WIDTH as f32 / GEN_SEGMENTS as f32;
        let mut surface: Vec<i32> = (0..WORLD_WIDTH)
            .map(|x| {
                let fx = x as f32;
                let seg = ((fx / segment_width) as usize).min(GEN_SEGMENTS - 1);
                let t = (fx - seg as f32 * segment_width) / segment_width;
                let (start, end) = (controls[seg], controls[seg + 1]);
                let mut base = start + (end - start) * t;
                base += (fx * 0.07 + start * 0.02).sin() * 3.0;
                base += (fx * 0.18 + end * 0.015).sin() * 2.0;
                base.round() as i32
            })
            .collect();

        for _ in 0..2 {
            let prev = surface.clone();
            for x in 1..WORLD_WIDTH - 1 {
                let smoothed =
                    prev[x] as f32 * 0.6 + prev[x - 1] as f32 * 0.2 + prev[x + 1] as f32 * 0.2;
                surface[x] = smoothed.round() as i32;
            }
        }
        for h in surface.iter_mut() {
            *h = (*h).clamp(GEN_SURFACE_MIN, GEN_SURFACE_MAX);
        }

        let substrate = surface
            .iter()
            .map(|&s| {
                let base = (s as f32 + rng.random_range(14.0..22.0)).min((H - 14) as f32);
                (base.round() as i32).max(s + GEN_SUBSTRATE_GAP)
            })
            .collect();

        Self { surface, substrate }
    }

    pub fn surface(&self) -> &[i32] {
        &self.surface
    }

    pub fn substrate(&self) -> &[i32] {
        &self.substrate
    }

    pub fn width(&self) -> usize {
        self.surface.len()
    }

    /// Interpolated surface height at any x (clamped to the world)
    pub fn height_at(&self, x: f32) -> f32 {
        sample(&self.surface, x)
    }

    /// Parabolic-falloff deformation of one layer, keeping the layer gap.
    /// A deepened surface stops at the substrate.
    pub fn deform(&mut self, layer: Layer, center_x: f32, radius: f32, depth: f32) {
        let Some((start, end)) = span(center_x, radius) else {
            return;
        };
        match layer {
            Layer::Surface => {
                deform_layer(&mut self.surface, center_x, radius, depth, SURFACE_MIN, SURFACE_MAX)
            }
            Layer::Substrate => deform_layer(
                &mut self.substrate,
                center_x,
                radius,
                depth,
                SUBSTRATE_MIN,
                SUBSTRATE_MAX,
            ),
        }
        self.hold_surface_above_substrate(start, end);
    }

    /// Direct-impact crater: sqrt falloff on the surface, substrate pushed
    /// down by a fraction of the drop
    pub fn carve_crater(&mut self, center_x: f32, radius: f32, depth: f32) {
        if !valid_shape(radius, depth) {
            return;
        }
        let Some((start, end)) = span(center_x, radius) else {
            return;
        };
        let radius_sq = radius * radius;
        for x in start..=end {
            let dx = x as f32 - center_x;
            let dist_sq = dx * dx;
            if dist_sq > radius_sq {
                continue;
            }
            let drop = depth * (1.0 - dist_sq / radius_sq).max(0.0).sqrt();
            let surface = (self.surface[x] + drop.round() as i32).min(SURFACE_MAX);
            let substrate = (self.substrate[x] + (drop * 0.35).round() as i32)
                .min(SUBSTRATE_MAX)
                .max(surface + CRATER_GAP);
            self.surface[x] = surface;
            self.substrate[x] = substrate;
        }
    }

    /// Layered erosion: the surface takes the full hit, the substrate a
    /// narrower, shallower one; the surface then cannot sit below the
    /// substrate
    pub fn erode_layers(&mut self, center_x: f32, radius: f32, depth: f32) {
        if !valid_shape(radius, depth) {
            return;
        }
        deform_layer(&mut self.surface, center_x, radius, depth, SURFACE_MIN, SURFACE_MAX);
        deform_layer(
            &mut self.substrate,
            center_x,
            radius * 0.7,
            depth * 0.35,
            SUBSTRATE_MIN,
            SUBSTRATE_MAX,
        );
        if let Some((start, end)) = span(center_x, radius) {
            self.hold_surface_above_substrate(start, end);
        }
    }

    fn hold_surface_above_substrate(&mut self, start: usize, end: usize) {
        for x in start..=end {
            self.surface[x] = self.surface[x].min(self.substrate[x] - LAYER_GAP);
        }
    }
}

/// Interior control point index
fn pick_control(rng: &mut impl Rng) -> usize {
    let raw = rng.random_range(1.0..(GEN_SEGMENTS - 1) as f32) as usize;
    raw.clamp(1, GEN_SEGMENTS - 1)
}

fn valid_shape(radius: f32, depth: f32) -> bool {
    radius.is_finite() && depth.is_finite() && radius > 0.0 && depth > 0.0
}

/// Column range a deformation centered at `center_x` may touch
fn span(center_x: f32, radius: f32) -> Option<(usize, usize)> {
    if !center_x.is_finite() || !radius.is_finite() {
        return None;
    }
    let last = WORLD_WIDTH as i64 - 1;
    let start = ((center_x - radius - SPAN_PAD).floor() as i64).max(0);
    let end = ((center_x + radius + SPAN_PAD).ceil() as i64).min(last);
    (start <= end).then_some((start as usize, end as usize))
}

fn deform_layer(layer: &mut [i32], center_x: f32, radius: f32, depth: f32, min: i32, max: i32) {
    if !valid_shape(radius, depth) {
        return;
    }
    let Some((start, end)) = span(center_x, radius) else {
        return;
    };
    for x in start..=end.min(layer.len().saturating_sub(1)) {
        let dist = (x as f32 - center_x).abs();
        if dist > radius {
            continue;
        }
        let t = dist / radius;
        let delta = depth * (1.0 - t * t);
        layer[x] += delta.round() as i32;
    }
    for h in layer.iter_mut() {
        *h = (*h).clamp(min, max);
    }
}

fn sample(layer: &[i32], x: f32) -> f32 {
    if layer.is_empty() {
        return WORLD_HEIGHT - 1.0;
    }
    let last = layer.len() - 1;
    let clamped = if x.is_nan() { 0.0 } else { x.clamp(0.0, last as f32) };
    let x0 = clamped.floor() as usize;
    let x1 = (x0 + 1).min(last);
    let t = clamped - x0 as f32;
    let (h0, h1) = (layer[x0] as f32, layer[x1] as f32);
    h0 + (h1 - h0) * t
}
