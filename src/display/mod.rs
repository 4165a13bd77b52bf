mod canvas;
mod raster;

pub use canvas::Canvas;

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Native panel resolution (both eyes use identical square panels)
pub const CANVAS_WIDTH: u32 = 240;
pub const CANVAS_HEIGHT: u32 = 240;

/// Bytes per pixel in the 24-bit working format
pub const BYTES_PER_PIXEL: usize = 3;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel linear blend towards `other`, `t` clamped to [0, 1]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Scale every channel by `factor` (clamped to [0, 1])
    pub fn scaled(self, factor: f32) -> Color {
        let f = factor.clamp(0.0, 1.0);
        Color::rgb(
            (self.r as f32 * f) as u8,
            (self.g as f32 * f) as u8,
            (self.b as f32 * f) as u8,
        )
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::rgb(r, g, b)
    }
}

/// Which physical panel a frame is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelSide {
    Left,
    Right,
}

impl PanelSide {
    pub const ALL: [PanelSide; 2] = [PanelSide::Left, PanelSide::Right];

    /// -1 for the left eye, +1 for the right eye; used to mirror side-dependent features
    #[inline]
    pub const fn mirror(self) -> i32 {
        match self {
            PanelSide::Left => -1,
            PanelSide::Right => 1,
        }
    }

    /// Wire identifier used by the panel controller
    #[inline]
    pub const fn id(self) -> u8 {
        match self {
            PanelSide::Left => 0,
            PanelSide::Right => 1,
        }
    }
}

/// One value per panel, indexed by `PanelSide`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSet<T> {
    pub left: T,
    pub right: T,
}

impl<T> PanelSet<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Build both entries from a per-side constructor
    pub fn from_fn(mut f: impl FnMut(PanelSide) -> T) -> Self {
        Self {
            left: f(PanelSide::Left),
            right: f(PanelSide::Right),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PanelSide, &T)> {
        [(PanelSide::Left, &self.left), (PanelSide::Right, &self.right)].into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PanelSide, &mut T)> {
        [
            (PanelSide::Left, &mut self.left),
            (PanelSide::Right, &mut self.right),
        ]
        .into_iter()
    }
}

impl<T> Index<PanelSide> for PanelSet<T> {
    type Output = T;

    fn index(&self, side: PanelSide) -> &T {
        match side {
            PanelSide::Left => &self.left,
            PanelSide::Right => &self.right,
        }
    }
}

impl<T> IndexMut<PanelSide> for PanelSet<T> {
    fn index_mut(&mut self, side: PanelSide) -> &mut T {
        match side {
            PanelSide::Left => &mut self.left,
            PanelSide::Right => &mut self.right,
        }
    }
}
