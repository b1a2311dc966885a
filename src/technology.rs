//! The electrification technologies between which newly-electrified people are allocated.
use serde_string_enum::{DeserializeStringEnum, SerializeStringEnum};
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// An electrification technology.
///
/// Technologies are written as `grid`, `mg` and `shs` in input and output files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    SerializeStringEnum,
    DeserializeStringEnum,
)]
pub enum Technology {
    /// Extension of the national grid
    #[strum(serialize = "grid")]
    Grid,
    /// Mini-grid
    #[strum(serialize = "mg")]
    MiniGrid,
    /// Solar home system
    #[strum(serialize = "shs")]
    Shs,
}

/// A value for each of the three technologies
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerTechnology<T> {
    /// Value for grid extension
    pub grid: T,
    /// Value for mini-grids
    pub mg: T,
    /// Value for solar home systems
    pub shs: T,
}

impl<T> PerTechnology<T> {
    /// Create from one value per technology
    pub fn new(grid: T, mg: T, shs: T) -> Self {
        Self { grid, mg, shs }
    }

    /// Create by calling `f` for each technology
    pub fn from_fn<F: FnMut(Technology) -> T>(mut f: F) -> Self {
        Self {
            grid: f(Technology::Grid),
            mg: f(Technology::MiniGrid),
            shs: f(Technology::Shs),
        }
    }

    /// Apply `f` to each value
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> PerTechnology<U> {
        PerTechnology {
            grid: f(&self.grid),
            mg: f(&self.mg),
            shs: f(&self.shs),
        }
    }

    /// Iterate over technologies and their values
    pub fn iter(&self) -> impl Iterator<Item = (Technology, &T)> {
        Technology::iter().map(move |tech| (tech, &self[tech]))
    }
}

impl<T: Copy + std::iter::Sum<T>> PerTechnology<T> {
    /// The sum of the values for all technologies
    pub fn total(&self) -> T {
        [self.grid, self.mg, self.shs].into_iter().sum()
    }
}

impl<T> Index<Technology> for PerTechnology<T> {
    type Output = T;

    fn index(&self, tech: Technology) -> &T {
        match tech {
            Technology::Grid => &self.grid,
            Technology::MiniGrid => &self.mg,
            Technology::Shs => &self.shs,
        }
    }
}

impl<T> IndexMut<Technology> for PerTechnology<T> {
    fn index_mut(&mut self, tech: Technology) -> &mut T {
        match tech {
            Technology::Grid => &mut self.grid,
            Technology::MiniGrid => &mut self.mg,
            Technology::Shs => &mut self.shs,
        }
    }
}
