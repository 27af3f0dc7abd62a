use std::str::FromStr;

use plotters::style::RGBColor;

use crate::error::PlotError;

/// The benchmarked branches. Anything outside this set is rejected when a
/// chart is built, there is no fallback label or color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    Main,
    Original,
    Vectorization,
    VectorizationWithoutSplit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarColor {
    Blue,
    Red,
    Green,
    Orange,
}

impl Setting {
    pub const ALL: [Setting; 4] = [
        Setting::Main,
        Setting::Original,
        Setting::Vectorization,
        Setting::VectorizationWithoutSplit,
    ];

    /// Identifier as it appears in the `setting` column
    pub fn id(&self) -> &'static str {
        match self {
            Setting::Main => "main",
            Setting::Original => "c951393f7a9b7abb7ce005f6fee3d0ee5f7c21ef",
            Setting::Vectorization => "feature/vectorization",
            Setting::VectorizationWithoutSplit => "feature/vectorization_without_split",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Setting::Main => "with split",
            Setting::Original => "original",
            Setting::Vectorization => "vectorization with split",
            Setting::VectorizationWithoutSplit => "vectorization without split",
        }
    }

    pub fn color(&self) -> BarColor {
        match self {
            Setting::Main => BarColor::Blue,
            Setting::Original => BarColor::Red,
            Setting::Vectorization => BarColor::Green,
            Setting::VectorizationWithoutSplit => BarColor::Orange,
        }
    }
}

impl FromStr for Setting {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Setting::ALL
            .into_iter()
            .find(|setting| setting.id() == s)
            .ok_or_else(|| PlotError::UnknownSetting(s.to_owned()))
    }
}

impl BarColor {
    pub fn rgb(&self) -> RGBColor {
        match self {
            BarColor::Blue => RGBColor(0, 0, 255),
            BarColor::Red => RGBColor(255, 0, 0),
            BarColor::Green => RGBColor(0, 128, 0),
            BarColor::Orange => RGBColor(255, 165, 0),
        }
    }
}
