//! To maintain a theme of colors, I will add colors here as constants so
//! the output does not look bad at any point.
//!
//! - SLATE_BLUE: Main Color
//! - SLATE_GREY: Dimmed text such as table headers

use colored::Color;

pub(crate) const SLATE_BLUE: Color = Color::TrueColor {
    r: 106,
    g: 140,
    b: 175,
};

pub(crate) const SLATE_GREY: Color = Color::TrueColor {
    r: 140,
    g: 140,
    b: 140,
};
