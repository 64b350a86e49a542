//! Text measurement.
//!
//! Shaping is a platform concern. The engine only needs to know how large a
//! string is for a font and an optional width limit, where its lines break
//! and where its baselines sit. [`MonospaceMeasurer`] answers that with a
//! fixed advance per character; backends supply their own measurer.

use std::sync::Arc;

use crate::{env::EnvKey, layout::Size};

/// Font weight on the usual 100..=900 scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontWeight {
    /// 300.
    Light,
    /// 400.
    #[default]
    Regular,
    /// 500.
    Medium,
    /// 600.
    Semibold,
    /// 700.
    Bold,
}

/// A font request.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Family name. `None` selects the platform's system font.
    pub family: Option<Arc<str>>,
    /// Point size.
    pub size: f32,
    /// Weight.
    pub weight: FontWeight,
}

impl Default for Font {
    fn default() -> Self {
        Self::body()
    }
}

impl Font {
    /// System font at `size`.
    #[must_use]
    pub const fn system(size: f32) -> Self {
        Self {
            family: None,
            size,
            weight: FontWeight::Regular,
        }
    }

    /// The default body font (17pt system).
    #[must_use]
    pub const fn body() -> Self {
        Self::system(17.0)
    }

    /// A named family at `size`.
    #[must_use]
    pub fn named(family: impl Into<Arc<str>>, size: f32) -> Self {
        Self {
            family: Some(family.into()),
            size,
            weight: FontWeight::Regular,
        }
    }

    /// Same font with another weight.
    #[must_use]
    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Same font in bold.
    #[must_use]
    pub fn bold(self) -> Self {
        self.weight(FontWeight::Bold)
    }
}

/// Font used by text leaves.
#[derive(Debug)]
pub struct FontKey;

impl EnvKey for FontKey {
    type Value = Font;

    fn default_value() -> Font {
        Font::body()
    }
}

/// What a [`PlatformTextMeasurer`] reports for a string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Intrinsic size of the laid-out text.
    pub size: Size,
    /// Byte offsets into the string where a new line starts.
    pub line_breaks: Vec<usize>,
    /// Distance from the top to the first line's baseline.
    pub first_baseline: f32,
    /// Distance from the top to the last line's baseline.
    pub last_baseline: f32,
}

impl TextMetrics {
    /// Number of laid-out lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }
}

/// Measures strings for text leaves.
pub trait PlatformTextMeasurer: Send + Sync {
    /// Lays out `text` in `font`, wrapping at `max_width` when given.
    fn measure(&self, text: &str, font: &Font, max_width: Option<f32>) -> TextMetrics;
}

impl<F> PlatformTextMeasurer for F
where
    F: Fn(&str, &Font, Option<f32>) -> TextMetrics + Send + Sync,
{
    fn measure(&self, text: &str, font: &Font, max_width: Option<f32>) -> TextMetrics {
        self(text, font, max_width)
    }
}

/// Deterministic measurer: every character advances by the same width.
///
/// Lines wrap greedily at whitespace. A word wider than the limit sits on
/// its own line and overflows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasurer {
    /// Advance per character as a fraction of the font size.
    pub advance: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Ascent as a fraction of the font size.
    pub ascent: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
            ascent: 0.8,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn glyphs(s: &str) -> f32 {
    s.chars().count() as f32
}

#[allow(clippy::cast_precision_loss)]
impl PlatformTextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, font: &Font, max_width: Option<f32>) -> TextMetrics {
        let advance = font.size * self.advance;
        let line_height = font.size * self.line_height;
        let limit = max_width.filter(|w| w.is_finite()).unwrap_or(f32::INFINITY);

        let mut line_breaks = Vec::new();
        let mut widest = 0.0_f32;
        let mut offset = 0;

        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                line_breaks.push(offset);
            }
            let mut current = 0.0_f32;
            let mut line_start = true;
            for (start, word) in words(line) {
                let word_width = glyphs(word) * advance;
                let gap = if line_start { 0.0 } else { advance };
                if !line_start && current + gap + word_width > limit {
                    line_breaks.push(offset + start);
                    widest = widest.max(current);
                    current = word_width;
                } else {
                    current += gap + word_width;
                }
                line_start = false;
            }
            widest = widest.max(current);
            offset += line.len() + 1;
        }

        let lines = (line_breaks.len() + 1) as f32;
        let ascent = font.size * self.ascent;
        TextMetrics {
            size: Size::new(widest, lines * line_height),
            line_breaks,
            first_baseline: ascent,
            last_baseline: (lines - 1.0) * line_height + ascent,
        }
    }
}

/// Words of `line` with their byte offsets.
fn words(line: &str) -> impl Iterator<Item = (usize, &str)> {
    line.split(' ')
        .scan(0, |pos, word| {
            let start = *pos;
            *pos += word.len() + 1;
            Some((start, word))
        })
        .filter(|(_, word)| !word.is_empty())
}
