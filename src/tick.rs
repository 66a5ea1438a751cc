//! Tick layout shared by every tape.
//!
//! A tape shows a window of `visible_range` minor units centred on the
//! current value. Ticks are laid out `margin` units beyond each edge of that
//! window so nothing pops in while the tape scrolls; the surface clip cuts
//! them at the window edge.

use bon::Builder;

/// How a tick index becomes a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    /// Labels are the unit index itself (speed, altitude).
    #[default]
    None,
    /// Labels are normalized into [0, 360) with compass points every 45°.
    Mod360,
    /// Labels are normalized into (-180, 180].
    Mod180Signed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magnitude {
    Major,
    SemiMajor,
    Minor,
}

impl Magnitude {
    pub fn of(index: i64) -> Self {
        match index.abs() % 10 {
            0 => Self::Major,
            5 => Self::SemiMajor,
            _ => Self::Minor,
        }
    }

    /// Position of this class in `[major, semi-major, minor]` length tables.
    pub fn rank(self) -> usize {
        match self {
            Self::Major => 0,
            Self::SemiMajor => 1,
            Self::Minor => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickDescriptor {
    /// Unit index of the tick.
    pub index: i64,
    /// Distance from the current value along the tape axis, in pixels.
    pub offset: f64,
    pub magnitude: Magnitude,
    pub label: Option<String>,
}

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

impl Wrap {
    /// The labelled value of unit `index` under this policy.
    pub fn normalize(self, index: i64) -> i64 {
        match self {
            Self::None => index,
            Self::Mod360 => index.rem_euclid(360),
            Self::Mod180Signed => {
                let angle = index.rem_euclid(360);
                if angle > 180 {
                    angle - 360
                } else {
                    angle
                }
            }
        }
    }

    pub fn label(self, index: i64) -> Option<String> {
        let value = self.normalize(index);
        if self == Self::Mod360 && value % 45 == 0 {
            return Some(COMPASS[(value / 45) as usize].to_string());
        }
        (Magnitude::of(index) == Magnitude::Major).then(|| value.to_string())
    }
}

/// Input of the tick layout for one tape and one frame.
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct TickLayout {
    /// Current reading in minor units.
    pub value: f64,
    /// Pixels per minor unit.
    pub step_size: f64,
    /// Number of minor units visible in the tape window.
    pub visible_range: u32,
    #[builder(default)]
    pub wrap: Wrap,
    #[builder(default = 5)]
    pub margin: u32,
}

/// Readings beyond this would leave neighbouring tick indices inexact in `f64`.
const POSITION_LIMIT: f64 = 4_503_599_627_370_496.0;

impl TickLayout {
    /// Current reading clamped to where unit indices stay exact.
    pub fn position(&self) -> f64 {
        self.value.clamp(-POSITION_LIMIT, POSITION_LIMIT)
    }

    /// Units from the current value to the first laid-out tick on either side.
    pub fn zero_offset(&self) -> i64 {
        i64::from(self.visible_range.div_ceil(2)) + i64::from(self.margin)
    }

    /// The unit at or below the current value.
    pub fn value_offset(&self) -> i64 {
        self.position().floor() as i64
    }

    /// Sub-unit scroll position in [0, 1).
    pub fn fraction(&self) -> f64 {
        let position = self.position();
        position - position.floor()
    }

    /// Ticks from `value_offset - zero_offset` up to, excluding,
    /// `value_offset + zero_offset`. Calling this again restarts the sequence.
    pub fn ticks(&self) -> Ticks {
        let zero = self.zero_offset();
        let base = self.value_offset();
        Ticks {
            layout: *self,
            next: base - zero,
            end: base + zero,
        }
    }
}

/// Lazy sequence of ticks produced by [`TickLayout::ticks`].
#[derive(Debug, Clone)]
pub struct Ticks {
    layout: TickLayout,
    next: i64,
    end: i64,
}

impl Iterator for Ticks {
    type Item = TickDescriptor;

    fn next(&mut self) -> Option<TickDescriptor> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(TickDescriptor {
            index,
            offset: (index as f64 - self.layout.position()) * self.layout.step_size,
            magnitude: Magnitude::of(index),
            label: self.layout.wrap.label(index),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Ticks {}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(value: f64, visible_range: u32, wrap: Wrap) -> TickLayout {
        TickLayout::builder()
            .value(value)
            .step_size(8.0)
            .visible_range(visible_range)
            .wrap(wrap)
            .build()
    }

    #[test]
    fn linear_window_offsets() {
        let layout = layout(35.5, 41, Wrap::None);
        assert_eq!(layout.zero_offset(), 26);
        assert_eq!(layout.value_offset(), 35);
        assert_eq!(layout.fraction(), 0.5);

        let ticks: Vec<_> = layout.ticks().collect();
        assert_eq!(ticks.len(), 52);
        assert_eq!(ticks.first().map(|t| t.index), Some(9));
        assert_eq!(ticks.last().map(|t| t.index), Some(60));
        assert_eq!(ticks[0].offset, (9.0 - 35.5) * 8.0);
    }

    #[test]
    fn linear_majors_are_multiples_of_ten() {
        let layout = layout(35.5, 41, Wrap::None);
        let majors: Vec<_> = layout
            .ticks()
            .filter(|t| t.magnitude == Magnitude::Major)
            .map(|t| (t.index, t.label.clone()))
            .collect();
        assert_eq!(
            majors,
            vec![
                (10, Some("10".to_string())),
                (20, Some("20".to_string())),
                (30, Some("30".to_string())),
                (40, Some("40".to_string())),
                (50, Some("50".to_string())),
                (60, Some("60".to_string())),
            ]
        );
        assert!(layout
            .ticks()
            .filter(|t| t.magnitude != Magnitude::Major)
            .all(|t| t.label.is_none()));
    }

    #[test]
    fn magnitude_classes_use_absolute_index() {
        assert_eq!(Magnitude::of(-20), Magnitude::Major);
        assert_eq!(Magnitude::of(-15), Magnitude::SemiMajor);
        assert_eq!(Magnitude::of(-3), Magnitude::Minor);
        assert_eq!(Wrap::None.label(-20).as_deref(), Some("-20"));
    }

    #[test]
    fn even_visible_range_is_symmetric() {
        let layout = layout(0.0, 40, Wrap::None);
        assert_eq!(layout.zero_offset(), 25);
        let ticks: Vec<_> = layout.ticks().collect();
        assert_eq!(ticks.first().map(|t| t.index), Some(-25));
        assert_eq!(ticks.last().map(|t| t.index), Some(24));
    }

    #[test]
    fn heading_wraps_through_north() {
        let layout = layout(358.0, 61, Wrap::Mod360);
        let indices: Vec<i64> = layout.ticks().map(|t| t.index).collect();
        assert!(indices.windows(2).all(|w| w[1] == w[0] + 1));
        assert!(indices.contains(&360));

        let label_at = |index: i64| {
            layout
                .ticks()
                .find(|t| t.index == index)
                .and_then(|t| t.label)
        };
        assert_eq!(label_at(360).as_deref(), Some("N"));
        assert_eq!(label_at(370).as_deref(), Some("10"));
        assert_eq!(label_at(350).as_deref(), Some("350"));
    }

    #[test]
    fn compass_points_and_numeric_headings() {
        assert_eq!(Wrap::Mod360.label(0).as_deref(), Some("N"));
        assert_eq!(Wrap::Mod360.label(90).as_deref(), Some("E"));
        assert_eq!(Wrap::Mod360.label(270).as_deref(), Some("W"));
        assert_eq!(Wrap::Mod360.label(315).as_deref(), Some("NW"));
        assert_eq!(Wrap::Mod360.label(-45).as_deref(), Some("NW"));
        assert_eq!(Wrap::Mod360.label(135).as_deref(), Some("SE"));
        assert_eq!(Wrap::Mod360.label(-10).as_deref(), Some("350"));
        assert_eq!(Wrap::Mod360.label(720).as_deref(), Some("N"));
        assert_eq!(Wrap::Mod360.label(12), None);
    }

    #[test]
    fn roll_labels_flip_sign_at_180() {
        assert_eq!(Wrap::Mod180Signed.label(180).as_deref(), Some("180"));
        assert_eq!(Wrap::Mod180Signed.label(-180).as_deref(), Some("180"));
        assert_eq!(Wrap::Mod180Signed.label(190).as_deref(), Some("-170"));
        assert_eq!(Wrap::Mod180Signed.label(-190).as_deref(), Some("170"));
        assert_eq!(Wrap::Mod180Signed.label(-30).as_deref(), Some("-30"));
    }

    #[test]
    fn roll_normalization_boundary() {
        assert_eq!(Wrap::Mod180Signed.normalize(181), -179);
        assert_eq!(Wrap::Mod180Signed.normalize(-181), 179);
        assert_eq!(Wrap::Mod180Signed.normalize(180), 180);
        assert_eq!(Wrap::Mod360.normalize(-1), 359);
        assert_eq!(Wrap::None.normalize(-1), -1);
    }

    #[test]
    fn layout_is_idempotent() {
        let layout = layout(123.25, 51, Wrap::Mod180Signed);
        let first: Vec<_> = layout.ticks().collect();
        let second: Vec<_> = layout.ticks().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn extreme_values_keep_a_full_window() {
        for value in [1e19, -1e19, f64::MAX, f64::MIN] {
            let layout = layout(value, 41, Wrap::None);
            let ticks: Vec<_> = layout.ticks().collect();
            assert_eq!(ticks.len(), 52, "value {value}");
            assert!(ticks.iter().all(|t| t.offset.is_finite()));
            assert!(ticks.iter().any(|t| t.offset == 0.0));
            assert!(ticks.windows(2).all(|w| w[1].index == w[0].index + 1));
        }
    }

    #[test]
    fn size_hint_is_exact() {
        let mut ticks = layout(0.0, 41, Wrap::None).ticks();
        assert_eq!(ticks.len(), 52);
        ticks.next();
        assert_eq!(ticks.len(), 51);
    }
}
