//! Scoped composition of 2-D affine transforms.
//!
//! Every instrument moves the drawing origin through [`scoped`] or a
//! [`TransformScope`] guard, so the surface transform is restored on every
//! exit path: normal return, early `?` return, or unwinding.

use crate::config::Style;
use crate::error::Result;
use crate::surface::Surface;
use kurbo::{Affine, Vec2};
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// One step of a transform composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(Vec2),
    /// Clockwise rotation in radians (y axis pointing down).
    Rotate(f64),
    Scale(f64),
}

impl TransformOp {
    pub fn translate(x: f64, y: f64) -> Self {
        Self::Translate(Vec2::new(x, y))
    }

    pub fn to_affine(self) -> Affine {
        match self {
            Self::Translate(offset) => Affine::translate(offset),
            Self::Rotate(angle) => Affine::rotate(angle),
            Self::Scale(factor) => Affine::scale(factor),
        }
    }
}

/// Composes `ops` by right-multiplication in the order given, the same way
/// successive `translate`/`rotate` calls on a canvas compose.
pub fn compose(ops: &[TransformOp]) -> Affine {
    ops.iter()
        .fold(Affine::IDENTITY, |acc, op| acc * op.to_affine())
}

/// Save/restore stack for a surface's graphics state.
#[derive(Debug, Clone, Default)]
pub struct StateStack<T> {
    current: T,
    saved: Vec<T>,
}

impl<T: Clone> StateStack<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Pops the last saved state. A restore without a matching save is ignored.
    pub fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.current = state,
            None => warn!("restore without matching save ignored"),
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

/// Guard that applies a transform composition on entry and restores the
/// surface state when dropped.
pub struct TransformScope<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> TransformScope<'a, S> {
    pub fn enter(surface: &'a mut S, ops: &[TransformOp]) -> Self {
        surface.save();
        let composed = surface.transform() * compose(ops);
        surface.set_transform(composed);
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Deref for TransformScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for TransformScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for TransformScope<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

/// Runs `body` under `ops` applied on top of the current transform.
pub fn scoped<S, T>(
    surface: &mut S,
    ops: &[TransformOp],
    body: impl FnOnce(&mut S) -> Result<T>,
) -> Result<T>
where
    S: Surface + ?Sized,
{
    let mut scope = TransformScope::enter(surface, ops);
    body(&mut *scope)
}

/// Draws `body` twice: first offset with the shadow pen, then in place with
/// the pen already on the surface. Without a shadow it is drawn once.
pub fn with_shadow<S>(
    surface: &mut S,
    style: &Style,
    mut body: impl FnMut(&mut S) -> Result<()>,
) -> Result<()>
where
    S: Surface + ?Sized,
{
    if let Some(shadow) = &style.shadow {
        let offset = [TransformOp::translate(shadow.offset, shadow.offset)];
        scoped(surface, &offset, |s| {
            s.set_line_width(shadow.line_width);
            s.set_color(shadow.color);
            body(s)
        })?;
    }
    body(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Shadow;
    use crate::error::HudError;
    use crate::surface::RecordingSurface;
    use kurbo::Point;
    use std::f64::consts::FRAC_PI_2;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn near(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn composition_order_matters() {
        let translate_then_rotate = compose(&[
            TransformOp::translate(10.0, 0.0),
            TransformOp::Rotate(FRAC_PI_2),
        ]);
        let rotate_then_translate = compose(&[
            TransformOp::Rotate(FRAC_PI_2),
            TransformOp::translate(10.0, 0.0),
        ]);

        // Local (1, 0) rotates to (0, 1) and is then shifted by the outer translate.
        assert!(near(translate_then_rotate * Point::new(1.0, 0.0), Point::new(10.0, 1.0)));
        // Here the translate happens in the rotated frame.
        assert!(near(rotate_then_translate * Point::new(1.0, 0.0), Point::new(0.0, 11.0)));
    }

    #[test]
    fn empty_composition_is_identity() {
        assert_eq!(compose(&[]), Affine::IDENTITY);
    }

    #[test]
    fn scope_restores_after_success() {
        let mut surface = RecordingSurface::new();
        let inside = scoped(&mut surface, &[TransformOp::translate(5.0, 6.0)], |s| {
            Ok(s.transform())
        })
        .unwrap();
        assert_eq!(inside, Affine::translate((5.0, 6.0)));
        assert_eq!(surface.transform(), Affine::IDENTITY);
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn scope_restores_after_error() {
        let mut surface = RecordingSurface::new();
        let result: Result<()> = scoped(&mut surface, &[TransformOp::Rotate(1.0)], |_| {
            Err(HudError::Text {
                text: "x".to_string(),
                reason: "boom".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(surface.transform(), Affine::IDENTITY);
    }

    #[test]
    fn scope_restores_after_panic() {
        let mut surface = RecordingSurface::new();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _scope = TransformScope::enter(&mut surface, &[TransformOp::Scale(3.0)]);
            panic!("draw failed");
        }));
        assert!(outcome.is_err());
        assert_eq!(surface.transform(), Affine::IDENTITY);
    }

    #[test]
    fn nested_scopes_compose_and_siblings_are_independent() {
        let mut surface = RecordingSurface::new();
        scoped(&mut surface, &[TransformOp::translate(100.0, 0.0)], |s| {
            scoped(s, &[TransformOp::translate(0.0, 50.0)], |s| {
                assert!(near(s.transform() * Point::ZERO, Point::new(100.0, 50.0)));
                Ok(())
            })?;
            scoped(s, &[TransformOp::Rotate(FRAC_PI_2)], |s| {
                assert!(near(s.transform() * Point::new(1.0, 0.0), Point::new(100.0, 1.0)));
                Ok(())
            })?;
            assert_eq!(s.transform(), Affine::translate((100.0, 0.0)));
            Ok(())
        })
        .unwrap();
        assert_eq!(surface.transform(), Affine::IDENTITY);
    }

    #[test]
    fn shadow_pass_is_offset_and_restored() {
        use crate::surface::DrawCall;

        let style = Style {
            shadow: Some(Shadow::default()),
            ..Style::default()
        };
        let mut surface = RecordingSurface::new();
        surface.set_line_width(style.line_width);
        surface.set_color(style.color);
        with_shadow(&mut surface, &style, |s| {
            s.move_to(Point::ZERO);
            s.stroke()
        })
        .unwrap();

        let calls = surface.calls();
        assert_eq!(calls[0], DrawCall::MoveTo(Point::new(1.8, 1.8)));
        assert!(matches!(&calls[1], DrawCall::Stroke { width, .. } if *width == 2.5));
        assert_eq!(calls[2], DrawCall::MoveTo(Point::ZERO));
        assert!(matches!(&calls[3], DrawCall::Stroke { color, .. } if *color == style.color));

        let mut plain = RecordingSurface::new();
        let unshadowed = Style {
            shadow: None,
            ..Style::default()
        };
        with_shadow(&mut plain, &unshadowed, |s| {
            s.move_to(Point::ZERO);
            Ok(())
        })
        .unwrap();
        assert_eq!(plain.calls().len(), 1);
    }

    #[test]
    fn state_stack_ignores_unbalanced_restore() {
        let mut stack = StateStack::new(1);
        stack.save();
        *stack.current_mut() = 2;
        stack.restore();
        stack.restore();
        assert_eq!(*stack.current(), 1);
        assert_eq!(stack.depth(), 0);
    }
}
