#![allow(dead_code)]
//! Keyframes and curve evaluation shared by layered and legacy F-Curves.
//!
//! Model:
//! - Keys are kept sorted by frame; at most one key per frame.
//! - The interpolation of the left key of a segment decides how that segment
//!   is evaluated.
//! - Bezier segments use the stored handles, or flat handles one third into
//!   the segment when none are stored. Handle x is clamped to the segment so
//!   the curve stays a function of time.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Bezier,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Extrapolation {
    #[default]
    Constant,
    Linear,
}

/// A single key: `co` is `[frame, value]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub co: [f32; 2],
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_left: Option<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_right: Option<[f32; 2]>,
}

impl Keyframe {
    pub fn new(frame: f32, value: f32) -> Self {
        Self {
            co: [frame, value],
            interpolation: Interpolation::default(),
            handle_left: None,
            handle_right: None,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[inline]
    pub fn frame(&self) -> f32 {
        self.co[0]
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.co[1]
    }
}

/// Insert `key` keeping `keys` sorted; a key on the same frame is replaced.
/// Returns the index of the inserted key.
pub fn insert_sorted(keys: &mut Vec<Keyframe>, key: Keyframe) -> usize {
    match keys.binary_search_by(|k| k.frame().total_cmp(&key.frame())) {
        Ok(idx) => {
            keys[idx] = key;
            idx
        }
        Err(idx) => {
            keys.insert(idx, key);
            idx
        }
    }
}

/// Evaluate sorted `keys` at `frame`. An empty key list evaluates to 0.
pub fn evaluate_keyframes(keys: &[Keyframe], extrapolation: Extrapolation, frame: f32) -> f32 {
    let n = keys.len();
    match n {
        0 => 0.0,
        1 => keys[0].value(),
        _ => {
            let first = &keys[0];
            let last = &keys[n - 1];
            if frame <= first.frame() {
                return extrapolate(first, &keys[1], extrapolation, frame);
            }
            if frame >= last.frame() {
                return extrapolate(last, &keys[n - 2], extrapolation, frame);
            }
            let (i0, i1) = find_segment(keys, frame);
            evaluate_segment(&keys[i0], &keys[i1], frame)
        }
    }
}

/// Index pair of the segment containing `frame`. Caller guarantees that
/// `frame` lies strictly inside the key range.
fn find_segment(keys: &[Keyframe], frame: f32) -> (usize, usize) {
    let right = keys.partition_point(|k| k.frame() <= frame);
    let right = right.clamp(1, keys.len() - 1);
    (right - 1, right)
}

fn extrapolate(end: &Keyframe, neighbour: &Keyframe, mode: Extrapolation, frame: f32) -> f32 {
    match mode {
        Extrapolation::Constant => end.value(),
        Extrapolation::Linear => {
            let dx = neighbour.frame() - end.frame();
            if dx.abs() <= f32::EPSILON {
                return end.value();
            }
            let slope = (neighbour.value() - end.value()) / dx;
            end.value() + slope * (frame - end.frame())
        }
    }
}

fn evaluate_segment(left: &Keyframe, right: &Keyframe, frame: f32) -> f32 {
    let x0 = left.frame();
    let x3 = right.frame();
    let span = x3 - x0;
    if span <= f32::EPSILON {
        return right.value();
    }
    match left.interpolation {
        Interpolation::Constant => left.value(),
        Interpolation::Linear => {
            let t = (frame - x0) / span;
            left.value() + (right.value() - left.value()) * t
        }
        Interpolation::Bezier => {
            let h1 = left
                .handle_right
                .unwrap_or([x0 + span / 3.0, left.value()]);
            let h2 = right
                .handle_left
                .unwrap_or([x3 - span / 3.0, right.value()]);
            let x1 = h1[0].clamp(x0, x3);
            let x2 = h2[0].clamp(x0, x3);
            let t = solve_bezier_x(x0, x1, x2, x3, frame);
            cubic_bezier(left.value(), h1[1], h2[1], right.value(), t)
        }
    }
}

/// Cubic Bezier basis function.
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Find the curve parameter whose x equals `x` by bisection. X is monotonic
/// because the inner control points are clamped to `[x0, x3]`.
fn solve_bezier_x(x0: f32, x1: f32, x2: f32, x3: f32, x: f32) -> f32 {
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = ((x - x0) / (x3 - x0)).clamp(0.0, 1.0);
    for _ in 0..24 {
        let xm = cubic_bezier(x0, x1, x2, x3, mid);
        if (xm - x).abs() < 1e-6 {
            break;
        }
        if xm < x {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    mid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    fn linear_keys() -> Vec<Keyframe> {
        vec![
            Keyframe::new(1.0, 0.0).with_interpolation(Interpolation::Linear),
            Keyframe::new(11.0, 10.0).with_interpolation(Interpolation::Linear),
        ]
    }

    #[test]
    fn linear_segment_and_constant_extrapolation() {
        let keys = linear_keys();
        assert!(approx(evaluate_keyframes(&keys, Extrapolation::Constant, 6.0), 5.0, 1e-6));
        assert_eq!(evaluate_keyframes(&keys, Extrapolation::Constant, -5.0), 0.0);
        assert_eq!(evaluate_keyframes(&keys, Extrapolation::Constant, 50.0), 10.0);
    }

    #[test]
    fn linear_extrapolation_follows_end_slope() {
        let keys = linear_keys();
        assert!(approx(evaluate_keyframes(&keys, Extrapolation::Linear, 21.0), 20.0, 1e-5));
        assert!(approx(evaluate_keyframes(&keys, Extrapolation::Linear, 0.0), -1.0, 1e-5));
    }

    #[test]
    fn constant_holds_left_value() {
        let keys = vec![
            Keyframe::new(0.0, 3.0).with_interpolation(Interpolation::Constant),
            Keyframe::new(10.0, 7.0),
        ];
        assert_eq!(evaluate_keyframes(&keys, Extrapolation::Constant, 9.9), 3.0);
        assert_eq!(evaluate_keyframes(&keys, Extrapolation::Constant, 10.0), 7.0);
    }

    #[test]
    fn default_bezier_is_symmetric_ease() {
        let keys = vec![Keyframe::new(0.0, 0.0), Keyframe::new(10.0, 1.0)];
        assert!(approx(evaluate_keyframes(&keys, Extrapolation::Constant, 5.0), 0.5, 1e-4));
        let early = evaluate_keyframes(&keys, Extrapolation::Constant, 2.0);
        assert!(early > 0.0 && early < 0.2, "ease-in expected, got {early}");
    }

    #[test]
    fn insert_sorted_replaces_same_frame() {
        let mut keys = Vec::new();
        insert_sorted(&mut keys, Keyframe::new(5.0, 1.0));
        insert_sorted(&mut keys, Keyframe::new(1.0, 2.0));
        let idx = insert_sorted(&mut keys, Keyframe::new(5.0, 9.0));
        assert_eq!(idx, 1);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].frame(), 1.0);
        assert_eq!(keys[1].value(), 9.0);
    }

    #[test]
    fn empty_and_single_key() {
        assert_eq!(evaluate_keyframes(&[], Extrapolation::Linear, 3.0), 0.0);
        let one = [Keyframe::new(4.0, 2.5)];
        assert_eq!(evaluate_keyframes(&one, Extrapolation::Linear, 100.0), 2.5);
    }
}
