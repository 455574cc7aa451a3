use crate::animation::{Animator, Ease};
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{EngineError, EngineResult};

/// Time context used to sample animated properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock {
    /// Timeline frame.
    pub global: FrameIndex,
    /// Frame relative to the start of the owning element.
    pub local: FrameIndex,
    /// Timeline frame rate.
    pub fps: Fps,
}

impl Clock {
    /// Clock whose local time equals its global time.
    pub fn at(frame: FrameIndex, fps: Fps) -> Self {
        Self {
            global: frame,
            local: frame,
            fps,
        }
    }

    /// Same clock with local time offset so that `start` maps to local frame 0.
    pub fn with_start(self, start: FrameIndex) -> Self {
        Self {
            local: FrameIndex(self.global.0.saturating_sub(start.0)),
            ..self
        }
    }
}

/// Authored `(frame, value)` pair. `easing` shapes the segment that ends at this key.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    pub frame: FrameIndex,
    pub value: T,
    #[serde(default)]
    pub easing: Ease,
}

impl<T> Keyframe<T> {
    /// Linear key.
    pub fn new(frame: FrameIndex, value: T) -> Self {
        Self {
            frame,
            value,
            easing: Ease::Linear,
        }
    }

    /// Key with an easing for the segment leading into it.
    pub fn eased(frame: FrameIndex, value: T, easing: Ease) -> Self {
        Self {
            frame,
            value,
            easing,
        }
    }
}

/// Keyframe animation for one property, keys sorted by frame.
///
/// Sampling rules:
/// - no keys: `default`
/// - before the first key: first value
/// - after the last key: last value
/// - several keys on one frame: the last of them wins
/// - between keys: `T::interpolate(next.easing.apply(raw), prev, next)`
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeTrack<T> {
    default: T,
    keys: Vec<Keyframe<T>>,
    #[serde(default)]
    use_global_clock: bool,
}

impl<T: Animator> KeyframeTrack<T> {
    /// Empty track sampling to `default`.
    pub fn new(default: T) -> Self {
        Self {
            default,
            keys: Vec::new(),
            use_global_clock: false,
        }
    }

    /// Sample by timeline frame instead of element-local frame.
    pub fn with_global_clock(mut self, on: bool) -> Self {
        self.use_global_clock = on;
        self
    }

    /// Builder form of [`KeyframeTrack::insert`].
    pub fn with_key(mut self, key: Keyframe<T>) -> Self {
        self.insert(key);
        self
    }

    /// Value used when the track has no keys.
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Keys in frame order.
    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    /// Whether sampling reads [`Clock::global`].
    pub fn uses_global_clock(&self) -> bool {
        self.use_global_clock
    }

    /// Insert keeping frame order; a key on an occupied frame goes after the existing ones.
    ///
    /// Returns the index of the inserted key.
    pub fn insert(&mut self, key: Keyframe<T>) -> usize {
        let idx = self.keys.partition_point(|k| k.frame <= key.frame);
        self.keys.insert(idx, key);
        idx
    }

    /// Remove and return the key at `index`.
    pub fn remove(&mut self, index: usize) -> EngineResult<Keyframe<T>> {
        if index >= self.keys.len() {
            return Err(EngineError::out_of_range(format!(
                "keyframe index {index} out of {}",
                self.keys.len()
            )));
        }
        Ok(self.keys.remove(index))
    }

    /// Check ordering (needed after deserialization).
    pub fn validate(&self) -> EngineResult<()> {
        if !self.keys.windows(2).all(|w| w[0].frame <= w[1].frame) {
            return Err(EngineError::animation("keyframes must be sorted by frame"));
        }
        Ok(())
    }

    /// Value at `clock`.
    pub fn sample(&self, clock: Clock) -> T {
        let f = if self.use_global_clock {
            clock.global
        } else {
            clock.local
        };
        let Some(first) = self.keys.first() else {
            return self.default.clone();
        };
        let idx = self.keys.partition_point(|k| k.frame <= f);
        if idx == 0 {
            return first.value.clone();
        }
        if idx >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value.clone();
        }
        let prev = &self.keys[idx - 1];
        let next = &self.keys[idx];
        // prev.frame <= f < next.frame, so the span is non-zero
        let span = (next.frame.0 - prev.frame.0) as f64;
        let raw = (((f.0 - prev.frame.0) as f64) / span).clamp(0.0, 1.0) as f32;
        T::interpolate(next.easing.apply(raw), &prev.value, &next.value)
    }
}

/// A property value that is either fixed or driven by keyframes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Animated<T> {
    Constant(T),
    Keyframes(KeyframeTrack<T>),
}

impl<T: Animator> Animated<T> {
    /// Value at `clock`.
    pub fn sample(&self, clock: Clock) -> T {
        match self {
            Self::Constant(v) => v.clone(),
            Self::Keyframes(track) => track.sample(clock),
        }
    }

    /// `true` when the value can change between frames.
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Keyframes(t) if t.keys().len() > 1)
    }

    pub fn validate(&self) -> EngineResult<()> {
        match self {
            Self::Constant(_) => Ok(()),
            Self::Keyframes(track) => track.validate(),
        }
    }
}

impl<T> From<T> for Animated<T> {
    fn from(v: T) -> Self {
        Self::Constant(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;
