//! Keyframed motion applied to loaded models.
//!
//! A [`Motion`] holds one [`Envelope`] per animated rotation axis. An envelope
//! interpolates linearly between its keys and decides what happens past the
//! last key through its [`Behavior`]. Envelopes without a behaviour of their
//! own use the one set on the motion.

use cgmath::Vector3;

/// What an envelope does outside its key range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Behavior {
    /// Hold the first/last value.
    #[default]
    Constant,
    /// Start over from the first key.
    Repeat,
    /// Start over, shifted by the value gained over one full cycle.
    Offset,
}

/// A single animated channel: sorted `(time, value)` keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    keys: Vec<(f32, f32)>,
    pub behavior: Option<Behavior>,
}

impl Envelope {
    pub fn new(
        keys: impl IntoIterator<Item = (f32, f32)>,
        behavior: impl Into<Option<Behavior>>,
    ) -> Self {
        let mut keys: Vec<_> = keys.into_iter().collect();
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            keys,
            behavior: behavior.into(),
        }
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    pub fn evaluate(&self, time: f32) -> f32 {
        self.evaluate_in(time, Behavior::default())
    }

    /// Evaluate with `inherited` standing in for a missing behaviour.
    pub fn evaluate_in(&self, time: f32, inherited: Behavior) -> f32 {
        let behavior = self.behavior.unwrap_or(inherited);
        let (Some(&(t0, v0)), Some(&(tn, vn))) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        let span = tn - t0;
        if span <= 0.0 {
            return v0;
        }
        let (local, cycles) = match behavior {
            Behavior::Constant => (time.clamp(t0, tn), 0.0),
            Behavior::Repeat | Behavior::Offset => {
                let cycles = ((time - t0) / span).floor();
                (time - cycles * span, cycles)
            }
        };
        let value = self.interpolate(local);
        match behavior {
            Behavior::Offset => value + cycles * (vn - v0),
            _ => value,
        }
    }

    fn interpolate(&self, time: f32) -> f32 {
        let next = self.keys.partition_point(|&(t, _)| t <= time);
        match (next.checked_sub(1).map(|i| self.keys[i]), self.keys.get(next)) {
            (Some((ta, va)), Some(&(tb, vb))) if tb > ta => {
                va + (vb - va) * (time - ta) / (tb - ta)
            }
            (Some((_, va)), _) => va,
            (None, Some(&(_, vb))) => vb,
            (None, None) => 0.0,
        }
    }
}

/// Rotation animation in degrees around X, Y and Z.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Motion {
    pub rotation: [Option<Envelope>; 3],
    /// Behaviour for channels that do not set one.
    pub behavior: Behavior,
}

impl Motion {
    pub fn rotate_z(envelope: Envelope) -> Self {
        Self {
            rotation: [None, None, Some(envelope)],
            behavior: Behavior::default(),
        }
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn rotation_at(&self, seconds: f32) -> Vector3<f32> {
        let [x, y, z] = self
            .rotation
            .each_ref()
            .map(|e| e.as_ref().map_or(0.0, |e| e.evaluate_in(seconds, self.behavior)));
        Vector3::new(x, y, z)
    }
}
