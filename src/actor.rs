//! Parallax actors: records owned by the animator that reference the display
//! nodes they drive. Nodes never carry animation state themselves.

use crate::{
    core::{Point, Vec2},
    error::{NightrailError, NightrailResult},
    node::{NodeId, Stage},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Axis {
    X,
    Y,
}

/// Wrap-around rule for infinite scrolling: once the coordinate on `axis`
/// reaches `threshold` or below, add `offset`. `offset` must equal the width of
/// one full tile cycle so the actor re-enters without a visible seam.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct WrapRule {
    pub axis: Axis,
    pub threshold: f64,
    pub offset: f64,
}

impl WrapRule {
    pub fn validate(&self) -> NightrailResult<()> {
        if !self.offset.is_finite() || self.offset <= 0.0 {
            return Err(NightrailError::validation("wrap offset must be > 0"));
        }
        if !self.threshold.is_finite() {
            return Err(NightrailError::validation("wrap threshold must be finite"));
        }
        Ok(())
    }

    pub fn apply(&self, pos: f64) -> f64 {
        if pos <= self.threshold {
            pos + self.offset
        } else {
            pos
        }
    }
}

/// Constant-velocity scroller moving a set of nodes along the wrap axis in the
/// negative direction (mountains, trees, track planks).
#[derive(Clone, Debug, serde::Serialize)]
pub struct Scroller {
    pub nodes: Vec<NodeId>,
    pub speed: f64,
    pub wrap: WrapRule,
}

impl Scroller {
    fn advance(&self, stage: &mut Stage, delta: f64) -> NightrailResult<()> {
        for &id in &self.nodes {
            let node = stage.node_mut(id)?;
            match self.wrap.axis {
                Axis::X => node.x = self.wrap.apply(node.x - delta * self.speed),
                Axis::Y => node.y = self.wrap.apply(node.y - delta * self.speed),
            }
        }
        Ok(())
    }
}

/// Unbounded rotation at a per-node angular rate (wheels). The angle is only
/// ever fed through trigonometry, so it never needs an explicit modulo.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Rotator {
    pub nodes: Vec<(NodeId, f64)>,
}

impl Rotator {
    fn advance(&self, stage: &mut Stage, delta: f64) -> NightrailResult<()> {
        for &(id, rate) in &self.nodes {
            stage.node_mut(id)?.rotation += delta * rate;
        }
        Ok(())
    }
}

/// Vertical bob: `y = base + (sin(elapsed * freq) * 0.5 + 0.5) * amplitude`.
/// `elapsed` grows without bound; only its sine matters.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Oscillator {
    pub node: NodeId,
    pub base: f64,
    pub amplitude: f64,
    pub freq: f64,
    pub elapsed: f64,
}

impl Oscillator {
    pub fn offset_at(&self, elapsed: f64) -> f64 {
        ((elapsed * self.freq).sin() * 0.5 + 0.5) * self.amplitude
    }

    fn advance(&mut self, stage: &mut Stage, delta: f64) -> NightrailResult<()> {
        self.elapsed += delta;
        let y = self.base + self.offset_at(self.elapsed);
        stage.node_mut(self.node)?.y = y;
        Ok(())
    }
}

/// One smoke puff: a node plus its normalized animation phase.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Puff {
    pub node: NodeId,
    pub progress: f64,
}

/// Progress-driven particle group. Each puff's phase advances modulo 1 and
/// drives position, scale and alpha; phases are staggered at construction so
/// the stream looks continuous.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PuffStream {
    pub base: Point,
    pub drift: Vec2,
    pub rate: f64,
    pub puffs: Vec<Puff>,
}

impl PuffStream {
    /// Derived state at a given phase: (x, y, scale, alpha).
    ///
    /// At `progress = 0` the puff sits at the emission point with scale exactly
    /// 0 and alpha 1; approaching 1 it is fully displaced, full scale and
    /// transparent, then wraps back to the emission point.
    pub fn state_at(&self, progress: f64) -> (f64, f64, f64, f64) {
        (
            self.base.x - progress * progress * self.drift.x,
            self.base.y - progress * self.drift.y,
            progress.powf(0.75),
            1.0 - progress.sqrt(),
        )
    }

    fn advance(&mut self, stage: &mut Stage, delta: f64) -> NightrailResult<()> {
        for i in 0..self.puffs.len() {
            self.puffs[i].progress = (self.puffs[i].progress + delta * self.rate).fract();
            let puff = &self.puffs[i];
            let (x, y, scale, alpha) = self.state_at(puff.progress);
            let node = stage.node_mut(puff.node)?;
            node.x = x;
            node.y = y;
            node.scale = scale;
            node.alpha = alpha;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Serialize)]
pub enum Actor {
    Scroller(Scroller),
    Rotator(Rotator),
    Oscillator(Oscillator),
    PuffStream(PuffStream),
}

impl Actor {
    pub fn validate(&self) -> NightrailResult<()> {
        match self {
            Self::Scroller(s) => {
                if !s.speed.is_finite() || s.speed < 0.0 {
                    return Err(NightrailError::validation("scroller speed must be >= 0"));
                }
                s.wrap.validate()
            }
            Self::Rotator(_) => Ok(()),
            Self::Oscillator(o) => {
                if !o.freq.is_finite() || o.freq <= 0.0 {
                    return Err(NightrailError::validation("oscillator freq must be > 0"));
                }
                Ok(())
            }
            Self::PuffStream(p) => {
                if !p.rate.is_finite() || p.rate <= 0.0 {
                    return Err(NightrailError::validation("puff rate must be > 0"));
                }
                for puff in &p.puffs {
                    if !(0.0..1.0).contains(&puff.progress) {
                        return Err(NightrailError::validation(
                            "puff progress must be in [0, 1)",
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    pub fn advance(&mut self, stage: &mut Stage, delta: f64) -> NightrailResult<()> {
        match self {
            Self::Scroller(s) => s.advance(stage, delta),
            Self::Rotator(r) => r.advance(stage, delta),
            Self::Oscillator(o) => o.advance(stage, delta),
            Self::PuffStream(p) => p.advance(stage, delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DisplayNode;

    fn stage_with(n: usize) -> (Stage, Vec<NodeId>) {
        let mut stage = Stage::new();
        let ids = (0..n).map(|_| stage.add(DisplayNode::new())).collect();
        (stage, ids)
    }

    #[test]
    fn scroller_moves_then_wraps_at_most_once() {
        let (mut stage, ids) = stage_with(1);
        let width = 800.0;
        let span = 2.0 * width;
        let mut actor = Actor::Scroller(Scroller {
            nodes: ids.clone(),
            speed: 0.5,
            wrap: WrapRule {
                axis: Axis::X,
                threshold: -width,
                offset: span,
            },
        });

        // Plain move while inside the band.
        stage.node_mut(ids[0]).unwrap().x = 0.0;
        actor.advance(&mut stage, 2.0).unwrap();
        assert_eq!(stage.node(ids[0]).unwrap().x, -1.0);

        // Crossing the threshold wraps by exactly one span.
        stage.node_mut(ids[0]).unwrap().x = -width + 0.25;
        actor.advance(&mut stage, 1.0).unwrap();
        assert_eq!(stage.node(ids[0]).unwrap().x, -width - 0.25 + span);

        // Never double-wraps in one step while delta * speed < span.
        for start in [-width + 0.1, -10.0, 0.0, 500.0] {
            stage.node_mut(ids[0]).unwrap().x = start;
            actor.advance(&mut stage, 100.0).unwrap();
            let x = stage.node(ids[0]).unwrap().x;
            assert!(x > -width - span);
        }
    }

    #[test]
    fn rotator_accumulates_without_bound() {
        let (mut stage, ids) = stage_with(2);
        let mut actor = Actor::Rotator(Rotator {
            nodes: vec![(ids[0], 0.15), (ids[1], 0.15 * 35.0 / 55.0)],
        });
        for _ in 0..100 {
            actor.advance(&mut stage, 1.0).unwrap();
        }
        assert!((stage.node(ids[0]).unwrap().rotation - 15.0).abs() < 1e-9);
        let slow = stage.node(ids[1]).unwrap().rotation;
        assert!((slow - 15.0 * 35.0 / 55.0).abs() < 1e-9);
    }

    #[test]
    fn oscillator_is_bounded_and_periodic() {
        let osc = Oscillator {
            node: NodeId(0),
            base: 100.0,
            amplitude: 3.0,
            freq: 0.25,
            elapsed: 0.0,
        };
        let period = std::f64::consts::TAU / osc.freq;
        for i in 0..500 {
            let e = i as f64 * 0.37;
            let off = osc.offset_at(e);
            assert!((0.0..=3.0).contains(&off));
            assert!((off - osc.offset_at(e + period)).abs() < 1e-9);
        }
    }

    #[test]
    fn puff_progress_stays_normalized() {
        let (mut stage, ids) = stage_with(1);
        let mut actor = Actor::PuffStream(PuffStream {
            base: Point::new(570.0, 450.0),
            drift: Vec2::new(400.0, 200.0),
            rate: 0.01,
            puffs: vec![Puff {
                node: ids[0],
                progress: 0.8,
            }],
        });
        for _ in 0..1000 {
            actor.advance(&mut stage, 7.3).unwrap();
            let Actor::PuffStream(p) = &actor else {
                unreachable!()
            };
            let progress = p.puffs[0].progress;
            assert!((0.0..1.0).contains(&progress));
        }
    }

    #[test]
    fn puff_at_zero_is_at_emission_with_zero_scale() {
        let stream = PuffStream {
            base: Point::new(570.0, 450.0),
            drift: Vec2::new(400.0, 200.0),
            rate: 0.01,
            puffs: Vec::new(),
        };
        let (x, y, scale, alpha) = stream.state_at(0.0);
        assert_eq!(x, 570.0);
        assert_eq!(y, 450.0);
        assert_eq!(scale, 0.0);
        assert_eq!(alpha, 1.0);
    }

    #[test]
    fn puff_near_one_is_displaced_scaled_and_transparent() {
        let stream = PuffStream {
            base: Point::new(570.0, 450.0),
            drift: Vec2::new(400.0, 200.0),
            rate: 0.01,
            puffs: Vec::new(),
        };
        let (x, y, scale, alpha) = stream.state_at(1.0 - 1e-9);
        assert!((x - (570.0 - 400.0)).abs() < 1e-5);
        assert!((y - (450.0 - 200.0)).abs() < 1e-5);
        assert!(scale > 0.999_999);
        assert!(alpha < 1e-4);
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let bad_wrap = Actor::Scroller(Scroller {
            nodes: Vec::new(),
            speed: 1.0,
            wrap: WrapRule {
                axis: Axis::X,
                threshold: -10.0,
                offset: 0.0,
            },
        });
        assert!(bad_wrap.validate().is_err());

        let bad_puff = Actor::PuffStream(PuffStream {
            base: Point::ZERO,
            drift: Vec2::ZERO,
            rate: 0.01,
            puffs: vec![Puff {
                node: NodeId(0),
                progress: 1.0,
            }],
        });
        assert!(bad_puff.validate().is_err());
    }
}
