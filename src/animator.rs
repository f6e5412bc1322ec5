use crate::{
    actor::Actor,
    error::{NightrailError, NightrailResult},
    node::Stage,
};

/// Owns every actor and advances them in registration order once per host
/// tick. The animator never owns a loop of its own; the embedder calls
/// [`Animator::advance`] with the frame's elapsed-time delta (1.0 = one
/// reference frame).
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Animator {
    actors: Vec<Actor>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, actor: Actor) -> NightrailResult<()> {
        actor.validate()?;
        self.actors.push(actor);
        Ok(())
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Advance every actor by `delta`. Each call is a pure function of the
    /// prior actor state and `delta`; there is no hidden accumulation outside
    /// the actor records themselves.
    #[tracing::instrument(skip(self, stage), level = "trace")]
    pub fn advance(&mut self, stage: &mut Stage, delta: f64) -> NightrailResult<()> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(NightrailError::validation(
                "tick delta must be finite and >= 0",
            ));
        }
        for actor in &mut self.actors {
            actor.advance(stage, delta)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actor::{Axis, Scroller, WrapRule},
        node::DisplayNode,
    };

    #[test]
    fn advance_rejects_bad_deltas() {
        let mut animator = Animator::new();
        let mut stage = Stage::new();
        assert!(animator.advance(&mut stage, -1.0).is_err());
        assert!(animator.advance(&mut stage, f64::NAN).is_err());
        assert!(animator.advance(&mut stage, f64::INFINITY).is_err());
        assert!(animator.advance(&mut stage, 0.0).is_ok());
    }

    #[test]
    fn push_validates_actors() {
        let mut animator = Animator::new();
        let bad = Actor::Scroller(Scroller {
            nodes: Vec::new(),
            speed: f64::NAN,
            wrap: WrapRule {
                axis: Axis::X,
                threshold: -1.0,
                offset: 1.0,
            },
        });
        assert!(animator.push(bad).is_err());
        assert!(animator.actors().is_empty());
    }

    // Reference numbers: 800-wide viewport, 200-wide trees spaced 15 apart,
    // scroll speed 3. Five trees tile the band; the recycle jump is
    // 5 * 215 + 45 = 1120.
    #[test]
    fn tree_band_scenario_end_to_end() {
        let mut stage = Stage::new();
        let tree = stage.add(DisplayNode::new());
        let mut animator = Animator::new();
        animator
            .push(Actor::Scroller(Scroller {
                nodes: vec![tree],
                speed: 3.0,
                wrap: WrapRule {
                    axis: Axis::X,
                    threshold: -(200.0 / 2.0 + 15.0),
                    offset: 5.0 * 215.0 + 45.0,
                },
            }))
            .unwrap();

        animator.advance(&mut stage, 1.0).unwrap();
        assert_eq!(stage.node(tree).unwrap().x, -3.0);

        // The step that carries the tree past -115 recycles it forward.
        stage.node_mut(tree).unwrap().x = -113.0;
        animator.advance(&mut stage, 1.0).unwrap();
        assert_eq!(stage.node(tree).unwrap().x, -116.0 + 1120.0);
    }
}
