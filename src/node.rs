use crate::{
    core::{Affine, BezPath, Rgba8},
    error::{NightrailError, NightrailResult},
    svg::PreparedRaster,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct NodeId(pub u32);

#[derive(Clone, Debug, serde::Serialize)]
pub enum Shape {
    /// A filled vector path in node-local coordinates.
    Fill { path: BezPath, color: Rgba8 },
    /// A prepared raster blitted with its top-left at the node origin.
    Raster(PreparedRaster),
}

/// A drawable element. Geometry is fixed after construction; the animator only
/// mutates position, rotation, scale and alpha.
#[derive(Clone, Debug, serde::Serialize)]
pub struct DisplayNode {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub alpha: f64,
    pub shapes: Vec<Shape>,
    // Set only by `Stage::add_child`, which keeps parent indices below child
    // indices; `resolve_world` relies on that ordering.
    parent: Option<NodeId>,
}

impl Default for DisplayNode {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
            alpha: 1.0,
            shapes: Vec::new(),
            parent: None,
        }
    }
}

impl DisplayNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shapes(shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            ..Self::default()
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn local_affine(&self) -> Affine {
        Affine::translate((self.x, self.y))
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
    }
}

/// Flat node arena in painter's order. Children are appended after their parent,
/// so parent indices are always smaller than child indices and world state can
/// be resolved in a single forward pass.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Stage {
    nodes: Vec<DisplayNode>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: DisplayNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, mut node: DisplayNode) -> NightrailResult<NodeId> {
        if parent.0 as usize >= self.nodes.len() {
            return Err(NightrailError::scene(format!(
                "parent node {} does not exist",
                parent.0
            )));
        }
        node.parent = Some(parent);
        Ok(self.add(node))
    }

    pub fn node(&self, id: NodeId) -> NightrailResult<&DisplayNode> {
        self.nodes
            .get(id.0 as usize)
            .ok_or_else(|| NightrailError::scene(format!("node {} does not exist", id.0)))
    }

    pub fn node_mut(&mut self, id: NodeId) -> NightrailResult<&mut DisplayNode> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or_else(|| NightrailError::scene(format!("node {} does not exist", id.0)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in painter's (insertion) order.
    pub fn iter(&self) -> impl Iterator<Item = &DisplayNode> {
        self.nodes.iter()
    }

    /// World transform and world alpha per node, in painter's order.
    pub fn resolve_world(&self) -> Vec<(Affine, f64)> {
        let mut out: Vec<(Affine, f64)> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let (parent_affine, parent_alpha) = match node.parent {
                // Parent index is always < child index, see `add_child`.
                Some(p) => out[p.0 as usize],
                None => (Affine::IDENTITY, 1.0),
            };
            out.push((
                parent_affine * node.local_affine(),
                parent_alpha * node.alpha.clamp(0.0, 1.0),
            ));
        }
        out
    }
}
