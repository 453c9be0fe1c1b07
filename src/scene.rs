use std::collections::{HashMap, VecDeque};

use generational_arena::Arena;
use smallvec::SmallVec;
use ultraviolet::Vec3;

use crate::material::{FlatMaterial, Material};
use crate::resources::{Handle, ResourceCache};
use crate::{Color, Error, Layers};

/// Material storage of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSlot {
    Single(Handle<Material>),
    /// One material per geometry group.
    Multi(SmallVec<[Handle<Material>; 4]>),
}

/// A renderable mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub material: MaterialSlot,
}

impl Mesh {
    pub fn new(material: Handle<Material>) -> Self {
        Self {
            material: MaterialSlot::Single(material),
        }
    }

    pub fn multi<I>(materials: I) -> Self
    where
        I: IntoIterator<Item = Handle<Material>>,
    {
        Self {
            material: MaterialSlot::Multi(materials.into_iter().collect()),
        }
    }

    /// Returns the material if the mesh uses a single one.
    pub fn single_material(&self) -> Option<Handle<Material>> {
        match &self.material {
            MaterialSlot::Single(material) => Some(*material),
            MaterialSlot::Multi(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh(Mesh),
    Group,
    Light,
}

#[derive(Debug, Clone)]
pub struct Node {
    /// The name of this node.
    name: String,
    layers: Layers,
    position: Vec3,
    kind: NodeKind,
    parent: Option<Handle<Node>>,
    children: Vec<Handle<Node>>,
}

impl Node {
    pub fn new<S: Into<String>>(name: S, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            layers: Layers::default(),
            position: Vec3::zero(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh<S: Into<String>>(name: S, mesh: Mesh) -> Self {
        Self::new(name, NodeKind::Mesh(mesh))
    }

    pub fn group<S: Into<String>>(name: S) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn light<S: Into<String>>(name: S) -> Self {
        Self::new(name, NodeKind::Light)
    }

    pub fn with_layers(mut self, layers: Layers) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut Layers {
        &mut self.layers
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Handle<Node>> {
        self.parent
    }

    pub fn children(&self) -> &[Handle<Node>] {
        &self.children
    }
}

/// A hierarchy of nodes along with the materials they reference.
pub struct Scene {
    nodes: Arena<Node>,
    roots: Vec<Handle<Node>>,
    materials: ResourceCache<Material>,
    /// Unnamed flat materials by color, kept apart from named materials.
    flats: HashMap<Color, Handle<Material>>,
    modified: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            roots: Vec::new(),
            materials: ResourceCache::new(),
            flats: HashMap::new(),
            modified: false,
        }
    }

    /// Adds a node at the top level of the scene.
    pub fn add(&mut self, mut node: Node) -> Handle<Node> {
        node.parent = None;
        node.children.clear();

        let handle = self.nodes.insert(node).into();
        self.roots.push(handle);
        self.modified = true;
        handle
    }

    /// Adds a node as the last child of `parent`.
    pub fn add_child(
        &mut self,
        parent: Handle<Node>,
        mut node: Node,
    ) -> Result<Handle<Node>, Error> {
        if !self.nodes.contains(parent.into()) {
            return Err(Error::NodeNotFound(parent));
        }

        node.parent = Some(parent);
        node.children.clear();

        let handle = self.nodes.insert(node).into();
        if let Some(parent) = self.nodes.get_mut(parent.into()) {
            parent.children.push(handle);
        }

        self.modified = true;
        Ok(handle)
    }

    /// Removes a node and all of its descendants. Returns false if the node was already
    /// removed.
    pub fn remove(&mut self, handle: Handle<Node>) -> bool {
        let node = match self.nodes.remove(handle.into()) {
            Some(node) => node,
            None => return false,
        };

        match node.parent.and_then(|parent| self.nodes.get_mut(parent.into())) {
            Some(parent) => parent.children.retain(|child| *child != handle),
            None => self.roots.retain(|root| *root != handle),
        }

        let mut stack = node.children;
        while let Some(child) = stack.pop() {
            if let Some(child) = self.nodes.remove(child.into()) {
                stack.extend(child.children);
            }
        }

        self.modified = true;
        true
    }

    pub fn node(&self, handle: Handle<Node>) -> Option<&Node> {
        self.nodes.get(handle.into())
    }

    pub fn node_mut(&mut self, handle: Handle<Node>) -> Option<&mut Node> {
        self.nodes.get_mut(handle.into())
    }

    /// Searches for the first node with name in traversal order.
    pub fn find<S: AsRef<str>>(&self, name: S) -> Option<Handle<Node>> {
        let name = name.as_ref();
        self.traverse()
            .into_iter()
            .find(|handle| self.node(*handle).map(Node::name) == Some(name))
    }

    pub fn roots(&self) -> &[Handle<Node>] {
        &self.roots
    }

    /// Returns every node in depth first pre-order, with roots in insertion order.
    pub fn traverse(&self) -> Vec<Handle<Node>> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: VecDeque<Handle<Node>> = self.roots.iter().copied().collect();

        while let Some(handle) = stack.pop_front() {
            let node = match self.node(handle) {
                Some(node) => node,
                None => continue,
            };

            order.push(handle);

            for child in node.children.iter().rev() {
                stack.push_front(*child);
            }
        }

        order
    }

    /// Returns the number of nodes in the scene.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inserts a material by name, or returns the already existing material with that name.
    pub fn add_material<S>(&mut self, name: S, material: Material) -> Handle<Material>
    where
        S: AsRef<str> + Into<String>,
    {
        self.materials.get_or_insert(name, || material)
    }

    /// Returns the shared flat material of `color`, creating it if needed. Never returns a
    /// material added by name.
    pub fn flat_material(&mut self, color: Color) -> Handle<Material> {
        if let Some(handle) = self.flats.get(&color) {
            if self.materials.raw(*handle).is_ok() {
                return *handle;
            }
        }

        let handle = self
            .materials
            .insert_unnamed(FlatMaterial::new(color).into());
        self.flats.insert(color, handle);
        handle
    }

    /// Returns the material currently used by a single material mesh.
    pub fn material_of(&self, handle: Handle<Node>) -> Option<&Material> {
        let material = self.node(handle)?.as_mesh()?.single_material()?;
        self.materials.raw(material).ok()
    }

    pub fn materials(&self) -> &ResourceCache<Material> {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut ResourceCache<Material> {
        &mut self.materials
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn clear_modified(&mut self) {
        self.modified = false
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn scene() -> (Scene, [Handle<Node>; 5]) {
        let mut scene = Scene::new();
        let material = scene.add_material("white", Material::standard(Color::white(), 1.0));

        let a = scene.add(Node::group("a"));
        let a1 = scene.add_child(a, Node::mesh("a1", Mesh::new(material))).unwrap();
        let a1x = scene.add_child(a1, Node::light("a1x")).unwrap();
        let a2 = scene.add_child(a, Node::mesh("a2", Mesh::new(material))).unwrap();
        let b = scene.add(Node::mesh("b", Mesh::new(material)));

        (scene, [a, a1, a1x, a2, b])
    }

    #[test]
    fn traverse_depth_first() {
        let (scene, [a, a1, a1x, a2, b]) = scene();

        assert_eq!(scene.traverse(), vec![a, a1, a1x, a2, b]);
        assert_eq!(scene.roots(), &[a, b]);
        assert_eq!(scene.node(a1x).unwrap().parent(), Some(a1));
        assert_eq!(scene.find("a2"), Some(a2));
        assert_eq!(scene.find("missing"), None);
        assert!(scene.is_modified());
    }

    #[test]
    fn remove_subtree() {
        let (mut scene, [a, a1, a1x, a2, b]) = scene();
        scene.clear_modified();

        assert!(scene.remove(a1));
        assert!(!scene.remove(a1));
        assert!(scene.node(a1x).is_none());
        assert_eq!(scene.node(a).unwrap().children(), &[a2]);
        assert_eq!(scene.traverse(), vec![a, a2, b]);
        assert!(scene.is_modified());

        assert!(scene.remove(b));
        assert_eq!(scene.roots(), &[a]);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn add_child_to_removed_parent() {
        let (mut scene, [a, ..]) = scene();
        scene.remove(a);

        assert!(matches!(
            scene.add_child(a, Node::group("orphan")),
            Err(Error::NodeNotFound(handle)) if handle == a
        ));
    }

    #[test]
    fn named_materials_are_shared() {
        let mut scene = Scene::new();
        let first = scene.add_material("m", Material::standard(Color::red(), 0.5));
        let second = scene.add_material("m", Material::standard(Color::blue(), 1.0));

        assert_eq!(first, second);
        assert_eq!(scene.materials().len(), 1);
        assert_eq!(scene.materials().raw(first).unwrap().color(), Color::red());
    }

    #[test]
    fn flat_materials_ignore_names() {
        let mut scene = Scene::new();
        let named = scene.add_material("black", Material::flat(Color::black()));

        let flat = scene.flat_material(Color::black());
        assert_ne!(flat, named);
        assert_eq!(scene.flat_material(Color::black()), flat);
        assert_eq!(scene.materials().len(), 2);

        // Removed flats are recreated
        scene.materials_mut().remove(flat);
        let recreated = scene.flat_material(Color::black());
        assert_ne!(recreated, flat);
        assert_eq!(
            scene.materials().raw(recreated).unwrap(),
            &Material::flat(Color::black())
        );
    }

    #[test]
    fn multi_material_mesh() {
        let mut scene = Scene::new();
        let a = scene.add_material("a", Material::standard(Color::red(), 1.0));
        let b = scene.add_material("b", Material::standard(Color::blue(), 1.0));
        let node = scene.add(Node::mesh("multi", Mesh::multi(vec![a, b])));

        let mesh = scene.node(node).unwrap().as_mesh().unwrap();
        assert_eq!(mesh.single_material(), None);
        assert!(scene.material_of(node).is_none());
    }
}
