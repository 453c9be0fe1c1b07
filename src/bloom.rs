//! Selective bloom masking.
//!
//! Before rendering the bloom-only pass every mesh which is not part of the bloom layer is
//! [darkened](darken): its material is swapped for a flat material so that only the
//! intended objects pass the bloom threshold. After the pass the original materials are
//! [restored](restore). The original materials are kept in a [`SaveTable`] owned by the
//! caller for exactly one darken/restore cycle, or managed by a [`BloomPass`].

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::layers::LAYER_COUNT;
use crate::material::Material;
use crate::resources::Handle;
use crate::scene::{MaterialSlot, Mesh, Node, Scene};
use crate::{Color, Error, Layers};

/// Colors used to build the mask color of a darkened mesh.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Palette {
    /// Color of a fully opaque mesh.
    pub dark: Color,
    /// Color of a fully transparent mesh.
    pub glow: Color,
}

impl Palette {
    pub fn new(dark: Color, glow: Color) -> Self {
        Self { dark, glow }
    }

    /// Returns the flat color for a material of `opacity`.
    pub fn mask_color(&self, opacity: f32) -> Color {
        self.dark.lerp(self.glow, 1.0 - opacity)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Color::black(), Color::yellow())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BloomConfig {
    /// The layer channel of bloomed nodes.
    pub layer: u8,
    pub palette: Palette,
}

impl BloomConfig {
    pub const DEFAULT_LAYER: u8 = 1;

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            layer: Self::DEFAULT_LAYER,
            palette: Palette::default(),
        }
    }
}

/// Maps darkened nodes to the material they held before being darkened.
///
/// A node is present if and only if it currently holds a substituted material.
#[derive(Debug, Default)]
pub struct SaveTable {
    originals: HashMap<Handle<Node>, Handle<Material>>,
}

impl SaveTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves `material` as the original of `node` unless an original is already saved.
    /// Returns true if the material was saved.
    pub fn save(&mut self, node: Handle<Node>, material: Handle<Material>) -> bool {
        use std::collections::hash_map::Entry;

        match self.originals.entry(node) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(material);
                true
            }
        }
    }

    /// Returns the saved original material of `node`.
    pub fn original(&self, node: Handle<Node>) -> Option<Handle<Material>> {
        self.originals.get(&node).copied()
    }

    pub fn contains(&self, node: Handle<Node>) -> bool {
        self.originals.contains_key(&node)
    }

    /// Removes and returns the saved original material of `node`.
    pub fn take(&mut self, node: Handle<Node>) -> Option<Handle<Material>> {
        self.originals.remove(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = Handle<Node>> + '_ {
        self.originals.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    pub fn clear(&mut self) {
        self.originals.clear()
    }
}

/// Darkens `node` using the default black to yellow palette.
///
/// See [`darken_with`].
pub fn darken<F>(
    scene: &mut Scene,
    node: Handle<Node>,
    is_bloomed: F,
    saved: &mut SaveTable,
) -> Result<(), Error>
where
    F: FnOnce(&Node) -> bool,
{
    darken_with(scene, node, is_bloomed, &Palette::default(), saved)
}

/// Replaces the material of a non bloomed, single material mesh with a flat material.
///
/// The color is interpolated from `palette.dark` to `palette.glow` by one minus the opacity
/// of the original material. The original is saved in `saved` the first time the node is
/// darkened and is used for every subsequent darken until restored.
///
/// Nodes that are not meshes, that are bloomed, or that have multiple materials are left
/// untouched. Returns an error if the original material no longer exists.
pub fn darken_with<F>(
    scene: &mut Scene,
    node: Handle<Node>,
    is_bloomed: F,
    palette: &Palette,
    saved: &mut SaveTable,
) -> Result<(), Error>
where
    F: FnOnce(&Node) -> bool,
{
    let n = match scene.node(node) {
        Some(n) if n.is_mesh() => n,
        _ => return Ok(()),
    };

    if is_bloomed(n) {
        return Ok(());
    }

    let current = match n.as_mesh().and_then(Mesh::single_material) {
        Some(material) => material,
        None => {
            trace!("Skipping multi material mesh {:?}", n.name());
            return Ok(());
        }
    };

    let original = saved.original(node).unwrap_or(current);
    let opacity = scene.materials().raw(original)?.opacity();

    saved.save(node, original);

    let color = palette.mask_color(opacity);
    let substitute = scene.flat_material(color);

    if let Some(mesh) = scene.node_mut(node).and_then(Node::as_mesh_mut) {
        trace!("Darkening {:?} to {}", node, color);
        mesh.material = MaterialSlot::Single(substitute);
    }

    Ok(())
}

/// Restores the material saved for `node` and removes it from `saved`. Returns true if the
/// material was written back.
///
/// Does nothing if no material is saved for the node. If the node has since been removed
/// or is no longer a mesh the saved entry is discarded without writing anything.
pub fn restore(scene: &mut Scene, node: Handle<Node>, saved: &mut SaveTable) -> bool {
    let original = match saved.take(node) {
        Some(original) => original,
        None => return false,
    };

    match scene.node_mut(node).and_then(Node::as_mesh_mut) {
        Some(mesh) => {
            mesh.material = MaterialSlot::Single(original);
            true
        }
        None => {
            warn!(
                "Discarding saved material of {:?} which is no longer a mesh in the scene",
                node
            );
            false
        }
    }
}

/// Drives darken and restore over an entire scene, owning the save table between the two.
#[derive(Debug)]
pub struct BloomPass {
    config: BloomConfig,
    bloom_layer: Layers,
    saved: SaveTable,
}

impl BloomPass {
    pub fn new(config: BloomConfig) -> Result<Self, Error> {
        if config.layer >= LAYER_COUNT {
            return Err(Error::InvalidLayer(config.layer));
        }

        Ok(Self {
            bloom_layer: Layers::channel(config.layer),
            config,
            saved: SaveTable::new(),
        })
    }

    /// Returns true if the node is part of the bloom layer.
    pub fn is_bloomed(&self, node: &Node) -> bool {
        self.bloom_layer.test(node.layers())
    }

    /// Darkens every node in the scene. Returns the number of darkened meshes.
    ///
    /// Fails with [`Error::PassInProgress`] if the previous pass has not been restored. If a
    /// node fails to darken the scene is restored before the error is returned.
    pub fn darken_scene(&mut self, scene: &mut Scene) -> Result<usize, Error> {
        if !self.saved.is_empty() {
            return Err(Error::PassInProgress(self.saved.len()));
        }

        let bloom_layer = self.bloom_layer;
        for node in scene.traverse() {
            let result = darken_with(
                scene,
                node,
                |n| bloom_layer.test(n.layers()),
                &self.config.palette,
                &mut self.saved,
            );

            // Leave no half darkened scene behind
            if let Err(e) = result {
                self.restore_scene(scene);
                return Err(e);
            }
        }

        debug!("Darkened {} meshes", self.saved.len());
        Ok(self.saved.len())
    }

    /// Restores every darkened node. Returns the number of restored meshes.
    ///
    /// The save table is always empty afterwards, also for nodes removed during the pass.
    pub fn restore_scene(&mut self, scene: &mut Scene) -> usize {
        let mut restored = 0;

        for node in scene.traverse() {
            if restore(scene, node, &mut self.saved) {
                restored += 1;
            }
        }

        // Nodes removed from the scene since darkening
        let stale: Vec<_> = self.saved.nodes().collect();
        for node in stale {
            restore(scene, node, &mut self.saved);
        }

        debug!("Restored {} meshes", restored);
        restored
    }

    /// Darkens the scene, calls `render` with the darkened scene and restores it.
    pub fn render<F, T>(&mut self, scene: &mut Scene, render: F) -> Result<T, Error>
    where
        F: FnOnce(&Scene) -> T,
    {
        self.darken_scene(scene)?;
        let result = render(scene);
        self.restore_scene(scene);
        Ok(result)
    }

    pub fn config(&self) -> &BloomConfig {
        &self.config
    }

    pub fn bloom_layer(&self) -> Layers {
        self.bloom_layer
    }

    pub fn saved(&self) -> &SaveTable {
        &self.saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources;
    use crate::scene::NodeKind;

    fn standard(scene: &mut Scene, name: &str, opacity: f32) -> Handle<Material> {
        scene.add_material(name, Material::standard(Color::white(), opacity))
    }

    fn current(scene: &Scene, node: Handle<Node>) -> Handle<Material> {
        scene
            .node(node)
            .and_then(Node::as_mesh)
            .and_then(Mesh::single_material)
            .unwrap()
    }

    fn never(_: &Node) -> bool {
        false
    }

    #[test]
    fn mask_color() {
        let palette = Palette::default();

        assert_eq!(palette.mask_color(1.0), Color::black());
        assert_eq!(palette.mask_color(0.0), Color::yellow());
        assert_eq!(palette.mask_color(0.5), Color::rgb(128, 128, 0));
    }

    #[test]
    fn save_keeps_first() {
        let mut scene = Scene::new();
        let a = standard(&mut scene, "a", 1.0);
        let b = standard(&mut scene, "b", 1.0);
        let node = scene.add(Node::mesh("mesh", Mesh::new(a)));

        let mut saved = SaveTable::new();
        assert!(saved.save(node, a));
        assert!(!saved.save(node, b));
        assert_eq!(saved.original(node), Some(a));
        assert_eq!(saved.take(node), Some(a));
        assert_eq!(saved.take(node), None);
        assert!(saved.is_empty());
    }

    #[test]
    fn darken_twice_keeps_original() {
        let mut scene = Scene::new();
        let original = standard(&mut scene, "glass", 0.25);
        let node = scene.add(Node::mesh("mesh", Mesh::new(original)));
        let mut saved = SaveTable::new();

        darken(&mut scene, node, never, &mut saved).unwrap();
        let first = current(&scene, node);
        darken(&mut scene, node, never, &mut saved).unwrap();
        let second = current(&scene, node);

        assert_eq!(saved.original(node), Some(original));
        assert_eq!(saved.len(), 1);
        assert_ne!(second, original);
        assert_eq!(first, second);
        assert_eq!(
            scene.materials().raw(second).unwrap(),
            &Material::flat(Color::rgb(191, 191, 0))
        );
    }

    #[test]
    fn restore_twice() {
        let mut scene = Scene::new();
        let original = standard(&mut scene, "glass", 0.25);
        let node = scene.add(Node::mesh("mesh", Mesh::new(original)));
        let mut saved = SaveTable::new();

        darken(&mut scene, node, never, &mut saved).unwrap();
        assert!(restore(&mut scene, node, &mut saved));
        assert!(!restore(&mut scene, node, &mut saved));

        assert_eq!(current(&scene, node), original);
        assert!(!saved.contains(node));
    }

    #[test]
    fn flat_materials_are_shared() {
        let mut scene = Scene::new();
        let material = standard(&mut scene, "opaque", 1.0);
        let a = scene.add(Node::mesh("a", Mesh::new(material)));
        let b = scene.add(Node::mesh("b", Mesh::new(material)));
        let mut saved = SaveTable::new();

        for _ in 0..3 {
            darken(&mut scene, a, never, &mut saved).unwrap();
            darken(&mut scene, b, never, &mut saved).unwrap();
        }

        assert_eq!(current(&scene, a), current(&scene, b));
        assert_eq!(scene.materials().len(), 2);
    }

    #[test]
    fn bloomed_and_non_mesh_untouched() {
        let mut scene = Scene::new();
        let material = standard(&mut scene, "m", 0.0);
        let mesh = scene.add(Node::mesh("mesh", Mesh::new(material)));
        let group = scene.add(Node::group("group"));
        let mut saved = SaveTable::new();

        darken(&mut scene, mesh, |_| true, &mut saved).unwrap();
        darken(&mut scene, group, never, &mut saved).unwrap();

        assert_eq!(current(&scene, mesh), material);
        assert!(saved.is_empty());
        assert!(!restore(&mut scene, group, &mut saved));
    }

    #[test]
    fn custom_palette() {
        let mut scene = Scene::new();
        let material = standard(&mut scene, "m", 0.0);
        let node = scene.add(Node::mesh("mesh", Mesh::new(material)));
        let mut saved = SaveTable::new();
        let palette = Palette::new(Color::blue(), Color::red());

        darken_with(&mut scene, node, never, &palette, &mut saved).unwrap();

        assert_eq!(scene.material_of(node), Some(&Material::flat(Color::red())));
    }

    #[test]
    fn invalid_material_is_an_error() {
        let mut scene = Scene::new();
        let removed = standard(&mut scene, "removed", 1.0);
        scene.materials_mut().remove(removed);
        let node = scene.add(Node::mesh("mesh", Mesh::new(removed)));
        let mut saved = SaveTable::new();

        let result = darken(&mut scene, node, never, &mut saved);

        assert!(matches!(
            result,
            Err(Error::ResourceError(resources::Error::InvalidHandle(_)))
        ));
        assert!(saved.is_empty());
        assert_eq!(current(&scene, node), removed);
    }

    #[test]
    fn substitute_is_flat_despite_name_clash() {
        let mut scene = Scene::new();
        let impostor = scene.add_material(
            format!("flat::{}", Color::black()),
            Material::standard(Color::white(), 0.3),
        );
        let material = standard(&mut scene, "opaque", 1.0);
        let node = scene.add(Node::mesh("mesh", Mesh::new(material)));
        let mut saved = SaveTable::new();

        darken(&mut scene, node, never, &mut saved).unwrap();

        assert_ne!(current(&scene, node), impostor);
        assert_eq!(scene.material_of(node), Some(&Material::flat(Color::black())));
        assert_eq!(saved.original(node), Some(material));
    }

    #[test]
    fn restore_after_kind_change() {
        let mut scene = Scene::new();
        let material = standard(&mut scene, "m", 1.0);
        let node = scene.add(Node::mesh("mesh", Mesh::new(material)));
        let mut saved = SaveTable::new();

        darken(&mut scene, node, never, &mut saved).unwrap();
        *scene.node_mut(node).unwrap().kind_mut() = NodeKind::Light;

        assert!(!restore(&mut scene, node, &mut saved));
        assert!(saved.is_empty());
        assert_eq!(scene.node(node).unwrap().kind(), &NodeKind::Light);
    }

    #[test]
    fn pass_rejects_invalid_layer() {
        let config = BloomConfig::default().with_layer(LAYER_COUNT);
        assert_eq!(
            BloomPass::new(config).unwrap_err(),
            Error::InvalidLayer(LAYER_COUNT)
        );
    }

    #[test]
    fn pass_in_progress() {
        let mut scene = Scene::new();
        let material = standard(&mut scene, "m", 1.0);
        scene.add(Node::mesh("mesh", Mesh::new(material)));
        let mut pass = BloomPass::new(BloomConfig::default()).unwrap();

        assert_eq!(pass.darken_scene(&mut scene), Ok(1));
        assert_eq!(pass.darken_scene(&mut scene), Err(Error::PassInProgress(1)));
        assert_eq!(pass.restore_scene(&mut scene), 1);
        assert_eq!(pass.darken_scene(&mut scene), Ok(1));
    }

    #[test]
    fn failed_pass_restores_scene() {
        let mut scene = Scene::new();
        let material = standard(&mut scene, "m", 1.0);
        let removed = standard(&mut scene, "removed", 1.0);
        scene.materials_mut().remove(removed);

        let good = scene.add(Node::mesh("good", Mesh::new(material)));
        let bad = scene.add(Node::mesh("bad", Mesh::new(removed)));
        let after = scene.add(Node::mesh("after", Mesh::new(material)));
        let mut pass = BloomPass::new(BloomConfig::default()).unwrap();

        // The flat material reuses the removed slot under a new generation
        assert!(matches!(
            pass.darken_scene(&mut scene),
            Err(Error::ResourceError(resources::Error::InvalidHandle(_)))
        ));
        assert!(pass.saved().is_empty());
        assert_eq!(current(&scene, good), material);
        assert_eq!(current(&scene, bad), removed);
        assert_eq!(current(&scene, after), material);
    }

    #[test]
    fn pass_drops_removed_nodes() {
        let mut scene = Scene::new();
        let material = standard(&mut scene, "m", 1.0);
        let group = scene.add(Node::group("group"));
        let child = scene
            .add_child(group, Node::mesh("child", Mesh::new(material)))
            .unwrap();
        let other = scene.add(Node::mesh("other", Mesh::new(material)));
        let mut pass = BloomPass::new(BloomConfig::default()).unwrap();

        assert_eq!(pass.darken_scene(&mut scene), Ok(2));
        scene.remove(group);

        assert_eq!(pass.restore_scene(&mut scene), 1);
        assert!(pass.saved().is_empty());
        assert!(scene.node(child).is_none());
        assert_eq!(current(&scene, other), material);
    }

    #[test]
    fn pass_tests_bloom_layer() {
        let pass = BloomPass::new(BloomConfig::default().with_layer(4)).unwrap();

        assert!(pass.is_bloomed(&Node::group("g").with_layers(Layers::new().with(4))));
        assert!(!pass.is_bloomed(&Node::group("g")));
        assert_eq!(pass.bloom_layer(), Layers::channel(4));
        assert_eq!(pass.config().layer, 4);
    }
}
