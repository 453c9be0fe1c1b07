use log::*;
use rand::Rng;
use std::error::Error;
use ultraviolet::Vec3;

use selective_bloom::*;

const OBJECT_COUNT: usize = 8;
const FRAMES: usize = 3;

fn build_scene(config: &BloomConfig) -> Result<Scene, Box<dyn Error>> {
    let mut rng = rand::thread_rng();
    let mut scene = Scene::new();

    let root = scene.add(Node::group("world"));
    let sun = scene.add_material("sun", Material::standard("#ffd27f".parse()?, 1.0));
    scene.add_child(
        root,
        Node::mesh("sun", Mesh::new(sun)).with_layers(Layers::new().with(config.layer)),
    )?;
    scene.add_child(root, Node::light("key light"))?;

    for i in 0..OBJECT_COUNT {
        let name = format!("object {}", i);
        let opacity = rng.gen_range(0.0..=1.0);
        let material = scene.add_material(&name, Material::standard(Color::white(), opacity));

        let position = Vec3::new(rng.gen_range(-10.0..10.0), 0.0, rng.gen_range(-10.0..10.0));
        scene.add_child(
            root,
            Node::mesh(name, Mesh::new(material)).with_position(position),
        )?;
    }

    Ok(scene)
}

fn describe(scene: &Scene) {
    for handle in scene.traverse() {
        let node = match scene.node(handle) {
            Some(node) => node,
            None => continue,
        };

        if let Some(material) = scene.material_of(handle) {
            info!(
                "{:>10} at {:?}: {}",
                node.name(),
                node.position(),
                material.color()
            );
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logger::init()?;

    let config = BloomConfig::default();
    let mut scene = build_scene(&config)?;
    let mut pass = BloomPass::new(config)?;

    info!("Scene has {} nodes", scene.len());

    for frame in 0..FRAMES {
        info!("Frame {}: bloom pass", frame);
        let darkened = pass.render(&mut scene, |scene| {
            describe(scene);
            pass_summary(scene)
        })?;

        info!("Frame {}: composite pass ({} masked)", frame, darkened);
        describe(&scene);
    }

    Ok(())
}

// Number of meshes currently showing a flat material
fn pass_summary(scene: &Scene) -> usize {
    scene
        .traverse()
        .into_iter()
        .filter_map(|handle| scene.material_of(handle))
        .filter(|material| material.is_flat())
        .count()
}
