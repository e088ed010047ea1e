//! # Voxel Mesh Core Demo
//!
//! Builds the faces of a small synthetic scene on one worker and logs what the
//! lighting and culling code decided. The shared index buffer is created on
//! the first available GPU adapter, or in host memory when there is none.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- [meshing.json]
//! ```

use std::collections::HashMap;

use cgmath::Point3;
use log::{error, info, warn};
use voxel_mesh_core::{
    BlockSide, BlockState, BlockView, CommandList, DirectionalShading, FaceShape, HostCommandList,
    IndexBufferError, LightWord, MeshBuildContext, MeshingConfig, ModelQuad, SparseLightCache,
    WgpuCommandList,
};
use web_time::Instant;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DemoBlock {
    Air,
    Stone,
    Glowstone,
    Slab,
    Path,
}

impl DemoBlock {
    fn is_solid(self) -> bool {
        self != DemoBlock::Air
    }

    /// Height of the block's top face, in blocks.
    fn height(self) -> f32 {
        match self {
            DemoBlock::Slab => 0.5,
            DemoBlock::Path => 15.0 / 16.0,
            _ => 1.0,
        }
    }
}

struct DemoScene {
    blocks: HashMap<Point3<i32>, DemoBlock>,
}

impl DemoScene {
    /// An 8x8 stone floor with a glowstone, a slab and a path block on top.
    fn new() -> Self {
        let mut blocks = HashMap::new();
        for x in 0..8 {
            for z in 0..8 {
                blocks.insert(Point3::new(x, 0, z), DemoBlock::Stone);
            }
        }
        blocks.insert(Point3::new(2, 1, 2), DemoBlock::Glowstone);
        blocks.insert(Point3::new(3, 1, 2), DemoBlock::Slab);
        blocks.insert(Point3::new(5, 1, 5), DemoBlock::Path);

        Self { blocks }
    }

    /// Bakes a light snapshot: full sky light above the floor and block light around the glowstone.
    fn light_snapshot(&self) -> SparseLightCache {
        let mut light = SparseLightCache::with_fallback(LightWord::new(0, 240).with_ao(1.0));

        for x in -1..=8 {
            for y in -1..=3 {
                for z in -1..=8 {
                    let pos = Point3::new(x, y, z);
                    let block = self.block_state(pos);
                    let distance = (pos - Point3::new(2, 1, 2)).map(i32::abs);
                    let glow = 240 - 16 * (distance.x + distance.y + distance.z).min(15);
                    let sky = if y >= 1 { 240 } else { 0 };

                    let word = if block.is_solid() {
                        let full = block.height() == 1.0;
                        LightWord::new(0, 0)
                            .with_ao(0.2)
                            .with_opaque(full)
                            .with_full_opaque(full)
                            .with_full_cube_face(full)
                            .with_emissive(block == DemoBlock::Glowstone)
                    } else {
                        LightWord::new(glow as u8, sky).with_ao(1.0)
                    };
                    light.insert(pos, word);
                }
            }
        }

        light
    }
}

impl BlockState<DemoScene> for DemoBlock {
    type Shape = FaceShape;

    fn is_side_invisible(&self, _other: &Self, _side: BlockSide) -> bool {
        false
    }

    fn is_opaque(&self) -> bool {
        self.is_solid()
    }

    fn culling_face(&self, _view: &DemoScene, _pos: Point3<i32>, side: BlockSide) -> FaceShape {
        match (self, side) {
            (DemoBlock::Air, _) => FaceShape::empty(),
            (DemoBlock::Stone | DemoBlock::Glowstone, _) => FaceShape::full_cube(),
            (_, BlockSide::DOWN) => FaceShape::full_cube(),
            (_, BlockSide::UP) => FaceShape::empty(),
            (block, _) => FaceShape::from_rect(0, 0, 16, (block.height() * 16.0) as usize),
        }
    }
}

impl BlockView for DemoScene {
    type State = DemoBlock;

    fn block_state(&self, pos: Point3<i32>) -> DemoBlock {
        self.blocks.get(&pos).copied().unwrap_or(DemoBlock::Air)
    }
}

/// The model quad of `block` on `side`, squashed to the block's height.
fn model_quad(block: DemoBlock, side: BlockSide) -> ModelQuad {
    let height = block.height();
    let positions = voxel_mesh_core::full_face_vertices(side).map(|pos| {
        let y = if side == BlockSide::DOWN { pos.y } else { pos.y * height };
        Point3::new(pos.x, y, pos.z)
    });

    ModelQuad::new(positions, side)
}

fn build_scene<C: CommandList>(
    scene: &DemoScene,
    config: &MeshingConfig,
    commands: &mut C,
) -> Result<(), IndexBufferError> {
    let light = scene.light_snapshot();
    let mut context = MeshBuildContext::new(config, &light, DirectionalShading, commands);

    let mut brightest = (0.0f32, Point3::new(0, 0, 0), BlockSide::UP);
    let mut positions: Vec<_> = scene.blocks.keys().copied().collect();
    positions.sort_by_key(|pos| (pos.y, pos.z, pos.x));

    let start = Instant::now();
    for pos in positions {
        let block = scene.block_state(pos);

        for side in BlockSide::all() {
            let quad = model_quad(block, side);
            // The top of a short block sits inside its own cell, so no neighbor can hide it.
            let cull_face = if side == BlockSide::UP && block.height() < 1.0 {
                None
            } else {
                Some(side)
            };

            if let Some(lit) = context.light_quad(scene, &block, pos, &quad, cull_face, side, true) {
                let sky = lit.lm.iter().map(|lm| (lm >> 16) as f32).sum::<f32>() / 4.0;
                let brightness = sky * lit.br.iter().sum::<f32>() / 4.0;
                if brightness > brightest.0 {
                    brightest = (brightness, pos, side);
                }
            }
        }
    }
    let elapsed = start.elapsed();

    let quads = context.finish_build(commands)?;
    info!(
        "Meshed {} quads from {} blocks in {:?} ({} shape comparisons memoized)",
        quads,
        scene.blocks.len(),
        elapsed,
        context.occlusion.len()
    );
    info!(
        "Brightest face: {:?} of {:?} at {:?}",
        brightest.2,
        scene.block_state(brightest.1),
        brightest.1
    );
    info!(
        "Index buffer covers {} quads as {:?}",
        context.index_buffer.max_primitives(),
        context.index_buffer.index_format()
    );

    context.index_buffer.delete(commands);
    Ok(())
}

async fn request_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok()?;

    info!("Using adapter {}", adapter.get_info().name);

    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Mesh Build Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        })
        .await
        .ok()
}

fn main() {
    voxel_mesh_core::init_logger();

    let config = match std::env::args().nth(1) {
        Some(path) => match MeshingConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!("{}, using defaults", err);
                MeshingConfig::default()
            }
        },
        None => MeshingConfig::default(),
    };

    let scene = DemoScene::new();

    let result = match pollster::block_on(request_device()) {
        Some((device, queue)) => {
            let mut commands = WgpuCommandList::new(&device, &queue);
            let result = build_scene(&scene, &config, &mut commands);
            queue.submit(std::iter::empty());
            result
        }
        None => {
            warn!("No GPU adapter available, building the index buffer in host memory");
            build_scene(&scene, &config, &mut HostCommandList::new())
        }
    };

    if let Err(err) = result {
        error!("Mesh build failed: {}", err);
        std::process::exit(1);
    }
}
