//! Builds the text scene from assets on disk and prints a summary.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;
    use text_scene::{scene_rng, AssetEvent, AssetLoader, FsAssetLoader, SceneAssembler, SceneConfig};

    /// Text scene builder arguments.
    #[derive(Parser, Debug)]
    #[command(
        name = "text-scene",
        about = "Build the extruded text and torus field scene",
        long_about = "Loads font/myfont.json and the matcap textures from the asset \
            directory, builds the two text meshes and the torus field, then prints \
            a summary of the assembled scene.\n\n\
            EXAMPLES:\n\
              # Reproducible field\n\
              text-scene --assets static --seed 7\n\
            \n\
              # Sparse field\n\
              text-scene --torus-count 20",
        version
    )]
    struct Args {
        /// Directory the asset paths are resolved against.
        #[arg(long, default_value = "static")]
        assets: PathBuf,

        /// Seed for the torus field. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of tori to place.
        #[arg(long, default_value = "300")]
        torus_count: usize,
    }

    pub fn run() -> ExitCode {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();

        let mut config = SceneConfig::default().with_torus_count(args.torus_count);
        if let Some(seed) = args.seed {
            config = config.with_seed(seed);
        }
        let mut rng = scene_rng(config.seed);

        let loader = FsAssetLoader::new(&args.assets);
        let result = pollster::block_on(SceneAssembler::new(config).assemble(&loader, &mut rng));
        loader.wait();

        let mut assembled = match result {
            Ok(assembled) => assembled,
            Err(e) => {
                log::error!("Failed to build scene: {}", e);
                return ExitCode::FAILURE;
            }
        };

        log::info!(
            "Scene: {} nodes ({} text, {} tori)",
            assembled.scene.node_count(),
            assembled.texts.len(),
            assembled.tori.len()
        );
        for (entity, mesh) in assembled.texts.iter().zip(&assembled.text_meshes) {
            let x = assembled.scene.transform(*entity).map_or(0.0, |t| t.position.x);
            let width = mesh.bounding_box().map_or(0.0, |b| b.size().x);
            log::info!(
                "  {:?}: x = {:.3}, width = {:.3}, {} triangles",
                mesh.name,
                x,
                width,
                mesh.triangle_count()
            );
        }
        let torus = &assembled.torus_mesh;
        log::info!(
            "  torus buffer: {} vertices, {} triangles, {} vertex bytes, {} index bytes",
            torus.vertex_count(),
            torus.triangle_count(),
            torus.vertex_bytes().len(),
            torus.index_bytes().len()
        );
        if let Some(bounds) = assembled.scene.bounds() {
            log::info!("  bounds: {:?} .. {:?}", bounds.min, bounds.max);
        }

        let failures: Vec<AssetEvent> = loader
            .drain_events()
            .into_iter()
            .filter(AssetEvent::is_failure)
            .collect();
        for failure in &failures {
            if let AssetEvent::Failed { path, error } = failure {
                log::warn!("  asset {} failed: {}", path, error);
            }
        }
        let ready = assembled.textures.iter().filter(|slot| slot.is_ready()).count();
        log::info!(
            "  textures: {}/{} loaded",
            ready,
            assembled.textures.len()
        );

        ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
