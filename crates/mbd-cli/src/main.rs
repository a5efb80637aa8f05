//! Multi-body dynamics preprocessor CLI
//!
//! Reads a scene description, normalizes it to SI world-frame data, and
//! writes the simulator-ready assembly JSON plus OBJ meshes.

mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use mbd_core::export::{ExportOptions, export_assembly};
use mbd_core::mesh::MeshCoordinates;
use mbd_core::units::unit_name_for;

#[derive(Parser, Debug)]
#[clap(author, version, about = "CAD-to-simulation assembly preprocessor", long_about = None)]
struct Args {
    /// Scene description JSON
    input: PathBuf,

    /// Output assembly path; meshes land in a sibling meshes/ directory
    #[clap(long, default_value = "output/assembly.json")]
    out: PathBuf,

    /// Skip OBJ mesh export
    #[clap(long)]
    no_meshes: bool,

    /// Write mesh vertices in body-local (COM-centered) coordinates
    /// instead of the global world frame
    #[clap(long)]
    local_frames: bool,
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mbd=info,mbd_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let description: scene::SceneDescription =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", args.input.display()))?;

    tracing::info!(
        "scene '{}': {} bodies, units {} ({})",
        description.name,
        description.bodies.len(),
        description.units,
        unit_name_for(mbd_core::units::unit_scale_for(&description.units))
    );

    let built = scene::build_scene(&description)?;
    for failure in &built.failures {
        tracing::warn!("body {}: {}", failure.body_id, failure.error);
    }

    let options = ExportOptions {
        export_meshes: !args.no_meshes,
        mesh_coordinates: if args.local_frames {
            MeshCoordinates::ComLocal
        } else {
            MeshCoordinates::World
        },
    };
    export_assembly(&built.assembly, built.unit_scale, &args.out, &built.meshes, &options)
        .with_context(|| format!("exporting to {}", args.out.display()))?;

    println!(
        "Exported '{}': {} bodies, {} joints, {} frames -> {}",
        built.assembly.name,
        built.assembly.body_count(),
        built.assembly.joints().count(),
        built.assembly.user_frames().count(),
        args.out.display()
    );
    if !built.failures.is_empty() {
        println!("{} body(ies) left uncalculated, see log", built.failures.len());
    }

    Ok(())
}
