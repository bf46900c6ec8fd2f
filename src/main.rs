//! xray-inspect - Tool for inspecting X-Ray `.object` files.

use std::env;
use std::path::Path;
use std::process::ExitCode;

use xray_formats::object::{read_object, Object};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_help();
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "info" | "i" if args.len() >= 3 => {
            for path in &args[2..] {
                if let Err(e) = info(Path::new(path)) {
                    eprintln!("error: {}: {}", path, e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        "help" | "-h" | "--help" => {
            print_help();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("error: unknown command '{}'", other);
            print_help();
            ExitCode::FAILURE
        }
    }
}

fn info(path: &Path) -> xray_formats::Result<()> {
    let data = std::fs::read(path)?;
    let object = read_object(&data)?;
    print_object(path, &object);
    Ok(())
}

fn print_object(path: &Path, object: &Object) {
    println!("{}", path.display());
    println!("  flags: {:#x}", object.flags);
    if let Some(rev) = &object.revision {
        println!("  revision: {} ({}) / {} ({})", rev.owner, rev.created, rev.modifier, rev.modified);
    }

    println!("  meshes: {}", object.meshes.len());
    for mesh in &object.meshes {
        println!(
            "    {}: {} vertices, {} faces ({} live), {} uv maps, {} weight maps, {} seams",
            mesh.name,
            mesh.vertices.len(),
            mesh.faces.len(),
            mesh.live_face_count(),
            mesh.uv_maps.len(),
            mesh.weight_maps.len(),
            mesh.seams.len(),
        );
    }

    println!("  surfaces: {}", object.surfaces.len());
    for surface in &object.surfaces {
        println!("    {}: texture '{}', shader '{}'", surface.name, surface.texture, surface.eshader);
    }

    println!("  bones: {}", object.bones.len());
    for bone in &object.bones {
        let parent = if bone.parent.is_empty() { "<root>" } else { &bone.parent };
        println!("    {} (parent: {}, length {:.3})", bone.name, parent, bone.length);
    }

    if !object.partitions.is_empty() {
        println!("  partitions: {}", object.partitions.len());
        for partition in &object.partitions {
            println!("    {}: {} bones", partition.name, partition.bones.len());
        }
    }
    if !object.motion_refs.is_empty() {
        println!("  motion refs: {}", object.motion_refs);
    }
}

fn print_help() {
    println!("xray-inspect - X-Ray asset format inspector");
    println!();
    println!("USAGE:");
    println!("  xray-inspect info <file.object>...   Print a decode summary");
    println!("  xray-inspect help                    Show this help");
    println!();
    println!("Set RUST_LOG=debug to see skipped chunks and rejected faces.");
}
