//! # VOX Inspector
//!
//! Command-line tool to inspect a `.vox` file and the mesh built from it.

use std::process;

use voxkit_import::{import_from_memory, ImportConfig, VoxError, VoxLoader};

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         VOXKIT VOX INSPECTOR                                     ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        println!("Usage: vox_inspect <model.vox>");
        println!();
        println!("Options:");
        println!("  --chunks           List every chunk record");
        println!("  --config <file>    Load ImportConfig from a TOML file");
        return;
    }

    let path = &args[1];
    let list_chunks = args.contains(&"--chunks".to_string());
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1));

    let config = match config_path {
        Some(config_path) => match std::fs::read_to_string(config_path)
            .map_err(VoxError::from)
            .and_then(|source| ImportConfig::from_toml_str(&source))
        {
            Ok(config) => config,
            Err(e) => fail(&format!("Could not load config {config_path}: {e}")),
        },
        None => ImportConfig::default(),
    };

    println!("Loading model: {path}");
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => fail(&format!("Could not open file: {e}")),
    };

    if list_chunks {
        match VoxLoader::scan_chunks(&data, &config) {
            Ok((version, headers)) => {
                println!();
                println!("┌─ CHUNKS (version {version}) ─────────────────────────────────────┐");
                for header in &headers {
                    println!(
                        "│ {:>8}  {}  content {:>8}  children {:>8}",
                        header.offset,
                        header.tag_name(),
                        header.content_size,
                        header.children_size
                    );
                }
                println!("└──────────────────────────────────────────────────────────────────┘");
            }
            Err(e) => fail(&format!("Could not scan chunks: {e}")),
        }
    }

    let import = match import_from_memory(&data, &config) {
        Ok(import) => import,
        Err(e) => fail(&format!("Could not import model ({:?}): {e}", e.kind())),
    };

    let mesh = &import.mesh;
    println!();
    println!("┌─ MODEL ──────────────────────────────────────────────────────────┐");
    println!("│ Version:            {}", import.version);
    println!(
        "│ Size (x, y, z):     {} x {} x {}",
        import.size[0], import.size[1], import.size[2]
    );
    println!("│ Voxel scale:        {}", config.voxel_scale);
    println!("├─ MESH ───────────────────────────────────────────────────────────┤");
    println!("│ Faces:              {}", mesh.face_count());
    println!("│ Vertices:           {}", mesh.vertex_count());
    println!("│ Indices:            {}", mesh.index_count());
    println!("│ Triangles:          {}", mesh.triangle_count());
    println!("│ Batches:            {}", mesh.batches().len());
    println!("└──────────────────────────────────────────────────────────────────┘");
}

fn fail(message: &str) -> ! {
    println!("Error: {message}");
    process::exit(1);
}
