//! Loads image files on a headless device and writes level 0 of each back out.
//!
//! ```text
//! cargo run --example ingest -- albedo.png sky.exr
//! ```

use std::path::PathBuf;

use texforge::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: ingest <image>...");
        return Ok(());
    }

    let gpu = pollster::block_on(HeadlessGpu::new())?;
    let loader = TextureLoader::new(&gpu.device, &gpu.queue, IngestOptions::default());

    for (path, result) in paths.iter().zip(loader.load_batch(&paths, ColorSpace::Srgb)) {
        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                continue;
            }
        };

        println!(
            "{}: {}x{}, {} mip levels, {:?}",
            path.display(),
            loaded.width,
            loaded.height,
            loaded.resource.mip_level_count(),
            loaded.resource.format()
        );
        if let Some(range) = loaded.sample_range {
            println!("  samples in [{}, {}]", range.min, range.max);
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
        let out = PathBuf::from(format!("{stem}_{}", snapshot_filename()));
        loader.write_to_file(&loaded.resource, &out)?;
        println!("  wrote {}", out.display());
    }

    Ok(())
}
