//! Load a tracker configuration and write calinfo/<CODENAME>_points.csv and
//! calinfo/<CODENAME>_normals.csv for plotting.
//!
//! Usage: cargo run --example dump_calinfo -- <config.json> <CODENAME> [OUT_DIR]

use lighthouse_config::{dump, load_htc_config, CalibrationRecord};
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("Usage: dump_calinfo <config.json> <CODENAME> [OUT_DIR]");
        std::process::exit(2);
    }
    let out_dir = PathBuf::from(args.get(2).map(String::as_str).unwrap_or("calinfo"));

    let result = std::fs::read(&args[0])
        .map_err(|e| e.to_string())
        .and_then(|blob| {
            let mut record = CalibrationRecord::new("file", &args[1]);
            load_htc_config(&mut record, &blob).map_err(|e| e.to_string())?;
            std::fs::create_dir_all(&out_dir).map_err(|e| e.to_string())?;
            dump::write_calinfo(&out_dir, &record).map_err(|e| e.to_string())
        });

    match result {
        Ok((points, normals)) => {
            println!("Wrote {}", points.display());
            println!("Wrote {}", normals.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
