//! `zippkg package`: split the listed files into zip archives.

use std::path::PathBuf;
use std::time::Instant;

use crate::requests::{load_requests, print_parsed};
use crate::{CliError, GlobalArgs};

pub fn cmd_package(global: &GlobalArgs, pdf_dir: PathBuf, unzip: bool) -> Result<(), CliError> {
    let start = Instant::now();
    let (settings, parsed) = load_requests(global)?;
    print_parsed(global, &parsed);

    let options = settings.package.to_options(&pdf_dir, &global.out, unzip);
    let outputs = zippkg_io::package(&parsed.requests, &options).map_err(|e| {
        let err = CliError::from(e);
        if options.src_dir.is_dir() {
            err
        } else {
            err.with_hint("use --pdf-dir to point at the directory holding the files")
        }
    })?;

    for output in &outputs {
        println!(
            "  {} ({} requests, {} bytes)",
            output.archive.display(),
            output.request_count,
            output.bytes
        );
    }
    println!("Packaged {} requests into {} archive(s)", parsed.requests.len(), outputs.len());
    println!("Duration: {:?}", start.elapsed());
    Ok(())
}
