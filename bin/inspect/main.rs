//! Prints what a stored segment contains.
//!
//! ```text
//! inspect <config.ron> <segment file>
//! ```
//!
//! The segment file may be raw or LZ4-framed.

use strata::{Config, SegmentSummary};
use strata_segment::Segment;

use std::error::Error;
use std::process::exit;

const LZ4_FRAME_MAGIC: [u8; 4] = [0x04, 0x22, 0x4D, 0x18];

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 2 {
        eprintln!("usage: inspect <config.ron> <segment file>");
        exit(2);
    }

    if let Err(e) = run(&args[0], &args[1]) {
        log::error!("{}", e);
        exit(1);
    }
}

fn run(config_path: &str, segment_path: &str) -> Result<(), Box<dyn Error>> {
    let config = Config::read_file(config_path)?;
    log::debug!("{} object types", config.object_types.len());

    let bytes = std::fs::read(segment_path)?;
    let mut segment = Segment::from_config(&config.segment);
    if bytes.starts_with(&LZ4_FRAME_MAGIC) {
        segment.import_compressed(&bytes)?;
    } else {
        let consumed = segment.import(&bytes, 0)?;
        if consumed < bytes.len() {
            log::warn!("{} trailing bytes after segment", bytes.len() - consumed);
        }
    }
    segment.recount(&config.object_types);

    print!("{}", SegmentSummary::of(&segment, &config.object_types));

    Ok(())
}
