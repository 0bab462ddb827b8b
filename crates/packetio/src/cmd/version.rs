use packetio_frame::{HEADER_SIZE, MAX_PAYLOAD_LEN, MIN_SCRATCH_CAPACITY};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("packetio {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: packetio");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("PACKETIO_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("PACKETIO_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("header_size: {HEADER_SIZE}");
    println!("max_payload: {MAX_PAYLOAD_LEN}");
    println!("scratch_floor: {MIN_SCRATCH_CAPACITY}");
    println!("features: async={}, cli=true", cfg!(feature = "async"));

    Ok(SUCCESS)
}
