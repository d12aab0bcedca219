use clap::Parser;
use std::path::PathBuf;

// Build version with embedded style spec info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Style spec: v8 (embedded)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Style property code generator
///
/// Environment: STYLEGEN_OUTPUT_ROOT, STYLEGEN_STYLE_SPEC, STYLEGEN_SHADER_DIR, DRY_RUN.
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Directory the generated tree is written under (default: current directory)
    #[arg(value_name = "OUTPUT_ROOT")]
    pub output_root: Option<PathBuf>,
}
