//! Binary entrypoint for `extract`.

use std::process::ExitCode;

fn main() -> ExitCode {
    apisurface::logging::init_tracing();
    apisurface::finish("extract", apisurface::run_extract(std::env::args_os()))
}
