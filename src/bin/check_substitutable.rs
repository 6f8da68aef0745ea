//! Binary entrypoint for `check-substitutable`.

use std::process::ExitCode;

fn main() -> ExitCode {
    apisurface::logging::init_tracing();
    apisurface::finish("check-substitutable", apisurface::run_check(std::env::args_os()))
}
