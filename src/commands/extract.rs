//! `extract` command.

use tracing::debug;

use crate::cli::ExtractCli;
use crate::config::ToolConfig;
use crate::context::ServiceContext;
use crate::error::ToolError;
use crate::extract::extract;
use crate::render::render;

/// Execute `extract` against the live filesystem.
///
/// # Errors
///
/// Returns any [`ToolError`] raised while loading, walking, or rendering.
pub fn run(args: &ExtractCli) -> Result<String, ToolError> {
    let config = ToolConfig::load(args.platform_root.clone());
    run_with_context(&ServiceContext::live(), &config, args)
}

/// Execute `extract` with an explicit context and configuration.
///
/// # Errors
///
/// Returns any [`ToolError`] raised while loading, walking, or rendering.
pub fn run_with_context(
    ctx: &ServiceContext,
    config: &ToolConfig,
    args: &ExtractCli,
) -> Result<String, ToolError> {
    let loader = ctx.open_loader(&args.root, config)?;
    debug!(
        root = %loader.artifacts().root().display(),
        indexed = loader.artifacts().len(),
        requested = args.names.len(),
        "extracting"
    );
    let snapshot = extract(&loader, &args.names)?;
    render(&snapshot, args.format)
}
