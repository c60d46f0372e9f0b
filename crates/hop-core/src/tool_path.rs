use std::path::Path;

/// Standard install locations of the 1Password CLI, probed in order.
pub const OP_CANDIDATES: &[&str] = &["/opt/homebrew/bin/op", "/usr/local/bin/op", "/usr/bin/op"];
/// Bare command name, left to `PATH` lookup when nothing else exists.
pub const OP_COMMAND: &str = "op";

/// Picks the executable to run: an explicitly configured path that exists,
/// else the first existing candidate, else `fallback`.
pub fn resolve_tool_path(configured: Option<&str>, candidates: &[&str], fallback: &str) -> String {
    if let Some(path) = configured.map(str::trim).filter(|p| !p.is_empty()) {
        if Path::new(path).exists() {
            return path.to_string();
        }
        tracing::debug!(path, "configured tool path does not exist; probing defaults");
    }
    candidates
        .iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(|candidate| candidate.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

pub fn resolve_op_path(configured: Option<&str>) -> String {
    resolve_tool_path(configured, OP_CANDIDATES, OP_COMMAND)
}
