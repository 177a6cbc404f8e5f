//! Tool name normalization.

/// Name used when an event carries no usable tool name.
pub const UNKNOWN_TOOL: &str = "unknown";

/// Strip an `mcp__<namespace>__` prefix and trim.
///
/// `mcp__app__exec` becomes `exec`; names without the prefix pass through.
pub fn normalize_tool_name(raw: Option<&str>) -> String {
    let name = raw.map(str::trim).unwrap_or_default();
    let stripped = name
        .strip_prefix("mcp__")
        .and_then(|rest| rest.split_once("__"))
        .map(|(_, tool)| tool)
        .filter(|tool| !tool.is_empty())
        .unwrap_or(name);
    if stripped.is_empty() {
        UNKNOWN_TOOL.to_string()
    } else {
        stripped.to_string()
    }
}
