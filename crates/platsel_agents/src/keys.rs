//! Well-known session state keys.

/// Epic currently being evaluated.
pub const CURRENT_EPIC: &str = "current_epic";
/// Markdown of the ticket's design document, or a metadata summary.
pub const TICKET_CONTENT: &str = "ticket_content";
/// Plain-text flow hints taken from the issue metadata.
pub const FLOW_INFO: &str = "flow_info";
/// Bullet list of affected flows.
pub const PLATFORM_FLOWS: &str = "platform_flows";
/// Markdown of the newest SDD.
pub const SDD_CONTENT: &str = "sdd_content";
pub const META_EVAL_PLATFORMS: &str = "meta_eval_platforms";
pub const SDD_EVAL_PLATFORMS: &str = "sdd_eval_platforms";
/// Aggregated result for the current epic.
pub const PLATFORM_INFO: &str = "platform_info";
/// Aggregated platforms per evaluated epic.
pub const PLATFORM_RESULTS: &str = "platform_results";
/// Pending epics for the outer loop.
pub const LOOP_ITEMS: &str = "loop_items";

/// Epic id used when `current_epic` is unset.
pub const UNKNOWN_EPIC: &str = "EPIC-UNKNOWN";
