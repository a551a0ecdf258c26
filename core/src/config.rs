//! Repository configuration.
//!
//! The original deployment hid these behind global constants; here they are
//! an explicit struct handed to each repository constructor.

#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Window applied by list/statistics queries when no `since_days` filter
    /// is given (the weekly-summary view).
    pub default_window_days: i64,
    /// Rows returned by a list query when the caller gives no limit.
    pub default_list_limit: u32,
    /// Hard cap on list query limits.
    pub max_list_limit: u32,
    /// Comments per page when the caller gives no page size.
    pub default_page_size: u32,
    /// Hard cap on comment page size.
    pub max_page_size: u32,
    /// Actor recorded on a status change when none is supplied.
    pub default_actor: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            default_window_days: 7,
            default_list_limit: 10,
            max_list_limit: 50,
            default_page_size: 20,
            max_page_size: 50,
            default_actor: "Sistema".to_string(),
        }
    }
}
