pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    SearchOptions, SearchStatus, database_path, handle_cache_stats, handle_init, handle_search,
    init_logging, render_error, validate_titles,
};
