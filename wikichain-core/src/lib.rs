pub mod cache;
pub mod path;
pub mod report;
pub mod search;
pub mod stats;

use colored::Colorize;

pub use cache::{CacheStats, LinkCache};
pub use search::{SearchConfig, SearchEngine, SearchOutcome};
pub use stats::SearchStats;

pub fn print_banner() {
    let banner = r#"
         _ _   _       _         _
 __ __ _(_) |_(_)  ___| |_  __ _(_)_ _
 \ V  V / | / / | / _| ' \/ _` | | ' \
  \_/\_/|_|_\_\_| \__|_||_\__,_|_|_||_|
"#;
    println!("{}", banner.bright_cyan());
    println!(
        "  {} {}\n",
        "v".dimmed(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
}
