use clap::{arg, command};
use url::Url;
use wikichain_client::client::DEFAULT_API_URL;

pub const DEFAULT_CACHE_DIR: &str = "~/.config/wikichain/";

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn cache_dir_arg() -> clap::Arg {
    arg!(--"cache-dir" <PATH>)
        .required(false)
        .help("Directory holding the link cache database")
        .default_value(DEFAULT_CACHE_DIR)
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("wikichain")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wikichain")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v info, -vv debug)")
                .required(false),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the link cache database on your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location to store the link cache database")
                        .default_value(DEFAULT_CACHE_DIR),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Removes any existing database at the specified location first.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("search")
                .about("Find a chain of links from one article to another")
                .arg(arg!(<FROM>).help("Title of the starting article"))
                .arg(arg!(<TO>).help("Title of the target article"))
                .arg(
                    arg!(-d --"max-depth" <LEVELS>)
                        .required(false)
                        .help("Levels to expand from each end before giving up")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM_FETCHES>)
                        .required(false)
                        .help("Link fetches kept in flight while expanding one level")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(cache_dir_arg())
                .arg(
                    arg!(--"no-cache")
                        .required(false)
                        .help("Fetch every outgoing link list from the API")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"api-url" <URL>)
                        .required(false)
                        .help("MediaWiki API endpoint")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(DEFAULT_API_URL),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("cache")
                .about("Inspect the link cache")
                .subcommand_required(true)
                .subcommand(
                    command!("stats")
                        .about("Show how many articles and links are cached")
                        .arg(cache_dir_arg()),
                ),
        )
}
