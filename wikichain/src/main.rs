use std::process::ExitCode;
use wikichain::commands::{DEFAULT_CACHE_DIR, command_argument_builder};
use wikichain::handlers::{
    SearchOptions, handle_cache_stats, handle_init, handle_search, init_logging, render_error,
};
use wikichain_core::report::ReportFormat;
use wikichain_core::print_banner;

#[tokio::main]
async fn main() -> ExitCode {
    let chosen_command = command_argument_builder().get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_logging(chosen_command.get_count("verbose"));

    // JSON output must stay machine readable
    let json_output = matches!(
        chosen_command.subcommand(),
        Some(("search", args)) if args.get_one::<String>("format").is_some_and(|f| f == "json")
    );
    if !quiet && !json_output {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("init", args)) => {
            let path = args
                .get_one::<String>("PATH")
                .map(String::as_str)
                .unwrap_or(DEFAULT_CACHE_DIR);
            handle_init(path, args.get_flag("force")).map(|_| ExitCode::SUCCESS)
        }
        Some(("search", args)) => match SearchOptions::from_matches(args, quiet) {
            Ok(options) => handle_search(options).await.map(|status| status.exit_code()),
            Err(e) => Err(e),
        },
        Some(("cache", args)) => match args.subcommand() {
            Some(("stats", stats_args)) => {
                let dir = stats_args
                    .get_one::<String>("cache-dir")
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_CACHE_DIR);
                handle_cache_stats(dir).map(|_| ExitCode::SUCCESS)
            }
            _ => unreachable!("clap should ensure we don't get here"),
        },
        None => {
            if let Err(e) = command_argument_builder().print_help() {
                eprintln!("{}", e);
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    result.unwrap_or_else(|e| {
        if json_output {
            println!("{}", render_error(ReportFormat::Json, &e));
        } else {
            eprintln!("{}", render_error(ReportFormat::Text, &e));
        }
        ExitCode::FAILURE
    })
}
