#![forbid(unsafe_code)]

fn main() {
    std::process::exit(helpdesk_search_cli::run());
}
