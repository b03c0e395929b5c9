//! `tinysql`: loads a JSON file as a table and runs one SQL query against
//! it. All logic lives in `tinysql_cli` (the lib half of this crate); this
//! binary just forwards `env::args_os` the way the teacher's
//! `crates/cli/src/main.rs` forwards into `sqruff_cli_lib::run_with_args`.

pub fn main() {
    std::process::exit(tinysql_cli::run_with_args(std::env::args_os()));
}
