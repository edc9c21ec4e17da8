use std::process::ExitCode;

fn main() -> ExitCode {
    vocadeck_lib::run()
}
