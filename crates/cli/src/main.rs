use std::process::ExitCode;

fn main() -> ExitCode {
    blossom_cli::run()
}
