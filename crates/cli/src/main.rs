use std::process::ExitCode;

fn main() -> ExitCode {
    ariva_cli::run()
}
