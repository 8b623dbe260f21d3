use std::process::ExitCode;

fn main() -> ExitCode {
    hotmod::app::startup::startup()
}
