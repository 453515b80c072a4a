mod session;

use session::Session;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    println!("program begin");
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut session = match Session::new(args) {
        Ok(session) => session,
        Err(problem) => {
            log::error!("could not start session: {problem}");
            println!("problem starting session: {problem}");
            return ExitCode::FAILURE;
        }
    };
    session.start();
    println!("program end");
    ExitCode::SUCCESS
}
