//! `quire-stub-worker`: a launcher that speaks the boundary protocol without
//! a JVM.
//!
//! Usage: `quire-stub-worker <classpath>`. Every class-path entry is read as a
//! symbol manifest. Requests arrive on stdin, one JSON object per line, and
//! each gets exactly one response line on stdout.

use std::ffi::OsString;
use std::io::{self, BufReader};
use std::process;

use quire_worker::protocol::{read_message, write_message, ErrorKind, Request, Response};
use quire_worker::StubCompiler;

fn main() {
    let class_path = std::env::args_os().nth(1).unwrap_or_else(OsString::new);
    let compiler = match StubCompiler::from_class_path(&class_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("quire-stub-worker: {e}");
            process::exit(2);
        }
    };

    let stdin = io::stdin();
    let mut input = BufReader::new(stdin.lock());
    let stdout = io::stdout();
    let mut output = stdout.lock();

    loop {
        let (response, keep_going) = match read_message::<_, Request>(&mut input) {
            Ok(Some(request)) => compiler.handle(request),
            Ok(None) => break,
            Err(e) => (Response::error(ErrorKind::Protocol, e.to_string()), true),
        };
        if let Err(e) = write_message(&mut output, &response) {
            eprintln!("quire-stub-worker: {e}");
            process::exit(1);
        }
        if !keep_going {
            break;
        }
    }
}
