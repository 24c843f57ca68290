use std::process::exit;

use olangc_drv::{parse_args, usage, Session};

fn main() {
    let mut args = std::env::args();
    let prog = args.next().unwrap_or_else(|| "olangc".to_owned());

    let options = match parse_args(args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("error: {error}");
            eprint!("{}", usage(&prog));
            exit(1);
        }
    };

    match Session::new(options).run() {
        Ok(code) => exit(code),
        Err(error) => {
            eprintln!("error: {error:#}");
            exit(1);
        }
    }
}
