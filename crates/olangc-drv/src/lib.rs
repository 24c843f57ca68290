//! olangc-drv - Compiler driver.
//!
//! The driver owns everything around the compiler core: command-line
//! parsing, file I/O, pipeline orchestration, diagnostic printing, and
//! the external assembler/linker invocation. Library crates never print
//! or exit; this crate maps their results onto the process boundary:
//!
//! - exit 0: success
//! - exit 1: usage, I/O, syntax, semantic or code generation failure
//! - assembler/linker failures pass the child's status through
//!
//! Compilation writes `<out>.s`, runs `as` on it, then `ld`, and removes
//! both intermediate files unless `--save-temps` is given. With
//! `--sysroot <dir>` the tools are `<dir>/bin/as` and `<dir>/bin/ld`;
//! otherwise they come from `PATH`.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};

use olangc_gen::Arch;
use olangc_lex::{Lexer, TokenKind};
use olangc_par::{pretty, Parser};
use olangc_sem::resolve;
use olangc_util::{render_diagnostic, Handler, SourceFile};

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct Options {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub arch: Arch,
    pub sysroot: Option<PathBuf>,
    pub save_temps: bool,
    pub dump_tokens: bool,
    pub dump_ast: bool,
}

/// The usage text printed on argument errors.
pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [options] file...\n\
         Options:\n\
         \x20 --dump-tokens    Display lexer token stream\n\
         \x20 --dump-ast       Display ast tree to stdout\n\
         \x20 --arch <arch>    Binary arch: default to x86_64 (x86_64 | aarch64)\n\
         \x20 --sysroot <dir>  Dir where the GNU Assembler and GNU Linker are located\n\
         \x20 -o <file>        Compile program into a binary file\n\
         \x20 --save-temps     Keep temp files used to compile program\n"
    )
}

/// Parse the arguments after the program name.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut args = args.into_iter();
    let mut file = None;
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dump-tokens" => options.dump_tokens = true,
            "--dump-ast" => options.dump_ast = true,
            "--save-temps" => options.save_temps = true,
            "-o" => {
                let Some(output) = args.next() else {
                    bail!("missing filename after '-o'");
                };
                options.output = Some(PathBuf::from(output));
            }
            "--arch" => {
                let Some(name) = args.next() else {
                    bail!("missing architecture after '--arch': available options (x86_64 | aarch64)");
                };
                let Some(arch) = Arch::from_name(&name) else {
                    bail!("unknown architecture '{name}': available options (x86_64 | aarch64)");
                };
                options.arch = arch;
            }
            "--sysroot" => {
                let Some(dir) = args.next() else {
                    bail!("missing directory after '--sysroot'");
                };
                options.sysroot = Some(PathBuf::from(dir));
            }
            _ => file = Some(PathBuf::from(arg)),
        }
    }

    let Some(file) = file else {
        bail!("no input file");
    };
    options.file = file;

    if options.output.is_none() && !options.dump_tokens && !options.dump_ast {
        bail!("nothing to do: pass -o, --dump-tokens or --dump-ast");
    }

    Ok(options)
}

/// One compiler invocation.
pub struct Session {
    options: Options,
}

impl Session {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Run the pipeline; the returned value is the process exit code.
    pub fn run(&self) -> Result<i32> {
        let path = &self.options.file;
        let src = fs::read_to_string(path)
            .with_context(|| format!("could not open file {}", path.display()))?;
        let file = SourceFile::new(path.display().to_string(), src);

        if self.options.dump_tokens {
            print!("{}", dump_tokens(&file));
            if !self.options.dump_ast && self.options.output.is_none() {
                return Ok(0);
            }
        }

        let handler = Handler::new();
        let parsed = Parser::parse(&file.src, &handler);
        if handler.has_errors() || parsed.is_err() {
            self.print_diagnostics(&file, &handler);
            return Ok(1);
        }
        let mut unit = parsed.unwrap_or_else(|_| unreachable!("parse error without diagnostic"));

        if self.options.dump_ast {
            print!("{}", pretty::dump(&unit));
        }

        let scopes = resolve(&mut unit, &handler);
        if handler.has_errors() {
            self.print_diagnostics(&file, &handler);
            return Ok(1);
        }

        let Some(output) = &self.options.output else {
            return Ok(0);
        };

        let asm = match olangc_gen::emit(&unit, &scopes, self.options.arch) {
            Ok(asm) => asm,
            Err(error) => {
                eprintln!("{}: error: {error}", file.name);
                return Ok(1);
            }
        };

        let asm_path = PathBuf::from(format!("{}.s", output.display()));
        let obj_path = PathBuf::from(format!("{}.o", output.display()));
        fs::write(&asm_path, asm)
            .with_context(|| format!("could not write {}", asm_path.display()))?;

        let status = Command::new(self.tool("as"))
            .arg(&asm_path)
            .arg("-o")
            .arg(&obj_path)
            .status()
            .with_context(|| format!("could not run {}", self.tool("as").display()))?;
        if !status.success() {
            return Ok(status.code().unwrap_or(1));
        }

        let status = Command::new(self.tool("ld"))
            .arg(&obj_path)
            .arg("-o")
            .arg(output)
            .status()
            .with_context(|| format!("could not run {}", self.tool("ld").display()))?;
        if !status.success() {
            return Ok(status.code().unwrap_or(1));
        }

        if !self.options.save_temps {
            let _ = fs::remove_file(&asm_path);
            let _ = fs::remove_file(&obj_path);
        }

        Ok(0)
    }

    fn tool(&self, name: &str) -> PathBuf {
        match &self.options.sysroot {
            Some(root) => root.join("bin").join(name),
            None => PathBuf::from(name),
        }
    }

    fn print_diagnostics(&self, file: &SourceFile, handler: &Handler) {
        for diagnostic in handler.diagnostics() {
            eprint!("{}", render_diagnostic(file, &diagnostic));
        }
    }
}

/// The `--dump-tokens` listing: one `path:line:col: <kind>` entry per
/// token, EOF included.
pub fn dump_tokens(file: &SourceFile) -> String {
    let mut lexer = Lexer::new(&file.src);
    let mut out = String::new();
    loop {
        let token = lexer.next_token();
        let _ = writeln!(
            out,
            "{}:{}:{}: <{}>",
            file.name, token.span.line, token.span.column, token.kind
        );
        if token.kind == TokenKind::Eof {
            return out;
        }
    }
}
