//! cmd-deob: de-obfuscate Windows cmd.exe command lines.
//!
//! Takes the command line from the arguments, or one command line per
//! stdin line, and prints the commands it would run after all escapes,
//! string tricks, variable expansion and `cmd` / `CALL` nesting are
//! resolved.

use std::io::BufRead;

use cmd_deob::config::Config;
use cmd_deob::{Interpreter, logging};
use log::LevelFilter;

const USAGE: &str = "\
usage: cmd-deob [OPTIONS] [COMMAND...]

Reads COMMAND from the arguments, or one command per line from stdin.

options:
  --json               print the full interpretation as JSON
  --tokens             print the filtered token stream as JSON
  --dump-config        print the merged configuration and exit
  --delayed-expansion  enable !var! expansion at the top level (cmd /V)
  -v, -vv              more logging on stderr
  -h, --help           show this help";

#[derive(Debug, Default)]
struct Args {
    json: bool,
    tokens: bool,
    dump_config: bool,
    delayed_expansion: bool,
    verbosity: u8,
    command: Vec<String>,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut rest = std::env::args().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--json" => args.json = true,
            "--tokens" => args.tokens = true,
            "--dump-config" => args.dump_config = true,
            "--delayed-expansion" => args.delayed_expansion = true,
            "-v" => args.verbosity += 1,
            "-vv" => args.verbosity += 2,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            "--" => {
                args.command.extend(rest.by_ref());
                break;
            }
            _ => args.command.push(arg),
        }
    }
    args
}

fn level(config: &Config, verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => config.settings.level(),
        1 => LevelFilter::Info.max(config.settings.level()),
        _ => LevelFilter::Trace,
    }
}

fn main() {
    let args = parse_args();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cmd-deob: {e}; using defaults");
            Config::default_config()
        }
    };

    if args.dump_config {
        match toml::to_string_pretty(&config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("cmd-deob: cannot render config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    logging::init(level(&config, args.verbosity), config.settings.log_file.as_deref());

    let mut options = config.to_options();
    if args.delayed_expansion {
        options.delayed_expansion = true;
    }
    let interpreter = match Interpreter::new(options) {
        Ok(interpreter) => interpreter,
        Err(e) => {
            eprintln!("cmd-deob: {e}");
            std::process::exit(2);
        }
    };

    let mut failed = false;
    if args.command.is_empty() {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => failed |= !run(&interpreter, &args, &line),
                Err(e) => {
                    eprintln!("cmd-deob: failed to read stdin: {e}");
                    std::process::exit(1);
                }
            }
        }
    } else {
        failed = !run(&interpreter, &args, &args.command.join(" "));
    }

    if failed {
        std::process::exit(1);
    }
}

/// Handle one command line. Returns false when a branch hit the depth limit.
fn run(interpreter: &Interpreter, args: &Args, input: &str) -> bool {
    if args.tokens {
        let tokens = cmd_deob::tokenize(input, true);
        match serde_json::to_string(&tokens) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("cmd-deob: {e}"),
        }
        return true;
    }

    let result = interpreter.interpret(input);
    logging::log_interpretation(input, &result);

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("cmd-deob: {e}"),
        }
    } else {
        for command in result.commands() {
            println!("{command}");
        }
        for error in &result.errors {
            eprintln!("cmd-deob: {error}");
        }
    }
    result.is_complete()
}
