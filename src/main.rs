mod debug_report;

use graphmaster::{Bot, Settings, User};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

const DEFAULT_USER: &str = "cli";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let level = if config.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

struct CliConfig {
    aiml: Vec<PathBuf>,
    config: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    save_snapshot: Option<PathBuf>,
    user: String,
    input: Option<String>,
    verbose: bool,
    color: bool,
}

fn run(config: &CliConfig) -> graphmaster::Result<()> {
    let settings = match &config.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let mut bot = Bot::new(settings);

    if let Some(path) = &config.snapshot {
        bot.load_snapshot(path)?;
    }
    for path in &config.aiml {
        if path.is_dir() {
            bot.load_dir(path)?;
        } else {
            bot.load_file(path)?;
        }
    }
    if let Some(path) = &config.save_snapshot {
        bot.save_snapshot(path)?;
    }
    if bot.size() == 0 {
        log::warn!("no categories loaded; every answer will be empty");
    }

    let mut user = bot.new_user(config.user.as_str());
    if let Some(input) = &config.input {
        answer(&bot, &mut user, input, config);
        return Ok(());
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    loop {
        if interactive {
            print!("> ");
            io::stdout().flush()?;
        }
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if interactive && matches!(line, "quit" | "exit") {
            break;
        }
        answer(&bot, &mut user, line, config);
    }
    Ok(())
}

fn answer(bot: &Bot, user: &mut User, input: &str, config: &CliConfig) {
    if config.verbose {
        let verbose = bot.chat_verbose(input, user);
        debug_report::print_turn(input, &verbose, config.color);
        return;
    }
    let output = bot.chat(input, user).output();
    if output.is_empty() {
        println!("...");
    } else {
        println!("{output}");
    }
}

fn parse_args() -> Result<CliConfig, String> {
    let mut config = CliConfig {
        aiml: Vec::new(),
        config: None,
        snapshot: None,
        save_snapshot: None,
        user: DEFAULT_USER.to_string(),
        input: None,
        verbose: false,
        color: io::stdout().is_terminal(),
    };
    let mut args = std::env::args().skip(1);

    fn value(flag: &str, next: Option<String>) -> Result<String, String> {
        next.ok_or_else(|| format!("error: {flag} expects a value"))
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("graphmaster {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => config.color = true,
            "--no-color" => config.color = false,
            "-v" | "--verbose" => config.verbose = true,
            "--aiml" => config.aiml.push(value(&arg, args.next())?.into()),
            "--config" => config.config = Some(value(&arg, args.next())?.into()),
            "--snapshot" => config.snapshot = Some(value(&arg, args.next())?.into()),
            "--save-snapshot" => config.save_snapshot = Some(value(&arg, args.next())?.into()),
            "--user" => config.user = value(&arg, args.next())?,
            "--input" | "-i" => {
                let text = value(&arg, args.next())?;
                if config.input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                config.input = Some(text);
            }
            "--" => {
                let rest = args.by_ref().collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if config.input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    config.input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--aiml=") => config.aiml.push(arg.trim_start_matches("--aiml=").into()),
            _ if arg.starts_with("--user=") => config.user = arg.trim_start_matches("--user=").to_string(),
            _ if arg.starts_with("--input=") => {
                if config.input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                config.input = Some(arg.trim_start_matches("--input=").to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args.by_ref()).collect::<Vec<_>>().join(" ");
                if config.input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                config.input = Some(rest);
                break;
            }
        }
    }

    if config.aiml.is_empty() && config.snapshot.is_none() {
        return Err(format!("error: no categories given (use --aiml or --snapshot)\n\n{}", help_text()));
    }
    if config.user.trim().is_empty() {
        return Err("error: --user must not be empty".to_string());
    }

    Ok(config)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "graphmaster {version}

AIML interpreter CLI.

Usage:
  graphmaster [OPTIONS] --aiml <path> [--] [input...]
  graphmaster [OPTIONS] --snapshot <file> --input <text>

Without input, lines are read from stdin and answered one by one
(an interactive prompt when stdin is a terminal; `quit` leaves it).

Options:
  --aiml <path>              AIML file or directory of *.aiml files. Repeatable.
  --config <file>            TOML settings file.
  --snapshot <file>          Load categories from a snapshot before any --aiml.
  --save-snapshot <file>     Write the loaded categories to a snapshot.
  --user <id>                Conversation user id. Default: {default_user}
  -i, --input <text>         Answer a single input and exit.
  -v, --verbose              Print a per-sentence match report; log at info.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Logging honours RUST_LOG (default: warn).

Exit codes:
  0  Success.
  1  Loading or I/O error.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        default_user = DEFAULT_USER
    )
}
