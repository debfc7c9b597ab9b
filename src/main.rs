use clap::Parser;
use regex_backtrack::{Flags, Regex};

#[derive(Debug, Parser)]
#[command(name = "regex-backtrack")]
#[command(about = "Match a pattern against an input string")]
struct Cli {
    /// Pattern to compile
    pattern: String,

    /// Text to search
    input: String,

    /// Compare characters case-insensitively
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Let `^` and `$` match at line terminators
    #[arg(short = 'm', long)]
    multiline: bool,

    /// Print every match instead of the first
    #[arg(long)]
    all: bool,

    /// Print the parsed pattern tree before matching
    #[arg(long)]
    tree: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut flags = Flags::empty();
    flags.set(Flags::IGNORE_CASE, cli.ignore_case);
    flags.set(Flags::MULTILINE, cli.multiline);

    let re = match Regex::with_flags(&cli.pattern, flags) {
        Ok(re) => re,
        Err(e) => {
            println!("ERROR:{}", e);
            return;
        }
    };

    if cli.tree {
        print!("{}", re.to_tree());
    }

    if cli.all {
        let matches = re.find_all(&cli.input);
        if matches.is_empty() {
            println!("NO_MATCH");
        }
        for m in matches {
            println!("MATCH {}..{}:{}", m.start, m.end, m.text);
        }
        return;
    }

    match re.exec(&cli.input) {
        Some(captures) => {
            println!("MATCH:{}", captures.whole().text);
            // Print capturing groups
            for (i, group) in captures.iter().enumerate().skip(1) {
                match group {
                    Some(group) => println!("GROUP {}:{}", i, group.text),
                    None => println!("GROUP {}:", i),
                }
            }
        }
        None => {
            println!("NO_MATCH");
        }
    }
}
