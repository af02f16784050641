use anyhow::{Context, Result};
use mdq_engine::MarkdownQuery;
use std::{env, fs, process};

enum Output {
    Text,
    Json,
    Count,
    Replace(String),
}

struct Args {
    file: String,
    selector: String,
    output: Output,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <file> <selector> [--json | --count | --replace <text>]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program} notes.md 'h2'");
    eprintln!("  {program} notes.md 'section2(\"API\") paragraph[0]'");
    eprintln!("  {program} notes.md 'table' --json");
    eprintln!("  {program} notes.md 'h2(\"Old\")' --replace '## New'");
    process::exit(2);
}

fn parse_args() -> Args {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "mdq".to_string());

    let Some(file) = args.next() else {
        usage(&program);
    };
    let Some(selector) = args.next() else {
        usage(&program);
    };

    let mut output = Output::Text;
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--json" => output = Output::Json,
            "--count" => output = Output::Count,
            "--replace" => {
                let Some(text) = args.next() else {
                    eprintln!("Error: --replace needs a replacement text argument");
                    usage(&program);
                };
                output = Output::Replace(text);
            }
            other => {
                eprintln!("Error: unrecognized argument '{other}'");
                usage(&program);
            }
        }
    }

    Args {
        file,
        selector,
        output,
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read '{}'", args.file))?;

    let matches = MarkdownQuery::new(&source)
        .query(&args.selector)
        .with_context(|| format!("failed to run selector '{}'", args.selector))?;

    match args.output {
        Output::Text => print!("{}", matches.text()),
        Output::Json => println!("{}", serde_json::to_string_pretty(&matches.to_json())?),
        Output::Count => println!("{}", matches.count()),
        Output::Replace(text) => print!("{}", matches.replace(&text)),
    }

    Ok(())
}
