use std::{env, fs, process};

use color_eyre::eyre::{eyre, Result, WrapErr};
use intcode::{search, Machine, Memory, Word};
use log::LevelFilter;
use simple_logger::SimpleLogger;

const USAGE: &str = "usage: intcode run <program> [input] | intcode search <program> <target>";

fn main() -> Result<()> {
    color_eyre::install()?;
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    let args: Vec<String> = env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["run", path] => run(path, None),
        ["run", path, input] => run(path, Some(parse_word(input)?)),
        ["search", path, target] => find(path, parse_word(target)?),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    }
}

fn load(path: &str) -> Result<Memory> {
    let text = fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path))?;
    Ok(Memory::parse(&text)?)
}

fn parse_word(text: &str) -> Result<Word> {
    text.parse()
        .map_err(|_| eyre!("expected an integer, got {:?}", text))
}

fn run(path: &str, input: Option<Word>) -> Result<()> {
    let mut machine = Machine::new(load(path)?);
    if let Some(input) = input {
        machine.set_input(input);
    }
    machine.run()?;

    if let Some(output) = machine.output() {
        println!("output: {}", output);
    }
    println!("{}", machine.view());
    Ok(())
}

fn find(path: &str, target: Word) -> Result<()> {
    let base = load(path)?;
    let solution = search::find(&base, target, search::DEFAULT_RANGE)?;
    println!(
        "noun {} verb {} (answer {})",
        solution.noun,
        solution.verb,
        solution.answer()
    );
    Ok(())
}
