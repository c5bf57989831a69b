use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};
use itmoscript::interpret;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let source = match args.next() {
        Some(path) => {
            if args.next().is_some() {
                bail!("Only one input file is supported");
            }
            fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Reading stdin")?;
            buffer
        }
    };

    let stdout = io::stdout();
    if !interpret(&source, &mut stdout.lock()) {
        std::process::exit(1);
    }
    Ok(())
}
