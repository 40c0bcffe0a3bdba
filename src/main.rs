//! Command-line interface for the EVFL compiler

use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "evfl",
    about = "Compile Extended Visual Format Language into constraint records",
    version
)]
struct Cli {
    /// Input file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Emit a JSON array instead of one readable record per line
    #[arg(short, long)]
    json: bool,

    /// Priority assigned to records without an explicit `@priority`
    #[arg(short, long, value_name = "N")]
    priority: Option<u32>,

    /// Print a short syntax reference and exit
    #[arg(long)]
    grammar: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.grammar {
        print_grammar();
        return;
    }

    let (source, filename) = match read_input(&cli) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("error: {err}");
            exit(1);
        }
    };

    let defs = match evfl::compile(&source, cli.priority) {
        Ok(defs) => defs,
        Err(err) => {
            eprintln!("{}", err.format(&source, &filename));
            exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&defs) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: {err}");
                exit(1);
            }
        }
    } else {
        for def in &defs {
            println!("{def}");
        }
    }
}

fn read_input(cli: &Cli) -> Result<(String, String), std::io::Error> {
    match &cli.input {
        Some(path) => Ok((std::fs::read_to_string(path)?, path.display().to_string())),
        None => {
            if std::io::stdin().is_terminal() {
                eprintln!("reading from stdin; pipe a format string or pass a file (see --grammar)");
            }
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok((source, "<stdin>".to_string()))
        }
    }
}

fn print_grammar() {
    println!(
        r#"EVFL syntax reference

Rows (separated by newlines, ';', tabs or nothing at all):
  H:…  V:…  HV:…      visual row on the given axis/axes
  C:…                  constraint row

Visual row, e.g.  H:|-[a(>=100)]-10-[b,c]~[d]~|
  |                    attach the chain to the superview edge
  [a,b]                view group; members share every connection
  [a(…)]               inline predicates constrain width/height
  [g:-[x][y]-]         cascade: a sub-layout anchored inside g
  -                    default spacing        -10-   fixed gap
  ~                    flexible spacer        ->     disconnect
  -50%+5-  -@750-  -(…,…)-   percentage / priority / predicate list

Predicates, e.g.  >=asdf.left*10+3@999
  ==  >=  <=           relation (defaults to ==)
  100   50%+5          constant / percentage of the superview
  v.attr*2+1           other view; `^` superview, `-` the spacer
  @999                 priority

Constraint row, e.g.  C:[a,b].centerX(50%) a.width(100).height(100)
  attributes: .left/.l .right/.r .top/.t .bottom/.b
              .width/.w .height/.h .centerX/.cx .centerY/.cy"#
    );
}
