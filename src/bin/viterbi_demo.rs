//! Decode the two-state toy model and print the path and the trellis.
//!
//! Run with:
//! `cargo run --bin viterbi_demo -- --format table`

use std::env;

use hmm_viterbi::{Decoding, DecoderBuilder, HmmModel, Trellis};

type ToyModel = HmmModel<u8, u8>;

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("viterbi_demo: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // States: 0 -> 'A', 1 -> 'B'. Observations are binary symbols.
    let model = HmmModel::builder([0u8, 1])
        .with_initial([(0, 0.6), (1, 0.4)])
        .with_transition([(0, [(0, 0.7), (1, 0.3)]), (1, [(0, 0.4), (1, 0.6)])])
        .with_emission([(0, [(0u8, 0.5), (1, 0.5)]), (1, [(0u8, 0.1), (1, 0.9)])])
        .build();
    let model = match model {
        Ok(m) => m,
        Err(err) => {
            eprintln!("viterbi_demo: {err}");
            std::process::exit(1);
        }
    };
    let observations = [0u8, 1, 1, 0];

    let decoder = DecoderBuilder::new().build();
    let decoding = match decoder.decode(&model, &observations) {
        Ok(d) => d,
        Err(err) => {
            eprintln!("viterbi_demo: {err}");
            std::process::exit(1);
        }
    };

    let trellis = if options.linear {
        decoding.trellis().to_linear()
    } else {
        decoding.trellis().clone()
    };
    options.format.write(&model, &decoding, &trellis);
}

struct Options {
    format: OutputFormat,
    linear: bool,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Table;
        let mut linear = false;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if arg == "--linear" {
                linear = true;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        Ok(Self { format, linear })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin viterbi_demo [-- <options>]

Options:
  --format <table|csv|json>     Output format (default: table)
  --linear                      Print trellis values as probabilities instead of logs
  -h, --help                    Print this help message
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, model: &ToyModel, decoding: &Decoding<u8, u8>, trellis: &Trellis<u8, u8>) {
        match self {
            OutputFormat::Table => write_table(decoding, trellis),
            OutputFormat::Csv => write_csv(model, decoding, trellis),
            OutputFormat::Json => write_json(decoding, trellis),
        }
    }
}

fn state_name(s: u8) -> char {
    (b'A' + s) as char
}

fn write_table(decoding: &Decoding<u8, u8>, trellis: &Trellis<u8, u8>) {
    let names: String = decoding.path().iter().map(|&s| state_name(s)).collect();
    println!("most likely states: {:?} ({names})", decoding.path());
    println!("log-probability:    {:.6}", decoding.log_probability());
    println!();
    println!("trellis ({:?} domain):", trellis.domain());
    print!("{trellis}");
}

fn write_csv(model: &ToyModel, decoding: &Decoding<u8, u8>, trellis: &Trellis<u8, u8>) {
    println!("t,observation,state,value,on_path");
    for (t, row) in trellis.rows().enumerate() {
        let on_path = model.state_index(&decoding.path()[t]);
        for (s, value) in row.iter().enumerate() {
            println!(
                "{t},{},{},{value:.6},{}",
                trellis.observations()[t],
                trellis.states()[s],
                on_path == Some(s)
            );
        }
    }
}

fn write_json(decoding: &Decoding<u8, u8>, trellis: &Trellis<u8, u8>) {
    let fmt_num = |v: f64| {
        if v.is_finite() {
            format!("{v:.6}")
        } else {
            "null".to_string()
        }
    };
    let rows: Vec<String> = trellis
        .rows()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(|&v| fmt_num(v)).collect();
            format!("[{}]", cells.join(","))
        })
        .collect();
    println!(
        "{{\"path\":{:?},\"log_probability\":{},\"domain\":\"{:?}\",\"states\":{:?},\"observations\":{:?},\"trellis\":[{}]}}",
        decoding.path(),
        fmt_num(decoding.log_probability()),
        trellis.domain(),
        trellis.states(),
        trellis.observations(),
        rows.join(",")
    );
}
