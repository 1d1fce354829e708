use std::path::PathBuf;

use revq_tui::runtime::{run, RuntimeOptions};

const DEFAULT_EXPORT_PATH: &str = "asignaciones.csv";

fn help_text() -> String {
    "\
revq-tui is the interactive session for distributing video reviews.

Usage:
  revq-tui <report.csv> [flags]

Flags:
  -h, --help       help for revq-tui
      --config     Path to a YAML config (default: $REVQ_CONFIG)
      --out        Export path for the assignment CSV (default: asignaciones.csv)

Keys inside the session:
  tab/1/2/3 switch views, up/down select a reviewer, +/- adjust the give
  count, m max, 0 clear, c commit, a add reviewer, d drop an added reviewer,
  o cycle queue order, r reload the report, x export, q quit.\n"
        .to_string()
}

fn parse_args(args: &[String]) -> Result<Option<RuntimeOptions>, String> {
    let mut options = RuntimeOptions {
        export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        ..RuntimeOptions::default()
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--out" => {
                let value = iter.next().ok_or("--out requires a path")?;
                options.export_path = PathBuf::from(value);
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown flag: {flag}"));
            }
            positional => {
                if options.csv_path.is_some() {
                    return Err(format!("unexpected argument: {positional}"));
                }
                options.csv_path = Some(PathBuf::from(positional));
            }
        }
    }
    Ok(Some(options))
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print!("{}", help_text());
            return;
        }
        Err(message) => {
            eprintln!("Error: {message}");
            std::process::exit(1);
        }
    };

    if let Err(message) = run(&options) {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}
