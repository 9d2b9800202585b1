// Grade Registry - interactive shell
//
// Reads commands from stdin, one per line, and prints results to stdout.
// With --data (or REGISTRY_DATA_DIR) the folder is loaded before the first
// prompt, exactly as if `load <folder>` had been typed.

use anyhow::Result;
use grade_registry::{logging, shell, Config, Shell};
use std::io;

fn main() -> Result<()> {
    let config = Config::load();
    logging::init(config.log_format);

    let mut shell = Shell::new(config.report_limit);

    if let Some(folder) = &config.data_dir {
        let command = format!("load {}", folder.display());
        print!("{}", shell.execute(&command));
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell::run(&mut shell, stdin.lock(), &mut stdout)?;

    Ok(())
}
