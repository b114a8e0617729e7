// src/main.rs

use fileid::{FileId, FileIdConfig, FileIdManager};
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: fileid [--config FILE] [--db PATH] [-r] <command> [args]

Commands:
  index <path>            print the identifier of <path>, indexing it if needed
  insert <path> [id]      record <path> under [id] or a fresh identifier
  id <path>               print the identifier of <path>
  path <id>               print the path currently holding <id>
  move <from> <to>        record a rename (-r: with everything under <from>)
  copy <from> <to>        record a copy (-r: with everything under <from>)
  delete <path>           forget <path> (-r: with everything under it)
  list                    print every record as one JSON object per line";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut config = match take_option(&mut args, "--config")? {
        Some(file) => FileIdConfig::from_file(&file)
            .with_context(|| format!("loading config {}", file))?,
        None => FileIdConfig::default(),
    };
    if let Some(db) = take_option(&mut args, "--db")? {
        config.db_path = db.into();
    }
    let recursive = take_flag(&mut args, "-r") | take_flag(&mut args, "--recursive");

    let (command, rest) = args.split_first().ok_or_else(|| anyhow!(USAGE))?;

    tracing::debug!("Store: {}", config.db_path.display());
    let mut fim = FileIdManager::open(&config)
        .with_context(|| format!("opening {}", config.db_path.display()))?;

    match (command.as_str(), rest) {
        ("index", [path]) => println!("{}", fim.index(path)?),
        ("insert", [path]) => println!("{}", fim.insert(path, None)?),
        ("insert", [path, id]) => {
            let id: FileId = id.parse()?;
            println!("{}", fim.insert(path, Some(id))?);
        }
        ("id", [path]) => match fim.get_id(path)? {
            Some(id) => println!("{}", id),
            None => bail!("{} is not indexed", path),
        },
        ("path", [id]) => {
            let id: FileId = id.parse()?;
            match fim.get_path(id)? {
                Some(path) => println!("{}", path),
                None => bail!("no record for {}", id),
            }
        }
        ("move", [from, to]) => println!("{}", fim.move_path(from, to, recursive)?),
        ("copy", [from, to]) => println!("{}", fim.copy(from, to, recursive)?),
        ("delete", [path]) => fim.delete(path, recursive)?,
        ("list", []) => {
            for record in fim.records()? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        _ => bail!(USAGE),
    }

    fim.close()?;
    Ok(())
}

/// Remove `--name VALUE` from `args`, returning VALUE.
fn take_option(args: &mut Vec<String>, name: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("{} needs a value", name);
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}
