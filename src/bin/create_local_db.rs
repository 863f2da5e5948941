use std::path::Path;

use parkings_mel::adapters::sqlite_sink::{SqliteWarehouse, provision};
use parkings_mel::adapters::warehouse::{TableRef, Warehouse};
use rusqlite::Connection;

fn main() {
    if let Err(error) = run() {
        eprintln!("failed to create local db: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut path = if cfg!(windows) {
        ".\\data\\parkings_mel.db".to_string()
    } else {
        "./data/parkings_mel.db".to_string()
    };
    let mut force = false;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--path" => {
                let Some(value) = args.get(index + 1) else {
                    return Err("--path requires a value".to_string());
                };
                path = value.clone();
                index += 2;
            }
            "--force" => {
                force = true;
                index += 1;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                return Err(format!("unknown argument: {other}"));
            }
        }
    }

    let path_ref = Path::new(&path);
    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|error| format!("failed to create parent directory: {error}"))?;
    }

    if force && path_ref.exists() {
        std::fs::remove_file(path_ref)
            .map_err(|error| format!("failed to remove existing db file: {error}"))?;
    }

    let connection = Connection::open(&path).map_err(|error| error.to_string())?;
    provision(&connection).map_err(|error| error.to_string())?;

    let warehouse = SqliteWarehouse::from_connection(connection);
    let table = warehouse
        .get_table(&TableRef::records("local", "local"))
        .map_err(|error| error.to_string())?;
    let rows = warehouse
        .count_rows(&table.reference.table)
        .map_err(|error| error.to_string())?;

    println!("created/updated local db at: {path}");
    println!("table {} has columns: {}", table.reference.table, table.columns.join(", "));
    println!("existing rows: {rows}");
    Ok(())
}

fn print_help() {
    println!("create_local_db");
    println!();
    println!("Usage:");
    println!("  cargo run --bin create_local_db -- [--path <file>] [--force]");
    println!();
    println!("Options:");
    println!("  --path <file>   target sqlite file (default: ./data/parkings_mel.db)");
    println!("  --force         delete existing file before creating");
}
