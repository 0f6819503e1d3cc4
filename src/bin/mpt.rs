//! Command-line front end for the trie: `put`/`get`/`delete`/`root` against
//! a sled-backed store, printing the resulting root hash or value as hex.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use merkle_patricia_trie::{RootHash, SledNodeStore, Trie, TrieError};

#[derive(Parser)]
#[command(name = "mpt", about = "Merkle Patricia Trie command-line demo")]
struct Cli {
    /// Path to the sled database backing the node store.
    #[arg(long, default_value = "./mpt-db")]
    db_path: String,

    /// Root hash to open the trie at, as hex. Omit for a blank trie.
    #[arg(long)]
    root: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Insert or overwrite a key.
    Put { key: String, value: String },
    /// Look up a key; prints nothing on a miss.
    Get { key: String },
    /// Remove a key; a no-op if it isn't present.
    Delete { key: String },
    /// Print the current root hash.
    Root,
}

fn run() -> Result<(), TrieError> {
    let cli = Cli::parse();

    let root = match &cli.root {
        Some(hex_root) => {
            let bytes = hex::decode(hex_root)
                .map_err(|e| TrieError::InvalidNode(format!("invalid --root hex: {e}")))?;
            RootHash::from_bytes(&bytes)?
        }
        None => RootHash::Blank,
    };

    let store = SledNodeStore::open(&cli.db_path, "mpt").map_err(TrieError::store)?;
    let mut trie = Trie::open(store, root)?;

    match cli.command {
        Command::Put { key, value } => {
            trie.update(key.as_bytes(), value.as_bytes())?;
            println!("{}", hex::encode(trie.root_hash()));
        }
        Command::Get { key } => {
            let value = trie.get(key.as_bytes())?;
            if !value.is_empty() {
                println!("{}", String::from_utf8_lossy(&value));
            }
        }
        Command::Delete { key } => {
            trie.delete(key.as_bytes())?;
            println!("{}", hex::encode(trie.root_hash()));
        }
        Command::Root => {
            println!("{}", hex::encode(trie.root_hash()));
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
