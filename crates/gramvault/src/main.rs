//! # gramvault
//!
//! A jewellery workshop ledger for the terminal. Each user keeps inventory entries by
//! invoice number and weight; gramvault totals them, prices them at the user's billing
//! rate and tracks DAI dispatch records alongside.
//!
//! ```text
//! gramvault entry add INV-12 4.5 gold ring     # record an entry
//! gramvault                                    # list the current user's entries
//! gramvault total                              # total weight
//! gramvault rate 6250 && gramvault bill        # billing estimate
//! gramvault entry delete 3f2a                  # to the recycle bin, by id prefix
//! gramvault trash empty                        # permanently, after confirmation
//! gramvault backup export -o ~/backups         # full JSON backup
//! ```
//!
//! Data lives in one JSON file per collection under the data directory, chosen by
//! `--data-dir`, `GRAMVAULT_DATA_DIR`, `gramvault.toml` or the OS default, in that order.
//! Logging goes to stderr; raise it with `-v` or `RUST_LOG`.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
