#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER: &str = "op, caller, from, to, value, data";

/// Writes a requests CSV with the standard header followed by `rows`.
pub fn requests_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file.flush().unwrap();
    file
}

/// Writes `rows` random requests over identities 1..=20 to `path`.
///
/// The stream mixes every operation kind; most requests are expected to be
/// rejected, which exercises the failure paths as much as the happy ones.
pub fn generate_requests(path: &std::path::Path, rows: usize, seed: u64) -> std::io::Result<()> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const OPS: [&str; 12] = [
        "token_transfer",
        "token_approve",
        "token_transfer_from",
        "item_mint",
        "item_burn",
        "item_approve",
        "item_set_approval_for_all",
        "item_transfer_from",
        "item_safe_transfer_from",
        "ballot_give_right",
        "ballot_vote",
        "ballot_delegate",
    ];

    let mut rng = StdRng::seed_from_u64(seed);
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "{HEADER}")?;
    for _ in 0..rows {
        let op = OPS[rng.gen_range(0..OPS.len())];
        let value = match op {
            "item_set_approval_for_all" => rng.gen_range(0..2u64),
            "ballot_vote" => rng.gen_range(0..5u64),
            op if op.starts_with("item") => rng.gen_range(0..50u64),
            _ => rng.gen_range(0..500u64),
        };
        writeln!(
            file,
            "{op}, {}, {}, {}, {value},",
            rng.gen_range(1..=20u64),
            rng.gen_range(1..=20u64),
            rng.gen_range(1..=20u64),
        )?;
    }
    file.flush()
}
