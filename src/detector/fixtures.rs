//! Test fixtures

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Header of the synthetic account dataset
pub const HEADER: &str =
    "id,screen_name,description,verified,default_profile,default_profile_image,followers_count,friends_count,bot";

/// Synthetic accounts: bots have under 20 followers, humans 1000 or more.
/// Follower count is the only column that separates the classes exactly.
pub fn accounts_csv() -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');

    for i in 0..20 {
        let default_profile = if i % 4 != 0 { "True" } else { "False" };
        let _ = writeln!(
            csv,
            "{},bot_{},\"spam, spam\",False,{},False,{},{},1",
            100 + i,
            i,
            default_profile,
            i,
            (i * 7) % 50
        );
    }
    for i in 0..20 {
        let verified = if i % 2 == 0 { "True" } else { "False" };
        let default_profile = if i % 3 == 0 { "True" } else { "False" };
        let _ = writeln!(
            csv,
            "{},human_{},hello,{},{},False,{},{},0",
            200 + i,
            i,
            verified,
            default_profile,
            1000 + i * 10,
            (i * 11) % 50
        );
    }

    csv
}

/// Write the synthetic dataset into `dir`
pub fn write_accounts_csv(dir: &Path) -> PathBuf {
    let path = dir.join("accounts.csv");
    std::fs::write(&path, accounts_csv()).unwrap();
    path
}
