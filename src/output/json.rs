//! JSON persistence of pregame snapshots

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::common::errors::Result;
use crate::common::types::GameOdds;

/// File name used when the caller gives no path: `{league}.json`
pub fn default_snapshot_path(league: &str) -> PathBuf {
    PathBuf::from(format!("{}.json", league))
}

/// Write games as pretty-printed JSON, replacing any existing file
pub fn store_as_json(games: &[GameOdds], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, games)?;
    writer.flush()?;
    info!("Content successfully dumped into '{}'", path.display());
    Ok(())
}

/// Read games previously written by [`store_as_json`]
pub fn load_from_json(path: &Path) -> Result<Vec<GameOdds>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{MarketOdds, OutcomeRecord};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_path() {
        assert_eq!(default_snapshot_path("NHL"), PathBuf::from("NHL.json"));
    }

    #[test]
    fn test_store_and_reload() {
        let games = vec![GameOdds {
            game: "A @ B".to_string(),
            event_id: Some("1".to_string()),
            markets: vec![MarketOdds {
                market_name: "Total".to_string(),
                outcomes: vec![OutcomeRecord {
                    label: "Over 5.5".to_string(),
                    odds: dec!(1.9),
                }],
            }],
        }];
        let path = std::env::temp_dir().join(format!("draftkings_odds_{}.json", std::process::id()));

        store_as_json(&games, &path).unwrap();
        let reloaded = load_from_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded, games);
    }

    #[test]
    fn test_store_into_missing_directory_fails() {
        let path = std::env::temp_dir().join("draftkings_odds_missing_dir/x/y.json");
        assert!(matches!(
            store_as_json(&[], &path),
            Err(crate::ClientError::Io(_))
        ));
    }
}
