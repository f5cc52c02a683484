use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::holding::Holding;

/// The on-disk wallet document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WalletFile {
    #[serde(default)]
    holdings: Vec<Holding>,
}

/// Durable store of purchase records, backed by a pretty-printed JSON
/// document. Mutations are read-modify-write with no locking; a single
/// local writer is assumed.
pub struct Wallet {
    path: PathBuf,
}

impl Wallet {
    pub fn new(path: &str) -> Wallet {
        Wallet {
            path: PathBuf::from(path),
        }
    }

    /// Read the full holdings list, in entry order. A missing file is an
    /// empty wallet (first run); a corrupt document also reads as empty.
    /// Any other I/O failure surfaces, and nothing downstream should
    /// valuate against it.
    pub fn load(&self) -> Result<Vec<Holding>, WalletError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(WalletError::Read(e)),
        };

        let file: WalletFile = serde_json::from_str(&data).unwrap_or_default();
        Ok(file.holdings)
    }

    /// Validate and append one holding. Rejected entries leave the
    /// document untouched.
    pub fn append(&self, holding: Holding) -> Result<(), WalletError> {
        holding.validate()?;

        let mut holdings = self.load()?;
        holdings.push(holding);
        self.save(&holdings)
    }

    /// Remove and return the holding at `index`. Out-of-range positions
    /// fail without mutating anything.
    pub fn delete_at(&self, index: usize) -> Result<Holding, WalletError> {
        let mut holdings = self.load()?;
        if index >= holdings.len() {
            return Err(WalletError::InvalidIndex(index));
        }
        let removed = holdings.remove(index);
        self.save(&holdings)?;
        Ok(removed)
    }

    fn save(&self, holdings: &[Holding]) -> Result<(), WalletError> {
        let file = WalletFile {
            holdings: holdings.to_vec(),
        };
        let data = serde_json::to_string_pretty(&file)
            .map_err(|e| WalletError::Write(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        std::fs::write(&self.path, data).map_err(WalletError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_wallet(dir: &tempfile::TempDir) -> Wallet {
        Wallet::new(dir.path().join("wallet.json").to_str().unwrap())
    }

    #[test]
    fn test_missing_file_is_empty_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = temp_wallet(&dir);
        assert!(wallet.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = temp_wallet(&dir);

        wallet
            .append(Holding::new("gold", "eagle", 1.0, 2, 1950.0))
            .unwrap();
        wallet.append(Holding::new("silver", "", 1.0, 10, 24.5)).unwrap();

        let holdings = wallet.load().unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].metal, "gold");
        assert_eq!(holdings[0].design, "eagle");
        assert_eq!(holdings[1].quantity, 10);
    }

    #[test]
    fn test_append_rejects_invalid_entry_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = temp_wallet(&dir);
        wallet.append(Holding::new("gold", "", 1.0, 1, 1900.0)).unwrap();

        let result = wallet.append(Holding::new("gold", "", 0.0, 1, 10.0));
        assert!(matches!(result, Err(WalletError::InvalidEntry(_))));
        assert_eq!(wallet.load().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_at_removes_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = temp_wallet(&dir);
        wallet.append(Holding::new("gold", "", 1.0, 1, 1900.0)).unwrap();
        wallet.append(Holding::new("silver", "", 1.0, 5, 25.0)).unwrap();

        let removed = wallet.delete_at(0).unwrap();
        assert_eq!(removed.metal, "gold");

        let holdings = wallet.load().unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].metal, "silver");
    }

    #[test]
    fn test_delete_at_out_of_range_fails_on_empty_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = temp_wallet(&dir);
        assert!(matches!(
            wallet.delete_at(0),
            Err(WalletError::InvalidIndex(0))
        ));
        assert!(wallet.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_document_recovers_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = temp_wallet(&dir);
        std::fs::write(&wallet.path, "{oops").unwrap();

        assert!(wallet.load().unwrap().is_empty());

        // and the next append starts a fresh document
        wallet.append(Holding::new("copper", "bar", 16.0, 1, 0.5)).unwrap();
        assert_eq!(wallet.load().unwrap().len(), 1);
    }

    #[test]
    fn test_document_layout_is_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = temp_wallet(&dir);
        wallet.append(Holding::new("gold", "", 1.0, 1, 1900.0)).unwrap();

        let raw = std::fs::read_to_string(&wallet.path).unwrap();
        assert!(raw.contains("\"holdings\""));
        assert!(raw.contains("\"buyPrice\""));
    }
}
