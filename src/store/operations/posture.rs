use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// Last live reading received from a foreground session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureSnapshot {
    pub score: f64,
    pub angle: f64,
    pub detected: bool,
    pub timestamp: u64,
}

impl Store {
    pub fn save_last_posture(&self, snapshot: &PostureSnapshot) -> Result<(), StoreError> {
        Self::put_json(&self.posture, keys::LAST_POSTURE, snapshot)
    }

    pub fn get_last_posture(&self) -> Result<Option<PostureSnapshot>, StoreError> {
        Self::get_json(&self.posture, keys::LAST_POSTURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_posture_is_overwritten() {
        let store = Store::temporary().unwrap();
        assert!(store.get_last_posture().unwrap().is_none());

        let first = PostureSnapshot {
            score: 70.0,
            angle: 160.0,
            detected: true,
            timestamp: 1,
        };
        store.save_last_posture(&first).unwrap();
        let second = PostureSnapshot {
            score: 0.0,
            angle: 0.0,
            detected: false,
            timestamp: 2,
        };
        store.save_last_posture(&second).unwrap();

        assert_eq!(store.get_last_posture().unwrap(), Some(second));
    }
}
