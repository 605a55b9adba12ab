// In-memory CMR used by the router tests

use async_trait::async_trait;
use cmr_stac_api::cmr::{
    CmrClient, CmrCollection, CmrError, CmrGranule, CmrParams, GranuleSearch,
};
use std::sync::{Arc, Mutex};

/// Serves canned records and records the parameters it was called with
#[derive(Default)]
pub struct FakeCmr {
    pub granules: Vec<CmrGranule>,
    pub collections: Vec<CmrCollection>,
    pub hits: Option<u64>,
    pub fail_with_status: Option<u16>,
    pub seen_params: Mutex<Vec<CmrParams>>,
}

impl FakeCmr {
    pub fn with_granules(granules: Vec<CmrGranule>) -> Arc<Self> {
        let hits = Some(granules.len() as u64);
        Arc::new(Self {
            granules,
            hits,
            ..Default::default()
        })
    }

    pub fn with_collections(collections: Vec<CmrCollection>) -> Arc<Self> {
        Arc::new(Self {
            collections,
            ..Default::default()
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            fail_with_status: Some(status),
            ..Default::default()
        })
    }

    /// Parameters of the most recent granule search
    pub fn last_params(&self) -> CmrParams {
        self.seen_params
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    fn check_failure(&self) -> Result<(), CmrError> {
        match self.fail_with_status {
            Some(status) => Err(CmrError::Status {
                status,
                body: "CMR is unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CmrClient for FakeCmr {
    async fn find_granules(&self, params: &CmrParams) -> Result<GranuleSearch, CmrError> {
        self.seen_params.lock().unwrap().push(params.clone());
        self.check_failure()?;
        Ok(GranuleSearch {
            granules: self.granules.clone(),
            hits: self.hits,
        })
    }

    async fn find_collections(&self) -> Result<Vec<CmrCollection>, CmrError> {
        self.check_failure()?;
        Ok(self.collections.clone())
    }
}
