//! Seasonal collaborators: a fixed bias correction and a fixed outlook.

use async_trait::async_trait;

use crate::{
    error::SourceError,
    model::{BiasAdjustment, Coordinates, Probabilities},
};

use super::{BiasModel, OutlookModel};

/// CFSv2-style correction: constant bias, no per-location model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfsBiasModel {
    adjustment: BiasAdjustment,
}

impl CfsBiasModel {
    pub const DEFAULT: BiasAdjustment = BiasAdjustment {
        temp_bias: 0.5,
        precip_bias: 0.1,
    };

    pub fn new(adjustment: BiasAdjustment) -> Self {
        Self { adjustment }
    }
}

impl Default for CfsBiasModel {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

#[async_trait]
impl BiasModel for CfsBiasModel {
    async fn bias(&self, _coordinates: Coordinates) -> Result<BiasAdjustment, SourceError> {
        Ok(self.adjustment)
    }
}

/// IRI-style tercile outlook, constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IriOutlook {
    probabilities: Probabilities,
}

impl IriOutlook {
    pub const DEFAULT: Probabilities = Probabilities {
        prob_above_normal_temp: 0.6,
        prob_above_normal_precip: 0.55,
    };

    pub fn new(probabilities: Probabilities) -> Self {
        Self { probabilities }
    }
}

impl Default for IriOutlook {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

#[async_trait]
impl OutlookModel for IriOutlook {
    async fn probabilities(&self, _coordinates: Coordinates) -> Result<Probabilities, SourceError> {
        Ok(self.probabilities)
    }
}
