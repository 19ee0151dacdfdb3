use crate::core::batch::{BatchInput, BatchReport};
use crate::core::distance::Ellipsoid;
use crate::domain::model::FlightBands;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn registry_path(&self) -> &str;
    fn bands(&self) -> Result<FlightBands>;
    fn ellipsoid(&self) -> Result<Ellipsoid>;
    fn pretty_output(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<BatchInput>;
    async fn transform(&self, input: BatchInput) -> Result<BatchReport>;
    async fn load(&self, report: BatchReport) -> Result<String>;
}
