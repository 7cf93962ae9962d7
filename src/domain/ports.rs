use crate::core::calendar::WeekdayLocale;
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn sales_path(&self) -> &str;
    fn catalog_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn delimiter(&self) -> u8;
    fn date_formats(&self) -> &[String];
    fn weekday_locale(&self) -> WeekdayLocale;
    fn rows_per_page(&self) -> usize;
}
