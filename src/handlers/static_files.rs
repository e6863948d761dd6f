use actix_files::NamedFile;

use crate::errors::AppError;

pub const ASSETS_DIR: &str = "./assets";
pub const RESOURCE_DIR: &str = "./resource";

/// GET /favicon.ico
pub async fn favicon() -> Result<NamedFile, AppError> {
    NamedFile::open_async(format!("{ASSETS_DIR}/favicon.ico"))
        .await
        .map_err(|e| {
            log::debug!("favicon not served: {e}");
            AppError::NotFound
        })
}
